//! Alarm pipeline
//!
//! `build()` assembles the spoken script from the enabled content sections,
//! picks a wakeup song and synthesizes speech with the configured TTS engine.
//! `play()` plays the result and falls back to a beep whenever speech cannot
//! be played, so an alarm is never silent.

use crate::audio::{run_blocking, PlaybackDriver};
use crate::config::AlarmConfig;
use crate::content::{ContentGenerator, ContentHandler, Greeting};
use crate::error::{AlarmError, AlarmResult};
use crate::event_log::EventLog;
use crate::media;
use crate::tts::{self, AudioArtifact, TtsEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Output of one `build()`, consumed by the next `play()`
#[derive(Debug)]
pub struct BuiltAlarm {
    /// Newline joined content, greeting first and closing phrase last
    pub script: String,
    pub wakeup_song: Option<PathBuf>,
    /// Synthesized speech; `None` when TTS is disabled or synthesis failed
    pub audio: Option<AudioArtifact>,
    engine: Option<Arc<dyn TtsEngine>>,
}

impl BuiltAlarm {
    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_ref().map(|e| e.name())
    }
}

pub struct AlarmBuilder {
    config: Arc<AlarmConfig>,
    driver: Arc<dyn PlaybackDriver>,
    events: EventLog,
    tts_engine: Option<Arc<dyn TtsEngine>>,
    built: Option<BuiltAlarm>,
}

impl std::fmt::Debug for AlarmBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmBuilder")
            .field("driver", &self.driver)
            .field("events", &self.events)
            .field("built", &self.built.is_some())
            .finish()
    }
}

impl AlarmBuilder {
    pub fn new(config: Arc<AlarmConfig>, driver: Arc<dyn PlaybackDriver>, events: EventLog) -> Self {
        Self {
            config,
            driver,
            events,
            tts_engine: None,
            built: None,
        }
    }

    /// Use this engine instead of resolving one from the `TTS` sections
    pub fn with_tts_engine(mut self, engine: Arc<dyn TtsEngine>) -> Self {
        self.tts_engine = Some(engine);
        self
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Swap in an updated configuration between alarms
    pub fn set_config(&mut self, config: Arc<AlarmConfig>) {
        self.config = config;
    }

    pub fn built(&self) -> Option<&BuiltAlarm> {
        self.built.as_ref()
    }

    /// The TTS engine for the first enabled `TTS` section, Festival if none
    pub fn get_tts_client(&self) -> Arc<dyn TtsEngine> {
        if let Some(engine) = &self.tts_engine {
            return engine.clone();
        }

        let section = self.config.enabled_tts_sections().into_iter().next();
        if let Some((_, section)) = section {
            self.events
                .info(&format!("Using TTS handler {}", section.handler.id()));
        }
        tts::create_engine(section, self.driver.clone())
    }

    /// Greeting followed by every enabled content section, then the closing phrase
    pub async fn generate_content(&self) -> Vec<String> {
        let alarm_time = self.config.alarm_time();
        let greeting = match self.config.greeting_section() {
            Some(section) => Greeting::from_section(section, alarm_time),
            None => Greeting::new("", alarm_time),
        };

        let mut contents = vec![greeting.generate().await];

        for (name, section) in self.config.enabled_content_sections() {
            if section.handler == ContentHandler::Greeting {
                continue;
            }
            debug!("🧩 Generating content for {} ({})", name, section.handler.id());
            let generator = section.handler.create(section, &self.config);
            contents.push(generator.generate().await);
        }

        contents.push(self.config.main.end.clone());
        contents
    }

    /// Prepare the next alarm. Fails only on setup mistakes such as a
    /// wakeup song pattern matching no files.
    pub async fn build(&mut self) -> AlarmResult<&BuiltAlarm> {
        self.built = None;

        let script = self.generate_content().await.join("\n");
        debug!("📜 Alarm script:\n{}", script);

        let wakeup_song = if self.config.media.enabled {
            let song = media::pick_wakeup_song(&self.config.media.path)?;
            self.events
                .info(&format!("Set wakeup song to {}", song.display()));
            Some(song)
        } else {
            None
        };

        let (audio, engine) = if self.config.main.tts {
            let engine = self.get_tts_client();
            let audio = match engine.synthesize(&script).await {
                Ok(audio) => {
                    info!(
                        "🗣️ Synthesized alarm with {} ({} bytes, {:?})",
                        engine.name(),
                        audio.len(),
                        audio.duration()
                    );
                    Some(audio)
                }
                Err(e) => {
                    self.events
                        .error(&format!("TTS synthesis with {} failed: {}", engine.name(), e));
                    None
                }
            };
            (audio, Some(engine))
        } else {
            (None, None)
        };

        Ok(&*self.built.insert(BuiltAlarm {
            script,
            wakeup_song,
            audio,
            engine,
        }))
    }

    /// Play the built alarm and discard it. Never fails: any speech problem
    /// turns into the beep.
    pub async fn play(&mut self) {
        let built = self.built.take();
        let tts_enabled = self.config.main.tts;
        let media_enabled = self.config.media.enabled;

        if !tts_enabled && !media_enabled {
            self.play_beep().await;
            return;
        }

        let (wakeup_song, audio, engine) = match built {
            Some(b) => (b.wakeup_song, b.audio, b.engine),
            None => {
                warn!("⚠️ play() called before build()");
                (None, None, None)
            }
        };

        if media_enabled {
            match wakeup_song {
                Some(song) => self.play_wakeup_song(song).await,
                None => warn!("⚠️ Wakeup song enabled but none was selected"),
            }
        }

        if !tts_enabled {
            return;
        }

        match (audio, engine) {
            (Some(audio), Some(engine)) => {
                if let Err(e) = engine.play(&audio).await {
                    self.events.error(&e.to_string());
                    self.events.info("Defaulting to alarm sound effect");
                    self.play_beep().await;
                }
            }
            _ => {
                self.events
                    .info("No synthesized speech, defaulting to alarm sound effect");
                self.play_beep().await;
            }
        }
    }

    /// Build, play, then open the radio stream when enabled
    pub async fn build_and_play(&mut self) -> AlarmResult<()> {
        self.build().await?;
        self.play().await;

        if self.config.radio.enabled {
            if let Err(e) = self.play_radio() {
                self.events.error(&format!("Could not open radio stream: {}", e));
            }
        }
        Ok(())
    }

    /// Open the default radio station in the background
    pub fn play_radio(&self) -> AlarmResult<()> {
        let url = self.config.default_radio_url().ok_or_else(|| {
            AlarmError::Config(format!(
                "No stream url for default radio station {}",
                self.config.radio.default
            ))
        })?;
        self.events.info(&format!("Opening radio stream {}", url));
        self.driver.open_stream(url, &self.config.radio.args)
    }

    async fn play_wakeup_song(&self, song: PathBuf) {
        self.events
            .info(&format!("Now playing: {}", media::song_name(&song)));
        if let Err(e) = run_blocking(self.driver.clone(), move |d| d.play_file(&song)).await {
            self.events.error(&format!("Wakeup song failed: {}", e));
        }
    }

    async fn play_beep(&self) {
        if let Err(e) = run_blocking(self.driver.clone(), |d| d.play_beep()).await {
            self.events.error(&format!("Alarm sound effect failed: {}", e));
        }
    }
}

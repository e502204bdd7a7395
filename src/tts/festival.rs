//! Festival TTS backend calling a local binary

use super::{play_encoded, AudioArtifact, TtsEngine, TtsHandler};
use crate::audio::PlaybackDriver;
use crate::config::Section;
use crate::error::{AlarmError, AlarmResult};
use async_trait::async_trait;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const DEFAULT_BINARY: &str = "festival";

/// Offline engine: speaks directly through `festival --tts`, so synthesis
/// only hands the text over to playback.
#[derive(Debug)]
pub struct FestivalTts {
    binary: String,
    driver: Arc<dyn PlaybackDriver>,
}

impl FestivalTts {
    pub fn new(driver: Arc<dyn PlaybackDriver>) -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            driver,
        }
    }

    pub fn from_section(section: &Section<TtsHandler>, driver: Arc<dyn PlaybackDriver>) -> Self {
        Self {
            binary: section.get_str_or("binary", DEFAULT_BINARY),
            driver,
        }
    }
}

#[async_trait]
impl TtsEngine for FestivalTts {
    async fn synthesize(&self, text: &str) -> AlarmResult<AudioArtifact> {
        Ok(AudioArtifact::Deferred(text.to_string()))
    }

    async fn play(&self, audio: &AudioArtifact) -> AlarmResult<()> {
        let text = match audio {
            AudioArtifact::Deferred(text) => text.clone(),
            AudioArtifact::Encoded { .. } => return play_encoded(&self.driver, audio).await,
        };

        info!("📢 Festival speaking {} characters", text.len());
        let binary = self.binary.clone();

        // Move blocking subprocess work to dedicated thread pool
        tokio::task::spawn_blocking(move || -> AlarmResult<()> {
            let mut child = Command::new(&binary)
                .arg("--tts")
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .spawn()
                .map_err(|e| {
                    error!("❌ Failed to spawn {}: {}", binary, e);
                    AlarmError::Playback(format!("Failed to spawn {}: {}", binary, e))
                })?;

            let written = match child.stdin.take() {
                Some(mut stdin) => {
                    let result = stdin.write_all(text.as_bytes()).and_then(|_| stdin.flush());
                    drop(stdin);
                    result
                }
                None => Ok(()),
            };

            // Reap the child even when it stopped reading early
            let status = child.wait()?;
            written.map_err(|e| {
                AlarmError::Playback(format!("Could not send text to {}: {}", binary, e))
            })?;
            if !status.success() {
                return Err(AlarmError::Playback(format!(
                    "Festival failed with status {}",
                    status
                )));
            }
            debug!("✅ Festival finished");
            Ok(())
        })
        .await
        .map_err(|e| AlarmError::Playback(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "festival"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundEngine;

    fn engine(binary: &str) -> FestivalTts {
        let section = Section::new(TtsHandler::OfflineTts, true).with("binary", binary);
        FestivalTts::from_section(&section, Arc::new(SoundEngine::new(None)))
    }

    #[tokio::test]
    async fn test_synthesis_defers_to_playback() {
        let audio = engine("festival").synthesize("Wake up").await.unwrap();
        assert_eq!(audio, AudioArtifact::Deferred("Wake up".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_playback_error() {
        let audio = AudioArtifact::Deferred("Wake up".to_string());
        let result = engine("/no/such/festival").play(&audio).await;
        assert!(matches!(result, Err(AlarmError::Playback(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reader_exiting_early_is_playback_error() {
        // `true` never reads stdin, so a large script hits a closed pipe
        let audio = AudioArtifact::Deferred("Good morning. ".repeat(100_000));
        let result = engine("true").play(&audio).await;
        assert!(matches!(result, Err(AlarmError::Playback(_))));
    }
}

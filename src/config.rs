use crate::content::ContentHandler;
use crate::error::{AlarmError, AlarmResult};
use crate::tts::TtsHandler;
use chrono::NaiveTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Alarm time used when `main.alarm_time` is not a valid HH:MM string
pub const DEFAULT_ALARM_TIME: &str = "07:00";

/// Alarm configuration, loaded from a JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    pub main: MainConfig,

    /// Content sections in declaration order
    #[serde(default)]
    pub content: IndexMap<String, Section<ContentHandler>>,

    /// TTS engine sections, at most one enabled
    #[serde(rename = "TTS", default)]
    pub tts: IndexMap<String, Section<TtsHandler>>,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub radio: RadioConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfig {
    /// Time spoken in the greeting (HH:MM). Current time when unset.
    #[serde(default)]
    pub alarm_time: Option<String>,

    /// Whether the script is spoken at all
    #[serde(rename = "TTS", default = "default_true")]
    pub tts: bool,

    /// Closing phrase appended after all content
    #[serde(default)]
    pub end: String,
}

/// A named `content` or `TTS` entry.
///
/// Every entry names its handler; anything else in the entry is handler
/// specific and kept in `settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section<H> {
    #[serde(default)]
    pub enabled: bool,
    pub handler: H,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl<H> Section<H> {
    pub fn new(handler: H, enabled: bool) -> Self {
        Self {
            enabled,
            handler,
            settings: Map::new(),
        }
    }

    /// Builder helper for setting a handler specific key
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// String setting. Numbers are accepted too, since ids like `city_id`
    /// are often written without quotes.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.settings.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get_str_or(&self, key: &str, fallback: &str) -> String {
        self.get_str(key).unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Glob pattern of wakeup songs, one is picked at random per alarm
    #[serde(default)]
    pub path: String,

    /// Beep sound effect; a generated tone is used when missing
    #[serde(default)]
    pub beep: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadioConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Key into `urls`
    #[serde(default)]
    pub default: String,

    #[serde(default)]
    pub urls: IndexMap<String, String>,

    /// Extra arguments for the stream player
    #[serde(default)]
    pub args: String,
}

fn default_true() -> bool {
    true
}

impl Default for AlarmConfig {
    fn default() -> Self {
        let mut content = IndexMap::new();
        content.insert(
            "greeting".to_string(),
            Section::new(ContentHandler::Greeting, true).with("name", "friend"),
        );
        content.insert(
            "openweathermap".to_string(),
            Section::new(ContentHandler::OpenWeather, false)
                .with("credentials", "")
                .with("city_id", "")
                .with("units", "metric"),
        );
        content.insert(
            "BBC_news".to_string(),
            Section::new(ContentHandler::BbcNews, true),
        );

        let mut tts = IndexMap::new();
        tts.insert(
            "GCP".to_string(),
            Section::new(TtsHandler::CloudTts, false)
                .with("auth", serde_json::json!({ "api_key": "" })),
        );
        tts.insert(
            "google_translate".to_string(),
            Section::new(TtsHandler::GoogleTranslateTts, false),
        );
        tts.insert(
            "festival".to_string(),
            Section::new(TtsHandler::OfflineTts, true),
        );

        let mut urls = IndexMap::new();
        urls.insert(
            "bbc_world_service".to_string(),
            "http://stream.live.vc.bbcmedia.co.uk/bbc_world_service".to_string(),
        );

        Self {
            main: MainConfig {
                alarm_time: Some(DEFAULT_ALARM_TIME.to_string()),
                tts: true,
                end: "Have a nice day.".to_string(),
            },
            content,
            tts,
            media: MediaConfig {
                enabled: false,
                path: dirs::audio_dir()
                    .unwrap_or_default()
                    .join("*.mp3")
                    .to_string_lossy()
                    .to_string(),
                beep: None,
            },
            radio: RadioConfig {
                enabled: false,
                default: "bbc_world_service".to_string(),
                urls,
                args: String::new(),
            },
        }
    }
}

impl AlarmConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> AlarmResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlarmError::Config(format!("Couldn't read {}: {}", path.display(), e))
        })?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            AlarmError::Config(format!(
                "Couldn't validate configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        info!("📄 Using config file {}", path.display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> AlarmResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the invariants the alarm pipeline relies on.
    ///
    /// An unparsable `alarm_time` is not fatal: it is replaced with
    /// [`DEFAULT_ALARM_TIME`].
    pub fn validate(&mut self) -> AlarmResult<()> {
        let enabled_tts = self.enabled_tts_sections();
        if enabled_tts.len() > 1 {
            let names: Vec<&str> = enabled_tts.keys().copied().collect();
            return Err(AlarmError::Config(format!(
                "Multiple TTS enabled engines not allowed: {}",
                names.join(", ")
            )));
        }

        if let Some(time) = &self.main.alarm_time {
            if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
                warn!(
                    "⚠️ alarm_time {} is not valid, defaulting to {}",
                    time, DEFAULT_ALARM_TIME
                );
                self.main.alarm_time = Some(DEFAULT_ALARM_TIME.to_string());
            }
        }

        if self.media.enabled && self.media.path.trim().is_empty() {
            return Err(AlarmError::Config(
                "Wakeup song enabled but media.path is empty".to_string(),
            ));
        }

        if self.radio.enabled && !self.radio.urls.contains_key(&self.radio.default) {
            return Err(AlarmError::Config(format!(
                "No stream url for default radio station {}",
                self.radio.default
            )));
        }

        Ok(())
    }

    /// Enabled `content` sections by name, in declaration order
    pub fn enabled_content_sections(&self) -> IndexMap<&str, &Section<ContentHandler>> {
        enabled_sections(&self.content)
    }

    /// Enabled `TTS` sections by name, in declaration order
    pub fn enabled_tts_sections(&self) -> IndexMap<&str, &Section<TtsHandler>> {
        enabled_sections(&self.tts)
    }

    /// The section configuring the greeting, enabled or not
    pub fn greeting_section(&self) -> Option<&Section<ContentHandler>> {
        self.content
            .values()
            .find(|s| s.handler == ContentHandler::Greeting)
    }

    /// Parsed `main.alarm_time`
    pub fn alarm_time(&self) -> Option<NaiveTime> {
        self.main
            .alarm_time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
    }

    /// Url of the default radio station
    pub fn default_radio_url(&self) -> Option<&str> {
        self.radio.urls.get(&self.radio.default).map(String::as_str)
    }
}

fn enabled_sections<H>(sections: &IndexMap<String, Section<H>>) -> IndexMap<&str, &Section<H>> {
    sections
        .iter()
        .filter(|(_, section)| section.enabled)
        .map(|(name, section)| (name.as_str(), section))
        .collect()
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alarmpi")
        .join("alarm.json")
}

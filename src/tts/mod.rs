//! TTS (Text-to-Speech) Module
//!
//! Provides a unified interface for multiple TTS backends. The backend is
//! picked from the `TTS` configuration sections; at most one may be enabled
//! and Festival is used when none is.

use crate::audio::{run_blocking, PlaybackDriver};
use crate::config::Section;
use crate::error::{AlarmError, AlarmResult};
use async_trait::async_trait;
use rodio::Source;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod festival;
pub mod gcp;
pub mod translate;

/// Audio encodings requested from remote synthesis services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
}

impl AudioEncoding {
    pub fn api_name(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
        }
    }
}

/// Synthesized speech for one alarm, played once and dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioArtifact {
    /// Encoded audio returned by a synthesis service
    Encoded {
        bytes: Vec<u8>,
        encoding: AudioEncoding,
    },
    /// Text for an engine that synthesizes while it plays
    Deferred(String),
}

impl AudioArtifact {
    /// Playing time, when it can be read from the encoded stream
    pub fn duration(&self) -> Option<Duration> {
        match self {
            AudioArtifact::Encoded { bytes, .. } => rodio::Decoder::new(Cursor::new(bytes.clone()))
                .ok()?
                .total_duration(),
            AudioArtifact::Deferred(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AudioArtifact::Encoded { bytes, .. } => bytes.len(),
            AudioArtifact::Deferred(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync + std::fmt::Debug {
    /// Turn the alarm script into playable audio
    async fn synthesize(&self, text: &str) -> AlarmResult<AudioArtifact>;

    /// Play previously synthesized audio, blocking until it ends
    async fn play(&self, audio: &AudioArtifact) -> AlarmResult<()>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Handler identifiers accepted in `TTS` sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtsHandler {
    #[serde(rename = "cloud_tts", alias = "gcp_tts")]
    CloudTts,
    #[serde(rename = "google_translate_tts")]
    GoogleTranslateTts,
    #[serde(rename = "offline_tts", alias = "festival_tts")]
    OfflineTts,
}

impl TtsHandler {
    pub fn id(&self) -> &'static str {
        match self {
            TtsHandler::CloudTts => "cloud_tts",
            TtsHandler::GoogleTranslateTts => "google_translate_tts",
            TtsHandler::OfflineTts => "offline_tts",
        }
    }

    /// Construct the engine this handler names
    pub fn create(
        &self,
        section: &Section<TtsHandler>,
        driver: Arc<dyn PlaybackDriver>,
    ) -> Arc<dyn TtsEngine> {
        match self {
            TtsHandler::CloudTts => Arc::new(gcp::GoogleCloudTts::new(section, driver)),
            TtsHandler::GoogleTranslateTts => {
                Arc::new(translate::GoogleTranslateTts::new(section, driver))
            }
            TtsHandler::OfflineTts => Arc::new(festival::FestivalTts::from_section(section, driver)),
        }
    }
}

/// Factory to create the configured TTS engine
pub fn create_engine(
    section: Option<(&str, &Section<TtsHandler>)>,
    driver: Arc<dyn PlaybackDriver>,
) -> Arc<dyn TtsEngine> {
    let engine = match section {
        Some((name, section)) => {
            info!(
                "🛠️ Using TTS handler {} from section {}",
                section.handler.id(),
                name
            );
            section.handler.create(section, driver)
        }
        None => {
            info!("🛠️ No TTS engine specified in config, using Festival");
            Arc::new(festival::FestivalTts::new(driver)) as Arc<dyn TtsEngine>
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    engine
}

/// Play encoded audio through the playback driver
pub(crate) async fn play_encoded(
    driver: &Arc<dyn PlaybackDriver>,
    audio: &AudioArtifact,
) -> AlarmResult<()> {
    match audio {
        AudioArtifact::Encoded { bytes, .. } => {
            let bytes = bytes.clone();
            run_blocking(driver.clone(), move |d| d.play_audio(bytes)).await
        }
        AudioArtifact::Deferred(_) => Err(AlarmError::Playback(
            "Engine cannot speak unsynthesized text".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_ids_match_serde_names() {
        for handler in [
            TtsHandler::CloudTts,
            TtsHandler::GoogleTranslateTts,
            TtsHandler::OfflineTts,
        ] {
            let json = serde_json::to_string(&handler).unwrap();
            assert_eq!(json, format!("\"{}\"", handler.id()));
        }
    }

    #[test]
    fn test_legacy_handler_aliases() {
        let handler: TtsHandler = serde_json::from_str("\"festival_tts\"").unwrap();
        assert_eq!(handler, TtsHandler::OfflineTts);
        let handler: TtsHandler = serde_json::from_str("\"gcp_tts\"").unwrap();
        assert_eq!(handler, TtsHandler::CloudTts);
    }

    #[test]
    fn test_deferred_artifact_has_no_duration() {
        let audio = AudioArtifact::Deferred("Good morning".to_string());
        assert_eq!(audio.duration(), None);
        assert_eq!(audio.len(), 12);
    }
}

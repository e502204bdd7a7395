//! Google Cloud Text-to-Speech backend
//!
//! Uses a WaveNet voice for more human-like speech. The monthly free tier
//! easily covers running the alarm once a day.

use super::{play_encoded, AudioArtifact, AudioEncoding, TtsEngine, TtsHandler};
use crate::audio::PlaybackDriver;
use crate::config::Section;
use crate::error::{AlarmError, AlarmResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_VOICE: &str = "en-US-Wavenet-C";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials from the section's `auth` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudAuth {
    ApiKey(String),
    AccessToken(String),
    Missing,
}

impl CloudAuth {
    fn from_section(section: &Section<TtsHandler>) -> Self {
        let auth = section.get("auth");
        let field = |key: &str| {
            auth.and_then(|a| a.get(key))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(token) = field("access_token") {
            CloudAuth::AccessToken(token)
        } else if let Some(key) = field("api_key") {
            CloudAuth::ApiKey(key)
        } else {
            CloudAuth::Missing
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug)]
pub struct GoogleCloudTts {
    client: Client,
    endpoint: String,
    auth: CloudAuth,
    language_code: String,
    voice: String,
    encoding: AudioEncoding,
    driver: Arc<dyn PlaybackDriver>,
}

impl GoogleCloudTts {
    pub fn new(section: &Section<TtsHandler>, driver: Arc<dyn PlaybackDriver>) -> Self {
        let encoding = section
            .get("audio_encoding")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let auth = CloudAuth::from_section(section);
        if auth == CloudAuth::Missing {
            warn!("⚠️ Cloud TTS enabled without auth.api_key or auth.access_token");
        }

        Self {
            client: Client::new(),
            endpoint: section.get_str_or("endpoint", DEFAULT_ENDPOINT),
            auth,
            language_code: section.get_str_or("language_code", DEFAULT_LANGUAGE),
            voice: section.get_str_or("voice", DEFAULT_VOICE),
            encoding,
            driver,
        }
    }
}

#[async_trait]
impl TtsEngine for GoogleCloudTts {
    async fn synthesize(&self, text: &str) -> AlarmResult<AudioArtifact> {
        let body = serde_json::json!({
            "input": { "text": text },
            "voice": {
                "languageCode": self.language_code,
                "name": self.voice,
            },
            "audioConfig": { "audioEncoding": self.encoding.api_name() },
        });

        let request = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(REQUEST_TIMEOUT);
        let request = match &self.auth {
            CloudAuth::ApiKey(key) => request.query(&[("key", key)]),
            CloudAuth::AccessToken(token) => request.bearer_auth(token),
            CloudAuth::Missing => {
                return Err(AlarmError::Config(
                    "Cloud TTS needs auth.api_key or auth.access_token".to_string(),
                ))
            }
        };

        info!("☁️ Requesting cloud synthesis ({} characters)", text.len());
        let response = request.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(AlarmError::Service(format!(
                "Cloud TTS API error ({}): {}",
                status, body_text
            )));
        }

        let parsed: SynthesizeResponse = serde_json::from_str(&body_text).map_err(|e| {
            AlarmError::Service(format!("Unexpected cloud TTS response: {}", e))
        })?;
        let bytes = STANDARD
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| AlarmError::Service(format!("Invalid audio content: {}", e)))?;

        debug!("☁️ Received {} bytes of audio", bytes.len());
        Ok(AudioArtifact::Encoded {
            bytes,
            encoding: self.encoding,
        })
    }

    async fn play(&self, audio: &AudioArtifact) -> AlarmResult<()> {
        play_encoded(&self.driver, audio).await
    }

    fn name(&self) -> &str {
        "google_cloud"
    }
}

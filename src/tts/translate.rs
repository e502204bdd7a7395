//! Google Translate TTS backend
//!
//! The translate_tts endpoint is unofficial and undocumented and may break at
//! any time. It only accepts 200 characters per request, so the script is sent
//! in parts and the returned MP3 streams are concatenated.

use super::{play_encoded, AudioArtifact, AudioEncoding, TtsEngine, TtsHandler};
use crate::audio::PlaybackDriver;
use crate::config::Section;
use crate::error::AlarmResult;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";
pub const MAX_CHARS: usize = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
    language: String,
    driver: Arc<dyn PlaybackDriver>,
}

impl GoogleTranslateTts {
    pub fn new(section: &Section<TtsHandler>, driver: Arc<dyn PlaybackDriver>) -> Self {
        Self {
            client: Client::new(),
            endpoint: section.get_str_or("endpoint", DEFAULT_ENDPOINT),
            language: section.get_str_or("language", "en"),
            driver,
        }
    }
}

/// Wrap text into lines of at most `width` characters on word boundaries.
/// Words longer than `width` are broken up.
pub fn split_text(text: &str, width: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            parts.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > width {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[async_trait]
impl TtsEngine for GoogleTranslateTts {
    async fn synthesize(&self, text: &str) -> AlarmResult<AudioArtifact> {
        let mut bytes = Vec::new();

        for part in split_text(text, MAX_CHARS) {
            debug!("🌐 translate_tts request: '{}'", part);
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("tl", self.language.as_str()),
                    ("client", "tw-ob"),
                    ("ie", "UTF-8"),
                    ("q", part.as_str()),
                ])
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?
                .error_for_status()?;
            bytes.extend_from_slice(&response.bytes().await?);
        }

        Ok(AudioArtifact::Encoded {
            bytes,
            encoding: AudioEncoding::Mp3,
        })
    }

    async fn play(&self, audio: &AudioArtifact) -> AlarmResult<()> {
        play_encoded(&self.driver, audio).await
    }

    fn name(&self) -> &str {
        "google_translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_text_respects_width() {
        let text = "Good morning, friend. It's Friday October sixteenth. ".repeat(10);
        let parts = split_text(&text, MAX_CHARS);

        assert!(parts.len() > 1);
        assert!(parts.iter().all(|p| p.chars().count() <= MAX_CHARS));
        assert_eq!(parts.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_split_text_breaks_long_words() {
        let parts = split_text("ab abcdefgh c", 4);
        assert_eq!(parts, vec!["ab", "abcd", "efgh", "c"]);
    }

    #[test]
    fn test_split_text_empty() {
        assert!(split_text("  \n ", 10).is_empty());
    }
}

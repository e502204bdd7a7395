//! Mock TTS Engine for Testing
//!
//! Records all synthesized text and plays through the given driver.

use alarmpi::audio::PlaybackDriver;
use alarmpi::error::{AlarmError, AlarmResult};
use alarmpi::tts::{AudioArtifact, AudioEncoding, TtsEngine};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct MockTts {
    /// All scripts that were synthesized
    pub synthesized: Arc<Mutex<Vec<String>>>,
    /// Simulate a failing synthesis request
    pub fail_synthesis: Arc<Mutex<bool>>,
    /// Simulate a dropped connection during playback
    pub fail_playback: Arc<Mutex<bool>>,
    driver: Arc<dyn PlaybackDriver>,
}

impl MockTts {
    pub fn new(driver: Arc<dyn PlaybackDriver>) -> Self {
        Self {
            synthesized: Arc::new(Mutex::new(Vec::new())),
            fail_synthesis: Arc::new(Mutex::new(false)),
            fail_playback: Arc::new(Mutex::new(false)),
            driver,
        }
    }

    pub fn failing_playback(driver: Arc<dyn PlaybackDriver>) -> Self {
        let mock = Self::new(driver);
        *mock.fail_playback.lock().unwrap() = true;
        mock
    }

    pub fn get_synthesized(&self) -> Vec<String> {
        self.synthesized.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsEngine for MockTts {
    async fn synthesize(&self, text: &str) -> AlarmResult<AudioArtifact> {
        if *self.fail_synthesis.lock().unwrap() {
            return Err(AlarmError::Service("Mock synthesis failure".to_string()));
        }
        self.synthesized.lock().unwrap().push(text.to_string());
        Ok(AudioArtifact::Encoded {
            bytes: text.as_bytes().to_vec(),
            encoding: AudioEncoding::Mp3,
        })
    }

    async fn play(&self, audio: &AudioArtifact) -> AlarmResult<()> {
        if *self.fail_playback.lock().unwrap() {
            return Err(AlarmError::Service("Connection reset by peer".to_string()));
        }
        let len = audio.len();
        self.driver.play_audio(vec![0; len])
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_driver::MockDriver;

    #[tokio::test]
    async fn test_mock_tts_records_synthesis() {
        let driver = Arc::new(MockDriver::new());
        let mock = MockTts::new(driver.clone());

        let audio = mock.synthesize("hello").await.unwrap();
        mock.play(&audio).await.unwrap();

        assert_eq!(mock.get_synthesized(), vec!["hello".to_string()]);
        assert_eq!(driver.calls(), vec!["audio:5".to_string()]);
    }
}

//! Mock Playback Driver for Testing
//!
//! Records every playback request in call order.

use alarmpi::audio::PlaybackDriver;
use alarmpi::error::{AlarmError, AlarmResult};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockDriver {
    /// "file:<path>", "audio:<len>", "beep" or "stream:<url>"
    pub calls: Mutex<Vec<String>>,
    /// Simulate a broken wakeup song
    pub fail_files: AtomicBool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn beeps(&self) -> usize {
        self.calls().iter().filter(|c| *c == "beep").count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackDriver for MockDriver {
    fn play_file(&self, path: &Path) -> AlarmResult<()> {
        self.record(format!("file:{}", path.display()));
        if self.fail_files.load(Ordering::SeqCst) {
            return Err(AlarmError::Playback("Mock decode failure".to_string()));
        }
        Ok(())
    }

    fn play_audio(&self, bytes: Vec<u8>) -> AlarmResult<()> {
        self.record(format!("audio:{}", bytes.len()));
        Ok(())
    }

    fn play_beep(&self) -> AlarmResult<()> {
        self.record("beep".to_string());
        Ok(())
    }

    fn open_stream(&self, url: &str, _args: &str) -> AlarmResult<()> {
        self.record(format!("stream:{}", url));
        Ok(())
    }
}

//! Audio playback
//!
//! The alarm pipeline talks to speakers through [`PlaybackDriver`]. Every call
//! blocks until the sound has finished, so async callers go through
//! [`run_blocking`].

use crate::error::{AlarmError, AlarmResult};
use std::path::Path;
use std::sync::Arc;

pub mod engine;

pub use engine::SoundEngine;

/// Side-effecting playback service used by the alarm pipeline
pub trait PlaybackDriver: Send + Sync + std::fmt::Debug {
    /// Play an audio file to completion
    fn play_file(&self, path: &Path) -> AlarmResult<()>;

    /// Play encoded audio (MP3, WAV, ...) to completion
    fn play_audio(&self, bytes: Vec<u8>) -> AlarmResult<()>;

    /// Play the fallback alarm sound effect to completion
    fn play_beep(&self) -> AlarmResult<()>;

    /// Open a radio stream in the background and return immediately
    fn open_stream(&self, url: &str, args: &str) -> AlarmResult<()>;
}

/// Run a blocking driver call on the blocking thread pool
pub async fn run_blocking<F>(driver: Arc<dyn PlaybackDriver>, f: F) -> AlarmResult<()>
where
    F: FnOnce(&dyn PlaybackDriver) -> AlarmResult<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(driver.as_ref()))
        .await
        .map_err(|e| AlarmError::Playback(format!("Task join error: {}", e)))?
}

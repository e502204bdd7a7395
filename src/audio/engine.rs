//! Sound Engine for alarm playback
//!
//! Uses a channel-based architecture to handle rodio's non-Send stream.
//! The engine spawns a dedicated audio thread that owns the playback infrastructure.

use super::PlaybackDriver;
use crate::error::{AlarmError, AlarmResult};
use rodio::source::{SineWave, Zero};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const BEEP_FREQ_HZ: f32 = 880.0;
const BEEP_REPEATS: usize = 6;
const BEEP_ON: Duration = Duration::from_millis(200);
const BEEP_OFF: Duration = Duration::from_millis(150);

/// Default player used for radio streams
pub const STREAM_PLAYER: &str = "/usr/bin/cvlc";

type Reply = mpsc::Sender<Result<(), String>>;

/// Commands sent to the audio thread. Each one is answered once playback ends.
enum AudioCommand {
    PlayFile(PathBuf, Reply),
    PlayBytes(Vec<u8>, Reply),
    Beep(Option<PathBuf>, Reply),
}

/// Thread-safe handle to the sound engine
#[derive(Clone)]
pub struct SoundEngine {
    sender: mpsc::Sender<AudioCommand>,
    beep_path: Option<PathBuf>,
    stream_player: PathBuf,
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("beep_path", &self.beep_path)
            .field("stream_player", &self.stream_player)
            .finish()
    }
}

impl SoundEngine {
    pub fn new(beep_path: Option<PathBuf>) -> Self {
        let (sender, receiver) = mpsc::channel::<AudioCommand>();

        // Spawn dedicated audio thread
        thread::spawn(move || {
            Self::audio_thread(receiver);
        });

        Self {
            sender,
            beep_path,
            stream_player: PathBuf::from(STREAM_PLAYER),
        }
    }

    pub fn with_stream_player<P: Into<PathBuf>>(mut self, player: P) -> Self {
        self.stream_player = player.into();
        self
    }

    fn audio_thread(receiver: mpsc::Receiver<AudioCommand>) {
        // Initialize audio output on this thread
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(s) => s,
            Err(e) => {
                warn!("🔇 Failed to initialize audio output: {}", e);
                return;
            }
        };

        // Keep stream alive
        let _stream = stream;

        info!("🔊 Audio thread started");

        while let Ok(cmd) = receiver.recv() {
            // A fresh sink per command, a stopped or drained sink is not reused
            let sink = match Sink::try_new(&stream_handle) {
                Ok(s) => s,
                Err(e) => {
                    error!("❌ Failed to create audio sink: {}", e);
                    break;
                }
            };

            let (result, reply) = match cmd {
                AudioCommand::PlayFile(path, reply) => {
                    info!("🔊 Playing file: {:?}", path);
                    (Self::queue_file(&sink, &path), reply)
                }
                AudioCommand::PlayBytes(bytes, reply) => {
                    debug!("🔊 Playing {} bytes of audio", bytes.len());
                    (Self::queue_bytes(&sink, bytes), reply)
                }
                AudioCommand::Beep(path, reply) => {
                    Self::queue_beep(&sink, path.as_deref());
                    (Ok(()), reply)
                }
            };

            if result.is_ok() {
                sink.sleep_until_end();
            }
            let _ = reply.send(result);
        }

        info!("🔇 Audio thread stopped");
    }

    fn queue_file(sink: &Sink, path: &Path) -> Result<(), String> {
        if !path.exists() {
            return Err(format!("Audio file not found: {:?}", path));
        }

        let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())?;
        sink.append(source);
        Ok(())
    }

    fn queue_bytes(sink: &Sink, bytes: Vec<u8>) -> Result<(), String> {
        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        sink.append(source);
        Ok(())
    }

    /// Queue the configured beep file, or the generated tone when there is
    /// none or it cannot be decoded. Always queues something.
    fn queue_beep(sink: &Sink, path: Option<&Path>) {
        match path {
            Some(path) if path.exists() => {
                if let Err(e) = Self::queue_file(sink, path) {
                    warn!("⚠️ Beep file {:?} unusable ({}), using generated tone", path, e);
                    Self::queue_tone(sink);
                }
            }
            _ => {
                debug!("🔔 No beep file, using generated tone");
                Self::queue_tone(sink);
            }
        }
    }

    fn queue_tone(sink: &Sink) {
        for _ in 0..BEEP_REPEATS {
            sink.append(
                SineWave::new(BEEP_FREQ_HZ)
                    .take_duration(BEEP_ON)
                    .amplify(0.4),
            );
            sink.append(Zero::<f32>::new(1, 44_100).take_duration(BEEP_OFF));
        }
    }

    fn request(&self, make: impl FnOnce(Reply) -> AudioCommand) -> AlarmResult<()> {
        let (tx, rx) = mpsc::channel();
        self.sender
            .send(make(tx))
            .map_err(|e| AlarmError::Playback(format!("Audio thread disconnected: {}", e)))?;

        rx.recv()
            .map_err(|e| AlarmError::Playback(format!("Audio thread disconnected: {}", e)))?
            .map_err(AlarmError::Playback)
    }
}

impl PlaybackDriver for SoundEngine {
    fn play_file(&self, path: &Path) -> AlarmResult<()> {
        self.request(|reply| AudioCommand::PlayFile(path.to_path_buf(), reply))
    }

    fn play_audio(&self, bytes: Vec<u8>) -> AlarmResult<()> {
        self.request(|reply| AudioCommand::PlayBytes(bytes, reply))
    }

    fn play_beep(&self) -> AlarmResult<()> {
        let path = self.beep_path.clone();
        self.request(|reply| AudioCommand::Beep(path, reply))
    }

    fn open_stream(&self, url: &str, args: &str) -> AlarmResult<()> {
        info!("📻 Opening radio stream {}", url);
        Command::new(&self.stream_player)
            .arg(url)
            .args(args.split_whitespace())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AlarmError::Playback(format!(
                    "Failed to spawn {}: {}",
                    self.stream_player.display(),
                    e
                ))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stream_player_is_playback_error() {
        let engine = SoundEngine::new(None).with_stream_player("/no/such/player");
        let result = engine.open_stream("http://radio.example", "--no-video");
        assert!(matches!(result, Err(AlarmError::Playback(_))));
    }

    #[test]
    fn test_undecodable_beep_file_falls_back_to_tone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beep.wav");
        std::fs::write(&path, b"not audio at all").unwrap();

        let (sink, _queue) = Sink::new_idle();
        SoundEngine::queue_beep(&sink, Some(&path));
        assert_eq!(sink.len(), BEEP_REPEATS * 2);
    }

    #[test]
    fn test_missing_beep_file_uses_tone() {
        let (sink, _queue) = Sink::new_idle();
        SoundEngine::queue_beep(&sink, Some(Path::new("/no/such/beep.wav")));
        assert_eq!(sink.len(), BEEP_REPEATS * 2);

        let (sink, _queue) = Sink::new_idle();
        SoundEngine::queue_beep(&sink, None);
        assert_eq!(sink.len(), BEEP_REPEATS * 2);
    }
}

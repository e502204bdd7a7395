//! AlarmPi Library
//!
//! Builds and plays a spoken alarm: greeting, weather and news assembled into
//! one script, read out by a configurable TTS engine.

pub mod alarm;
pub mod audio;
pub mod config;
pub mod content;
pub mod error;
pub mod event_log;
pub mod media;
pub mod tts;

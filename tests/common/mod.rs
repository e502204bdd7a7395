#![allow(dead_code)]

pub mod mock_driver;
pub mod mock_tts;

use alarmpi::config::{AlarmConfig, Section};
use alarmpi::content::ContentHandler;
use indexmap::IndexMap;
use std::path::Path;

/// Config that needs no network: greeting plus one text file section
pub fn offline_config(note: &Path) -> AlarmConfig {
    let mut config = AlarmConfig::default();
    config.main.alarm_time = Some("06:30".to_string());
    config.main.end = "Have a nice day.".to_string();

    let mut content = IndexMap::new();
    content.insert(
        "greeting".to_string(),
        Section::new(ContentHandler::Greeting, true).with("name", "Ada"),
    );
    content.insert(
        "BBC_news".to_string(),
        Section::new(ContentHandler::BbcNews, false),
    );
    content.insert(
        "notes".to_string(),
        Section::new(ContentHandler::TextFile, true)
            .with("filepath", note.to_string_lossy().to_string()),
    );
    config.content = content;

    for section in config.tts.values_mut() {
        section.enabled = false;
    }
    config
}

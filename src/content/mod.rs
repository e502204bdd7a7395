//! Alarm content
//!
//! Each enabled `content` section names a handler that turns the section's
//! settings into one spoken fragment. Generators never fail: network and
//! parsing problems come back as a spoken failure message.

use crate::config::{AlarmConfig, Section};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod greeting;
pub mod news;
pub mod textfile;
pub mod weather;

pub use greeting::Greeting;
pub use news::NewsParser;
pub use textfile::TextFile;
pub use weather::OpenWeatherClient;

/// Trait for alarm content sources
#[async_trait]
pub trait ContentGenerator: Send + Sync + std::fmt::Debug {
    /// Produce the spoken fragment. Errors are reported in the text itself.
    async fn generate(&self) -> String;

    /// Get the generator name
    fn name(&self) -> &str;
}

/// Handler identifiers accepted in `content` sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentHandler {
    #[serde(rename = "greeting")]
    Greeting,
    #[serde(rename = "openweather", alias = "openweathermap")]
    OpenWeather,
    #[serde(rename = "bbc_news")]
    BbcNews,
    #[serde(rename = "textfile")]
    TextFile,
}

impl ContentHandler {
    pub fn id(&self) -> &'static str {
        match self {
            ContentHandler::Greeting => "greeting",
            ContentHandler::OpenWeather => "openweather",
            ContentHandler::BbcNews => "bbc_news",
            ContentHandler::TextFile => "textfile",
        }
    }

    /// Construct the generator this handler names, bound to `section`
    pub fn create(
        &self,
        section: &Section<ContentHandler>,
        config: &AlarmConfig,
    ) -> Box<dyn ContentGenerator> {
        match self {
            ContentHandler::Greeting => Box::new(Greeting::from_section(section, config.alarm_time())),
            ContentHandler::OpenWeather => Box::new(OpenWeatherClient::new(section)),
            ContentHandler::BbcNews => Box::new(NewsParser::new(section)),
            ContentHandler::TextFile => Box::new(TextFile::new(section)),
        }
    }
}

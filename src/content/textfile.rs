//! Reads a local text file aloud

use super::{ContentGenerator, ContentHandler};
use crate::config::Section;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

pub const FAILURE_TEXT: &str = "Textfile enabled but file could not be read.";

#[derive(Debug, Clone)]
pub struct TextFile {
    path: Option<PathBuf>,
}

impl TextFile {
    pub fn new(section: &Section<ContentHandler>) -> Self {
        Self {
            path: section.get_str("filepath").map(PathBuf::from),
        }
    }
}

#[async_trait]
impl ContentGenerator for TextFile {
    async fn generate(&self) -> String {
        let Some(path) = &self.path else {
            warn!("⚠️ textfile section has no filepath");
            return FAILURE_TEXT.to_string();
        };

        match tokio::fs::read_to_string(path).await {
            Ok(text) => text.replace('\n', "  "),
            Err(e) => {
                warn!("⚠️ Could not read {}: {}", path.display(), e);
                FAILURE_TEXT.to_string()
            }
        }
    }

    fn name(&self) -> &str {
        "textfile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newlines_become_pauses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "Take out the bins.\nWater the plants.").unwrap();

        let section = Section::new(ContentHandler::TextFile, true)
            .with("filepath", path.to_string_lossy().to_string());
        let text = TextFile::new(&section).generate().await;
        assert_eq!(text, "Take out the bins.  Water the plants.");
    }

    #[tokio::test]
    async fn test_missing_file_reports_failure() {
        let section = Section::new(ContentHandler::TextFile, true)
            .with("filepath", "/no/such/note.txt");
        assert_eq!(TextFile::new(&section).generate().await, FAILURE_TEXT);

        let unset = Section::new(ContentHandler::TextFile, true);
        assert_eq!(TextFile::new(&unset).generate().await, FAILURE_TEXT);
    }
}

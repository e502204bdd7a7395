//! Wakeup song selection

use crate::error::{AlarmError, AlarmResult};
use lofty::prelude::*;
use lofty::probe::Probe;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::debug;

/// All files matching a glob pattern
pub fn matching_files(pattern: &str) -> AlarmResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| AlarmError::Media(format!("Invalid wakeup song pattern {}: {}", pattern, e)))?;

    Ok(paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect())
}

/// Pick one wakeup song at random. No match is a setup mistake and an error.
pub fn pick_wakeup_song(pattern: &str) -> AlarmResult<PathBuf> {
    let files = matching_files(pattern)?;
    debug!("🎵 {} candidate wakeup songs for {}", files.len(), pattern);

    files
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| AlarmError::Media(format!("No wakeup song matches {}", pattern)))
}

/// Display name "Artist - Title" from the file's tags, or the file name
pub fn song_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let Ok(tagged_file) = Probe::open(path).and_then(|p| p.read()) else {
        return file_name;
    };
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return file_name;
    };

    let artist = tag
        .get_string(&lofty::tag::ItemKey::AlbumArtist)
        .or_else(|| tag.get_string(&lofty::tag::ItemKey::TrackArtist))
        .unwrap_or_default();
    let title = tag
        .get_string(&lofty::tag::ItemKey::TrackTitle)
        .map(str::to_string)
        .unwrap_or(file_name);

    format!("{} - {}", artist, title)
        .trim_start_matches(['-', ' '])
        .to_string()
}

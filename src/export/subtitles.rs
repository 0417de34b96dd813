/*!
 * Side-channel subtitle lines appended to exported scripts.
 *
 * Every file in the subtitle folder belongs to the script named after its
 * file stem. The folder is read on first use and kept for the whole run.
 */

use log::{debug, warn};
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::file_utils::FileManager;

#[derive(Debug, Default)]
pub struct SubtitleStore {
    folder: PathBuf,
    cache: OnceCell<HashMap<String, Vec<String>>>,
}

impl SubtitleStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            cache: OnceCell::new(),
        }
    }

    /// Subtitle lines for `script`, empty when there are none
    pub fn lines_for(&self, script: &str) -> &[String] {
        self.cache
            .get_or_init(|| self.load())
            .get(script)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    fn load(&self) -> HashMap<String, Vec<String>> {
        let mut subtitles = HashMap::new();
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(_) => {
                debug!("No subtitle folder at {:?}", self.folder);
                return subtitles;
            }
        };

        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            match FileManager::read_lines(&path) {
                Ok(lines) => {
                    subtitles.insert(stem, lines);
                }
                Err(e) => warn!("Skipping subtitle file {:?}: {:#}", path, e),
            }
        }
        debug!("{} subtitle files loaded", subtitles.len());
        subtitles
    }
}

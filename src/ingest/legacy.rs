//! Flat `japanese<TAB>english` cache files from older versions of the tool.

use anyhow::Result;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::memory::{TranslationKind, TranslationMemory};

/// Legacy cache file names and the translation kind each one holds
pub const LEGACY_CACHES: [(&str, TranslationKind); 3] = [
    ("OfficialTranslationCache.txt", TranslationKind::Official),
    ("ManualTranslationCache.txt", TranslationKind::Manual),
    ("MachineTranslationCache.txt", TranslationKind::Machine),
];

/// Fold one flat cache into the memory, returning the number of entries used.
///
/// Lines without a tab or with an empty side are ignored.
pub fn load_flat_cache(memory: &mut TranslationMemory, path: &Path, kind: TranslationKind) -> Result<usize> {
    let mut count = 0;
    for line in FileManager::read_lines(path)? {
        let Some((japanese, english)) = line.split_once('\t') else {
            continue;
        };
        let english = english.trim();
        if english.is_empty() {
            continue;
        }
        if memory.ingest(japanese, english, Some(kind), "", "") {
            count += 1;
        }
    }
    Ok(count)
}

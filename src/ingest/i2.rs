/*!
 * Localization term documents exported from the game's I2 language assets.
 *
 * Each document is `{"mTerms": [{"Term": ..., "Languages": [ja, en, ...]}]}`.
 * The English column is shipped text and is stored as an official translation.
 */

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::memory::{TranslationKind, TranslationMemory};

/// Documents looked for in the cache folder
pub const I2_DOCUMENTS: [&str; 4] = ["dynamic.json", "dance_subtitle.json", "parts.json", "yotogi.json"];

#[derive(Debug, Deserialize)]
struct TermDocument {
    #[serde(rename = "mTerms", default)]
    terms: Vec<TermData>,
}

#[derive(Debug, Deserialize)]
struct TermData {
    #[serde(rename = "Languages", default)]
    languages: Vec<Option<String>>,
}

impl TermData {
    fn column(&self, index: usize) -> &str {
        self.languages
            .get(index)
            .and_then(|l| l.as_deref())
            .unwrap_or_default()
    }
}

/// Fold one I2 document into the memory, returning the number of terms used
pub fn load_term_document(memory: &mut TranslationMemory, path: &Path) -> Result<usize> {
    let json = FileManager::read_to_string(path)?;
    let document: TermDocument =
        serde_json::from_str(&json).with_context(|| format!("Invalid term document: {:?}", path))?;

    let mut count = 0;
    for term in &document.terms {
        if memory.ingest(term.column(0), term.column(1), Some(TranslationKind::Official), "", "") {
            count += 1;
        }
    }
    Ok(count)
}

/*!
 * UI term tables (`Key,Type,Desc,Japanese,English`).
 *
 * Tables found under an `ENG` folder come from the English release and
 * their English column is stored as official text. Other tables only
 * register the Japanese term and its table of origin.
 */

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::warn;
use std::path::Path;

use crate::memory::{TranslationKind, TranslationMemory};

const KEY_COLUMN: usize = 0;
const JAPANESE_COLUMN: usize = 3;
const ENGLISH_COLUMN: usize = 4;
const REQUIRED_COLUMNS: usize = 5;

/// Result of folding one table
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CsvSummary {
    /// Rows that reached the memory
    pub terms: usize,
    /// Human-readable description of every skipped row
    pub skipped: Vec<String>,
}

/// Whether a table under `ui_folder` holds shipped English text
pub fn is_official_table(ui_folder: &Path, path: &Path) -> bool {
    path.strip_prefix(ui_folder)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str() == "ENG")
}

/// Fold one CSV term table into the memory.
///
/// The first row is the header. Rows with fewer than five columns or that
/// cannot be decoded are skipped and listed; extra columns are ignored.
pub fn load_csv_terms(memory: &mut TranslationMemory, path: &Path, official: bool) -> Result<CsvSummary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open term table: {:?}", path))?;

    let table = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = official.then_some(TranslationKind::Official);
    let mut summary = CsvSummary::default();

    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map_or(index as u64 + 2, |p| p.line());
                warn!("Line {} of {:?} cannot be parsed: {}", line, path, e);
                summary.skipped.push(format!("{} line {}", table, line));
                if e.is_io_error() {
                    break;
                }
                continue;
            }
        };

        if row.len() < REQUIRED_COLUMNS {
            let line = row.position().map_or(index as u64 + 2, |p| p.line());
            warn!(
                "{} has less than the {} required entries",
                row.iter().collect::<Vec<_>>().join(","),
                REQUIRED_COLUMNS
            );
            summary.skipped.push(format!("{} line {}", table, line));
            continue;
        }

        let key = row.get(KEY_COLUMN).unwrap_or_default().trim();
        let japanese = row.get(JAPANESE_COLUMN).unwrap_or_default().trim();
        let mut english = row.get(ENGLISH_COLUMN).unwrap_or_default().trim();

        // Untranslated entries repeat the key as a placeholder.
        if english == key {
            english = "";
        }

        if memory.ingest(japanese, english, kind, "", &table) {
            summary.terms += 1;
        }
    }

    Ok(summary)
}

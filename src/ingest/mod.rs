/*!
 * Startup ingestion of every side source into the translation memory.
 *
 * Sources are folded in a fixed order:
 * - `JpCache.json`: script provenance for every cached line
 * - legacy flat caches: official, manual and machine translations
 * - I2 term documents: official UI translations
 * - CSV term tables from the Japanese UI folder
 *
 * The memory is saved after each source that contributed entries.
 */

use anyhow::Result;
use log::{info, warn};

use crate::app_config::PathsConfig;
use crate::file_utils::FileManager;
use crate::memory::TranslationMemory;
use crate::sources::{self, JpCache};

pub mod csv_terms;
pub mod i2;
pub mod legacy;

/// What one source contributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub entries: usize,
    /// Rows or files that were skipped, with their location
    pub skipped: Vec<String>,
}

impl IngestReport {
    fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Register every cached line under its script
pub fn ingest_jp_cache(memory: &mut TranslationMemory, cache: &JpCache) -> usize {
    let mut count = 0;
    for (script, lines) in cache {
        for line in lines {
            if memory.ingest(line, "", None, script, "") {
                count += 1;
            }
        }
    }
    count
}

/// Fold every available side source into `memory`
pub fn ingest_startup(memory: &mut TranslationMemory, paths: &PathsConfig) -> Result<Vec<IngestReport>> {
    let mut reports = Vec::new();

    if FileManager::file_exists(&paths.jp_cache_file) {
        let mut report = IngestReport::new("JpCache.json");
        match sources::load_jp_cache(&paths.jp_cache_file) {
            Ok(cache) => {
                report.entries = ingest_jp_cache(memory, &cache);
                info!("{} scripts loaded from JpCache.json", cache.len());
            }
            Err(e) => {
                warn!("{:#}", e);
                report.skipped.push(paths.jp_cache_file.display().to_string());
            }
        }
        finish_source(memory, &mut reports, report)?;
    }

    let mut report = IngestReport::new("legacy caches");
    for (name, kind) in legacy::LEGACY_CACHES {
        let path = paths.cache_folder.join(name);
        if !FileManager::file_exists(&path) {
            continue;
        }
        match legacy::load_flat_cache(memory, &path, kind) {
            Ok(count) => {
                info!("Legacy {} translations loaded: {}", kind.label(), count);
                report.entries += count;
            }
            Err(e) => {
                warn!("{:#}", e);
                report.skipped.push(name.to_string());
            }
        }
    }
    finish_source(memory, &mut reports, report)?;

    let mut report = IngestReport::new("I2 term documents");
    for name in i2::I2_DOCUMENTS {
        let path = paths.cache_folder.join(name);
        if !FileManager::file_exists(&path) {
            continue;
        }
        match i2::load_term_document(memory, &path) {
            Ok(count) => {
                info!("{} translations recovered from {}", count, name);
                report.entries += count;
            }
            Err(e) => {
                warn!("{:#}", e);
                report.skipped.push(name.to_string());
            }
        }
    }
    finish_source(memory, &mut reports, report)?;

    let mut report = IngestReport::new("CSV term tables");
    for path in csv_tables(paths) {
        let official = csv_terms::is_official_table(&paths.japanese_ui_folder, &path);
        match csv_terms::load_csv_terms(memory, &path, official) {
            Ok(summary) => {
                report.entries += summary.terms;
                report.skipped.extend(summary.skipped);
            }
            Err(e) => {
                warn!("{:#}", e);
                report.skipped.push(path.display().to_string());
            }
        }
    }
    if !report.skipped.is_empty() {
        warn!("{} term table rows were skipped", report.skipped.len());
    }
    finish_source(memory, &mut reports, report)?;

    Ok(reports)
}

// English release tables go first so their official text is seen before
// any other table registers the same term.
fn csv_tables(paths: &PathsConfig) -> Vec<std::path::PathBuf> {
    if !FileManager::dir_exists(&paths.japanese_ui_folder) {
        return Vec::new();
    }
    let mut tables = FileManager::find_files(&paths.japanese_ui_folder, "csv").unwrap_or_else(|e| {
        warn!("Could not list {:?}: {:#}", paths.japanese_ui_folder, e);
        Vec::new()
    });
    tables.sort_by_key(|p| (!csv_terms::is_official_table(&paths.japanese_ui_folder, p), p.clone()));
    tables
}

fn finish_source(
    memory: &TranslationMemory,
    reports: &mut Vec<IngestReport>,
    report: IngestReport,
) -> Result<()> {
    if report.entries > 0 {
        memory.save()?;
        info!("{} entries from {} saved to the translation data", report.entries, report.source);
    }
    if report.entries > 0 || !report.skipped.is_empty() {
        reports.push(report);
    }
    Ok(())
}

/*!
 * The translation memory store.
 *
 * Owns every line record, keyed by trimmed Japanese text, and persists the
 * whole collection as one JSON document.
 */

use chrono::Local;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::record::{LineRecord, TranslationKind};
use crate::errors::StoreError;

/// Per-kind counts over the whole memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub lines: usize,
    pub official: usize,
    pub machine: usize,
    pub manual: usize,
}

/// Outcome of the destructive machine-translation clearing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The operator did not confirm; nothing changed
    Aborted,
    /// Every machine translation was cleared after backing up to `backup`
    Cleared { backup: PathBuf, cleared: usize },
}

/// Process-wide translation memory
#[derive(Debug, Default)]
pub struct TranslationMemory {
    records: IndexMap<String, LineRecord>,
    path: PathBuf,
}

impl TranslationMemory {
    /// Create an empty memory bound to a durable artifact path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            records: IndexMap::new(),
            path: path.into(),
        }
    }

    /// Load the memory from `path`; a missing file gives an empty memory
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut memory = Self::new(path);
        memory.reload()?;
        Ok(memory)
    }

    /// Replace the in-memory content with the durable artifact's content
    pub fn reload(&mut self) -> Result<(), StoreError> {
        if !self.path.is_file() {
            debug!("No translation data at {:?}, starting empty", self.path);
            self.records.clear();
            return Ok(());
        }

        let json = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: IndexMap<String, LineRecord> =
            serde_json::from_str(&json).map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?;

        // Older documents may carry untrimmed keys; fold them onto the trimmed key.
        self.records.clear();
        for (japanese, record) in records {
            let key = japanese.trim();
            if key.is_empty() {
                continue;
            }
            let entry = self.records.entry(key.to_string()).or_default();
            entry.merge_translation(TranslationKind::Official, &record.official);
            entry.merge_translation(TranslationKind::Machine, &record.machine);
            entry.merge_translation(TranslationKind::Manual, &record.manual);
            entry.script_files.extend(record.script_files);
        }
        Ok(())
    }

    /// Persist the whole memory to its durable artifact
    pub fn save(&self) -> Result<(), StoreError> {
        info!("Saving translation data...");
        self.save_to(&self.path)?;
        info!("Translation data saved ({} lines)", self.records.len());
        Ok(())
    }

    fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        write_atomic(path, |file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.records).map_err(|source| {
                StoreError::Serialization { path: path.to_path_buf(), source }
            })?;
            writer.flush().map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, japanese: &str) -> Option<&LineRecord> {
        self.records.get(japanese.trim())
    }

    /// Iterate records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LineRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return the record for `japanese`, inserting an empty one if needed
    pub fn get_or_create(&mut self, japanese: &str) -> Result<&mut LineRecord, StoreError> {
        let key = japanese.trim();
        if key.is_empty() {
            return Err(StoreError::BlankKey);
        }
        Ok(self.records.entry(key.to_string()).or_default())
    }

    /// Merge one observation of a Japanese line into the memory.
    ///
    /// Returns false (and does nothing) when `japanese` is blank.
    pub fn ingest(
        &mut self,
        japanese: &str,
        translation: &str,
        kind: Option<TranslationKind>,
        script_file: &str,
        csv_file: &str,
    ) -> bool {
        let Ok(record) = self.get_or_create(japanese) else {
            return false;
        };
        if let Some(kind) = kind {
            record.merge_translation(kind, translation);
        }
        record.add_script_file(script_file);
        record.add_csv_file(csv_file);
        true
    }

    /// Delete the record for `japanese` if present
    pub fn remove(&mut self, japanese: &str) -> Option<LineRecord> {
        self.records.shift_remove(japanese.trim())
    }

    pub fn stats(&self) -> MemoryStats {
        let count = |kind| {
            self.records
                .values()
                .filter(|r| !r.get(kind).trim().is_empty())
                .count()
        };
        MemoryStats {
            lines: self.records.len(),
            official: count(TranslationKind::Official),
            machine: count(TranslationKind::Machine),
            manual: count(TranslationKind::Manual),
        }
    }

    /// Clear every machine translation after operator confirmation.
    ///
    /// A timestamped backup of the durable artifact is written into
    /// `backup_dir` before anything is modified.
    pub fn clear_machine_translations<C>(
        &mut self,
        backup_dir: &Path,
        confirm: C,
    ) -> Result<ClearOutcome, StoreError>
    where
        C: FnOnce() -> bool,
    {
        if !confirm() {
            warn!("Clearing machine translations aborted");
            return Ok(ClearOutcome::Aborted);
        }

        let stamp = Local::now().format("%Y-%m-%d %H%M%S");
        let backup = backup_dir.join(format!("({})_TranslationData_Backup.json", stamp));
        fs::create_dir_all(backup_dir).map_err(|source| StoreError::Backup {
            path: backup.clone(),
            source,
        })?;

        if self.path.is_file() {
            fs::copy(&self.path, &backup).map_err(|source| StoreError::Backup {
                path: backup.clone(),
                source,
            })?;
        } else {
            self.save_to(&backup)?;
        }

        let mut cleared = 0;
        for record in self.records.values_mut() {
            if !record.machine.is_empty() {
                record.machine.clear();
                cleared += 1;
            }
        }
        self.save()?;

        warn!("Cleared {} machine translations, backup at {:?}", cleared, backup);
        Ok(ClearOutcome::Cleared { backup, cleared })
    }
}

/// Write `path` through a sibling temporary file that replaces it only
/// once `write` has fully succeeded.
fn write_atomic<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut fs::File) -> Result<(), StoreError>,
{
    let io_err = |source| StoreError::Io { path: path.to_path_buf(), source };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/*!
 * Export of the translation memory back into per-script files.
 *
 * Records are regrouped by the scripts that reference them, each line is
 * emitted as `japanese<TAB>english` through the resolution policy, subtitle
 * lines are appended, and the result is written in the selected format.
 *
 * - `routing`: category folder of a script
 * - `subtitles`: lazily loaded side-channel subtitle lines
 * - `retry`: bounded retries for file writes
 * - `writers`: text, BSON and zstd/MessagePack serializers
 */

use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::errors::ExportError;
use crate::memory::TranslationMemory;

pub use self::retry::RetryPolicy;
pub use self::subtitles::SubtitleStore;

pub mod retry;
pub mod routing;
pub mod subtitles;
pub mod writers;

/// Output format of an export
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One text file per script under category folders
    Txt,
    /// Single `script.bson` document
    #[default]
    Bson,
    /// Single zstd-compressed MessagePack `script.zst`
    Zst,
}

impl ExportFormat {
    /// File written by the single-document formats
    pub fn container_name(&self) -> Option<&'static str> {
        match self {
            Self::Txt => None,
            Self::Bson => Some("script.bson"),
            Self::Zst => Some("script.zst"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Txt => "txt",
            Self::Bson => "bson",
            Self::Zst => "zst",
        };
        write!(f, "{}", name)
    }
}

/// One script's export content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnit {
    pub script: String,
    pub lines: Vec<String>,
}

impl ExportUnit {
    /// Lines joined with newlines, surrounding whitespace trimmed
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// Outcome of one export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Scripts exported
    pub scripts: usize,
    /// Files written
    pub written: Vec<PathBuf>,
    /// Text files that could not be written after every retry
    pub failures: Vec<String>,
    /// Where a previous text export was moved
    pub rotated: Option<PathBuf>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `japanese<TAB>english` lines of every script, in memory order.
///
/// Tabs inside translations are dropped so each line keeps two columns.
pub fn group_by_script(memory: &TranslationMemory, safe_export: bool) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for (japanese, record) in memory.iter() {
        if record.script_files.is_empty() {
            continue;
        }
        let english = record.resolve(safe_export).text.replace('\t', "");
        let line = format!("{}\t{}", japanese, english);
        for script in &record.script_files {
            groups.entry(script.clone()).or_default().push(line.clone());
        }
    }
    groups
}

/// Build every export unit, subtitle lines included
pub fn build_units(memory: &TranslationMemory, safe_export: bool, subtitles: &SubtitleStore) -> Vec<ExportUnit> {
    group_by_script(memory, safe_export)
        .into_iter()
        .map(|(script, mut lines)| {
            lines.extend(subtitles.lines_for(&script).iter().cloned());
            ExportUnit { script, lines }
        })
        .collect()
}

/// Writes the translation memory to the export folder
#[derive(Debug)]
pub struct Exporter {
    root: PathBuf,
    format: ExportFormat,
    safe_export: bool,
    retry: RetryPolicy,
    subtitles: SubtitleStore,
}

impl Exporter {
    pub fn new(root: impl Into<PathBuf>, format: ExportFormat, subtitle_folder: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format,
            safe_export: false,
            retry: RetryPolicy::default(),
            subtitles: SubtitleStore::new(subtitle_folder),
        }
    }

    /// Withhold official translations from the output
    pub fn safe_export(mut self, safe_export: bool) -> Self {
        self.safe_export = safe_export;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Export every script referenced by the memory.
    ///
    /// Text files that keep failing are listed in the report; they do not
    /// stop the export.
    pub async fn export(&self, memory: &TranslationMemory) -> Result<ExportReport, ExportError> {
        let units = build_units(memory, self.safe_export, &self.subtitles);
        let mut report = ExportReport {
            scripts: units.len(),
            ..Default::default()
        };

        match self.format.container_name() {
            None => {
                info!("Exporting as a batch of .txt files...");
                report.rotated = writers::prepare_text_root(&self.root)?;
                for unit in &units {
                    if writers::write_text_unit(&self.root, unit, &self.retry).await {
                        report.written.push(writers::text_path(&self.root, unit));
                    } else {
                        report.failures.push(format!("{}.txt", unit.script));
                    }
                }
            }
            Some(name) => {
                let path = self.root.join(name);
                info!("Saving scripts as {}", name);
                match self.format {
                    ExportFormat::Zst => writers::write_zst(&path, &units)?,
                    _ => writers::write_bson(&path, &units)?,
                }
                report.written.push(path);
            }
        }

        if report.is_complete() {
            info!("{} scripts exported to {:?}", report.scripts, self.root);
        } else {
            warn!("{} scripts could not be written:", report.failures.len());
            for failure in &report.failures {
                warn!("  {}", failure);
            }
        }
        Ok(report)
    }
}

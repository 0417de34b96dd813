/*!
 * Where the Japanese script lines of a run come from.
 *
 * One source is picked per run, in this order of preference:
 * - the pre-extracted cache (`JpCache.json`, script -> lines)
 * - loose `.txt` script files under the Japanese script folder
 * - the translation memory itself, limited to scripts that still have
 *   at least one line without a usable translation
 */

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::memory::TranslationMemory;

/// Pre-extracted cache document: script name -> ordered Japanese lines
pub type JpCache = IndexMap<String, Vec<String>>;

/// Script source chosen for one run
#[derive(Debug, Clone)]
pub enum ScriptSource {
    /// Scripts and lines from the pre-extracted cache
    JpCache(JpCache),
    /// Loose script files grouped by script name
    ScriptFiles(IndexMap<String, Vec<PathBuf>>),
    /// Scripts recorded in the translation memory
    Memory,
}

impl ScriptSource {
    /// Pick the best available source
    pub fn select(jp_cache_path: &Path, script_folder: &Path) -> Self {
        if jp_cache_path.is_file() {
            match load_jp_cache(jp_cache_path) {
                Ok(cache) => {
                    info!("Loading {} scripts from {:?}", cache.len(), jp_cache_path);
                    return Self::JpCache(cache);
                }
                Err(e) => warn!("Ignoring unreadable script cache: {:#}", e),
            }
        }

        let files = if FileManager::dir_exists(script_folder) {
            FileManager::find_files(script_folder, "txt").unwrap_or_else(|e| {
                warn!("Could not list {:?}: {:#}", script_folder, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        if !files.is_empty() {
            info!("Loading {} files from the Japanese script folder", files.len());
            return Self::ScriptFiles(group_by_script(files));
        }

        info!("Loading scripts with untranslated lines from the translation memory");
        Self::Memory
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::JpCache(_) => "script cache",
            Self::ScriptFiles(_) => "script files",
            Self::Memory => "translation memory",
        }
    }

    /// Names of every script this source provides
    pub fn list_scripts(&self, memory: &TranslationMemory, safe_export: bool) -> Vec<String> {
        match self {
            Self::JpCache(cache) => cache.keys().cloned().collect(),
            Self::ScriptFiles(files) => files.keys().cloned().collect(),
            Self::Memory => {
                let scripts: IndexSet<&str> = memory
                    .iter()
                    .filter(|(_, record)| !record.is_resolvable(safe_export))
                    .flat_map(|(_, record)| record.script_files.iter().map(String::as_str))
                    .collect();
                scripts.into_iter().map(str::to_string).collect()
            }
        }
    }

    /// Distinct non-blank lines of `script`, in first-seen order
    pub fn lines_for(&self, script: &str, memory: &TranslationMemory, safe_export: bool) -> Vec<String> {
        match self {
            Self::JpCache(cache) => distinct(cache.get(script).into_iter().flatten().map(String::as_str)),
            Self::ScriptFiles(files) => {
                let mut content = Vec::new();
                for path in files.get(script).into_iter().flatten() {
                    match read_script_lines(path) {
                        Ok(lines) => content.extend(lines),
                        Err(e) => warn!("Skipping unreadable script {:?}: {:#}", path, e),
                    }
                }
                distinct(content.iter().map(String::as_str))
            }
            Self::Memory => distinct(
                memory
                    .iter()
                    .filter(|(_, record)| {
                        record.script_files.contains(script) && !record.is_resolvable(safe_export)
                    })
                    .map(|(japanese, _)| japanese),
            ),
        }
    }
}

/// Read the pre-extracted cache document
pub fn load_jp_cache(path: &Path) -> Result<JpCache> {
    let json = FileManager::read_to_string(path)?;
    serde_json::from_str(&json).with_context(|| format!("Invalid script cache: {:?}", path))
}

/// Script name of a loose file: its file name without the `.txt` suffix
pub fn script_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".txt") => {
            name[..cut].to_string()
        }
        _ => name,
    }
}

fn group_by_script(files: Vec<PathBuf>) -> IndexMap<String, Vec<PathBuf>> {
    let mut grouped: IndexMap<String, Vec<PathBuf>> = IndexMap::new();
    for file in files {
        grouped.entry(script_name(&file)).or_default().push(file);
    }
    grouped
}

// A loose script line may already carry a translation after a tab; only the
// Japanese side is a source line.
fn read_script_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(|line| line.split('\t').next().unwrap_or_default().to_string())
        .collect())
}

fn distinct<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: IndexSet<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    unique.into_iter().map(str::to_string).collect()
}

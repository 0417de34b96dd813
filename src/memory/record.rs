/*!
 * The line record: one translated sentence of the translation memory.
 */

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which translation field a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKind {
    /// Shipped localization from the game itself
    Official,
    /// Produced by an automated translator
    Machine,
    /// Human-curated override
    Manual,
}

impl TranslationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Machine => "machine",
            Self::Manual => "manual",
        }
    }
}

/// Result of the resolution policy for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Selected English text, empty when nothing is available
    pub text: &'a str,
    /// Field the text came from, `None` when nothing is available
    pub kind: Option<TranslationKind>,
}

impl Resolution<'_> {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A translated line, keyed externally by its trimmed Japanese text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(rename = "Official", default, with = "nullable_string")]
    pub official: String,

    #[serde(rename = "Machine", default, with = "nullable_string")]
    pub machine: String,

    #[serde(rename = "Manual", default, with = "nullable_string")]
    pub manual: String,

    /// Scripts referencing this line
    #[serde(rename = "scriptFiles", default)]
    pub script_files: IndexSet<String>,

    /// UI term tables referencing this line; recomputed on every run
    #[serde(skip)]
    pub csv_files: IndexSet<String>,
}

impl LineRecord {
    /// Pick the English text to emit.
    ///
    /// Precedence is fixed: manual, then official (unless `safe_export`
    /// withholds it), then machine.
    pub fn resolve(&self, safe_export: bool) -> Resolution<'_> {
        if !self.manual.is_empty() {
            return Resolution { text: &self.manual, kind: Some(TranslationKind::Manual) };
        }
        if !self.official.is_empty() && !safe_export {
            return Resolution { text: &self.official, kind: Some(TranslationKind::Official) };
        }
        if !self.machine.is_empty() {
            return Resolution { text: &self.machine, kind: Some(TranslationKind::Machine) };
        }
        Resolution { text: "", kind: None }
    }

    /// Whether the record has any text the resolution policy can emit
    pub fn is_resolvable(&self, safe_export: bool) -> bool {
        !self.resolve(safe_export).is_empty()
    }

    pub fn get(&self, kind: TranslationKind) -> &str {
        match kind {
            TranslationKind::Official => &self.official,
            TranslationKind::Machine => &self.machine,
            TranslationKind::Manual => &self.manual,
        }
    }

    /// Merge a translation into the field selected by `kind`.
    ///
    /// Empty values never overwrite; the last non-empty write wins.
    pub fn merge_translation(&mut self, kind: TranslationKind, translation: &str) {
        if translation.is_empty() {
            return;
        }
        let field = match kind {
            TranslationKind::Official => &mut self.official,
            TranslationKind::Machine => &mut self.machine,
            TranslationKind::Manual => &mut self.manual,
        };
        *field = translation.to_string();
    }

    /// Record a referencing script. Returns true when it was not known yet.
    pub fn add_script_file(&mut self, script: &str) -> bool {
        !script.is_empty() && self.script_files.insert(script.to_string())
    }

    /// Record a referencing UI table. Returns true when it was not known yet.
    pub fn add_csv_file(&mut self, csv: &str) -> bool {
        !csv.is_empty() && self.csv_files.insert(csv.to_string())
    }
}

// The durable document was historically written with `null` for missing
// translations; read those as empty and write empty fields back as `null`.
mod nullable_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which resolves a Japanese
 * line against the translation memory and falls back to the selected
 * backend for lines the memory cannot answer yet.
 */

use log::{debug, error, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::postprocess::{self, TranslationAttempt};
use crate::app_config::{ProviderConfig, TranslationConfig, TranslationProvider};
use crate::file_utils::FileManager;
use crate::memory::{TranslationKind, TranslationMemory};
use crate::providers::chat::{ChatCompletionProvider, SamplingOptions};
use crate::providers::sugoi::SugoiProvider;
use crate::providers::{self, Translator};

/// What happened to one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank input, nothing to do
    Skipped,
    /// The memory already had a usable translation
    Resolved(TranslationKind),
    /// A fresh machine translation passed the quality gate and was stored
    Translated(String),
    /// The backend answered but the quality gate refused the text
    Rejected(TranslationAttempt),
    /// The backend call itself failed
    Failed(String),
    /// No backend is available
    Untranslatable,
}

/// Counters for one processing run
#[derive(Debug, Clone)]
pub struct TranslationStats {
    pub scripts: usize,
    pub lines: usize,
    pub resolved: usize,
    pub translated: usize,
    pub rejected: usize,
    pub failed: usize,
    pub untranslatable: usize,
    /// Time spent waiting for the backend
    pub api_duration: Duration,
    pub start_time: Instant,
}

impl Default for TranslationStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStats {
    pub fn new() -> Self {
        Self {
            scripts: 0,
            lines: 0,
            resolved: 0,
            translated: 0,
            rejected: 0,
            failed: 0,
            untranslatable: 0,
            api_duration: Duration::ZERO,
            start_time: Instant::now(),
        }
    }

    /// Count one line outcome
    pub fn record(&mut self, outcome: &LineOutcome) {
        match outcome {
            LineOutcome::Skipped => return,
            LineOutcome::Resolved(_) => self.resolved += 1,
            LineOutcome::Translated(_) => self.translated += 1,
            LineOutcome::Rejected(_) => self.rejected += 1,
            LineOutcome::Failed(_) => self.failed += 1,
            LineOutcome::Untranslatable => self.untranslatable += 1,
        }
        self.lines += 1;
    }

    /// Generate a summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Run Summary:\n\
             Scripts: {}\n\
             Lines: {}\n\
             Already translated: {}\n\
             Newly translated: {}\n\
             Rejected: {}\n\
             Failed: {}\n\
             Untranslatable: {}\n\
             Backend time: {:.1}s of {:.1}s",
            self.scripts,
            self.lines,
            self.resolved,
            self.translated,
            self.rejected,
            self.failed,
            self.untranslatable,
            self.api_duration.as_secs_f64(),
            self.start_time.elapsed().as_secs_f64(),
        )
    }
}

/// Build the client described by one provider entry
pub fn build_translator(config: &ProviderConfig) -> Box<dyn Translator> {
    match config.provider_type {
        TranslationProvider::Sugoi => Box::new(SugoiProvider::new(&config.endpoint, config.timeout_secs)),
        TranslationProvider::Chat => Box::new(ChatCompletionProvider::new(
            &config.endpoint,
            &config.api_key,
            &config.model,
            SamplingOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                repetition_penalty: config.repetition_penalty,
            },
            config.timeout_secs,
        )),
    }
}

/// Resolve-or-translate service
#[derive(Debug, Default)]
pub struct TranslationService {
    translator: Option<Box<dyn Translator>>,
    /// File receiving rejected translations
    error_log: Option<PathBuf>,
}

impl TranslationService {
    /// Create a service; `None` means memory-only resolution
    pub fn new(translator: Option<Box<dyn Translator>>) -> Self {
        Self {
            translator,
            error_log: None,
        }
    }

    /// Probe the configured backends in order and keep the first ready one
    pub async fn connect(config: &TranslationConfig) -> Self {
        if config.offline {
            warn!("Offline mode, missing sentences won't be translated");
            return Self::new(None);
        }
        let candidates = config.available_providers.iter().map(build_translator).collect();
        let timeout = Duration::from_secs(config.probe_timeout_secs);
        Self::new(providers::select_ready(candidates, timeout).await)
    }

    /// Also append rejected translations to `path`
    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = Some(path.into());
        self
    }

    pub fn is_online(&self) -> bool {
        self.translator.is_some()
    }

    pub fn translator_name(&self) -> Option<&str> {
        self.translator.as_deref().map(|t| t.name())
    }

    /// Resolve one line from memory, translating it when needed.
    ///
    /// The line is registered in the memory under `script` either way.
    /// Only translations that pass the quality gate are stored.
    pub async fn resolve_or_translate(
        &self,
        memory: &mut TranslationMemory,
        japanese: &str,
        script: &str,
        safe_export: bool,
        stats: &mut TranslationStats,
    ) -> LineOutcome {
        let outcome = self.process_line(memory, japanese, script, safe_export, stats).await;
        stats.record(&outcome);
        outcome
    }

    async fn process_line(
        &self,
        memory: &mut TranslationMemory,
        japanese: &str,
        script: &str,
        safe_export: bool,
        stats: &mut TranslationStats,
    ) -> LineOutcome {
        let japanese = japanese.trim();
        let Ok(record) = memory.get_or_create(japanese) else {
            return LineOutcome::Skipped;
        };
        record.add_script_file(script);

        if let Some(kind) = record.resolve(safe_export).kind {
            return LineOutcome::Resolved(kind);
        }

        let Some(translator) = self.translator.as_deref() else {
            return LineOutcome::Untranslatable;
        };

        let prepared = postprocess::prepare(japanese);
        let started = Instant::now();
        let result = translator.translate(&prepared.text).await;
        stats.api_duration += started.elapsed();

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                error!("{} failed on '{}': {}", translator.name(), japanese, e);
                return LineOutcome::Failed(e.to_string());
            }
        };

        let attempt = postprocess::finish(&prepared, &raw);
        if !attempt.is_usable() {
            self.report_rejection(script, japanese, &attempt);
            return LineOutcome::Rejected(attempt);
        }

        debug!("{} -> {}", japanese, attempt.text);
        if let Ok(record) = memory.get_or_create(japanese) {
            record.merge_translation(TranslationKind::Machine, &attempt.text);
        }
        LineOutcome::Translated(attempt.text)
    }

    fn report_rejection(&self, script: &str, japanese: &str, attempt: &TranslationAttempt) {
        let reason = if attempt.has_error() {
            "backend error"
        } else if attempt.has_repeat() {
            "repetition"
        } else {
            "empty translation"
        };
        let entry = format!("{}: {} [{}] => {}", script, japanese, reason, attempt.text);
        warn!("Rejected translation ({}) in {}: {}", reason, script, japanese);

        if let Some(path) = &self.error_log {
            if let Err(e) = FileManager::append_to_log_file(path, &entry) {
                warn!("Could not write to {:?}: {}", path, e);
            }
        }
    }
}

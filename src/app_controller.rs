use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::export::{ExportReport, Exporter};
use crate::ingest;
use crate::memory::{ClearOutcome, MemoryStats, TranslationMemory};
use crate::sources::ScriptSource;
use crate::translation::{LineOutcome, TranslationService, TranslationStats};

// @module: Application controller for script processing

/// Saves the memory when its interval has elapsed since the last save
#[derive(Debug)]
pub struct AutosaveTimer {
    interval: Duration,
    last_save: Instant,
}

impl AutosaveTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_save: Instant::now(),
        }
    }

    pub fn is_due(&self) -> bool {
        self.last_save.elapsed() >= self.interval
    }

    /// Save `memory` if the interval has elapsed.
    ///
    /// The timer restarts on every attempt, so a failing save is retried
    /// one interval later rather than on every call.
    pub fn tick(&mut self, memory: &TranslationMemory) -> Result<bool> {
        if !self.is_due() {
            return Ok(false);
        }
        info!("Autosave...");
        self.last_save = Instant::now();
        memory.save()?;
        Ok(true)
    }
}

/// Everything a full run did
#[derive(Debug)]
pub struct RunReport {
    pub stats: TranslationStats,
    pub export: ExportReport,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the translation memory and log what it holds
    pub fn load_memory(&self) -> Result<TranslationMemory> {
        let path = &self.config.paths.database_file;
        info!("Loading translation data from {:?}", path);
        let memory = TranslationMemory::load(path).context("Translation data cannot be read")?;
        log_memory_stats(&memory.stats());
        Ok(memory)
    }

    /// Full workflow: ingest side sources, translate, export, save
    pub async fn run(&self) -> Result<RunReport> {
        let service = TranslationService::connect(&self.config.translation).await;
        self.run_with_service(service).await
    }

    /// Full workflow with an already selected translation service
    pub async fn run_with_service(&self, service: TranslationService) -> Result<RunReport> {
        let mut memory = self.load_memory()?;

        ingest::ingest_startup(&mut memory, &self.config.paths).context("Startup ingestion failed")?;

        let service = service.with_error_log(&self.config.paths.error_file);
        match service.translator_name() {
            Some(name) => info!("🚀 Translating with {}", name),
            None => warn!("No translator available, only known translations will be used"),
        }

        let stats = self.process_scripts(&mut memory, &service).await?;
        memory.save()?;
        info!("{}", stats.summary());

        let export = self.export(&memory).await?;
        Ok(RunReport { stats, export })
    }

    /// Resolve or translate every line of every script from the run's source
    pub async fn process_scripts(
        &self,
        memory: &mut TranslationMemory,
        service: &TranslationService,
    ) -> Result<TranslationStats> {
        let safe_export = self.config.export.safe_export;
        let source = ScriptSource::select(
            &self.config.paths.jp_cache_file,
            &self.config.paths.japanese_script_folder,
        );
        let scripts = source.list_scripts(memory, safe_export);
        info!("{} scripts to process from the {}", scripts.len(), source.label());

        let mut stats = TranslationStats::new();
        let mut autosave = AutosaveTimer::new(Duration::from_secs(self.config.autosave_interval_secs));

        let progress_bar = ProgressBar::new(scripts.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scripts ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for script in &scripts {
            if let Err(e) = autosave.tick(memory) {
                warn!("Autosave failed, continuing without it: {:#}", e);
            }
            progress_bar.set_message(script.clone());

            let lines = source.lines_for(script, memory, safe_export);
            if lines.is_empty() {
                progress_bar.inc(1);
                continue;
            }
            stats.scripts += 1;

            for line in &lines {
                let outcome = service
                    .resolve_or_translate(memory, line, script, safe_export, &mut stats)
                    .await;
                if let LineOutcome::Translated(text) = &outcome {
                    progress_bar.println(format!("{} => {}", line, text));
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        Ok(stats)
    }

    /// Export the memory in the configured format
    pub async fn export(&self, memory: &TranslationMemory) -> Result<ExportReport> {
        let exporter = Exporter::new(
            &self.config.paths.export_folder,
            self.config.export.format,
            self.config.paths.subtitle_folder(),
        )
        .safe_export(self.config.export.safe_export);

        exporter
            .export(memory)
            .await
            .with_context(|| format!("Export to {:?} failed", self.config.paths.export_folder))
    }

    /// Export without translating anything
    pub async fn export_only(&self) -> Result<ExportReport> {
        let memory = self.load_memory()?;
        self.export(&memory).await
    }

    /// Per-kind counts of the stored translation data
    pub fn stats(&self) -> Result<MemoryStats> {
        Ok(self.load_memory()?.stats())
    }

    /// Clear every machine translation once `confirm` agrees
    pub fn clear_machine_translations<C>(&self, confirm: C) -> Result<ClearOutcome>
    where
        C: FnOnce() -> bool,
    {
        let mut memory = self.load_memory()?;
        let outcome = memory
            .clear_machine_translations(&self.config.paths.cache_folder, confirm)
            .context("Clearing machine translations failed")?;
        Ok(outcome)
    }
}

fn log_memory_stats(stats: &MemoryStats) {
    info!("Total number of Japanese lines: {}", stats.lines);
    info!("Official translations: {}", stats.official);
    info!("Manual translations: {}", stats.manual);
    info!("Machine translations: {}", stats.machine);
}

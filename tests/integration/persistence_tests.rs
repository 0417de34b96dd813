/*!
 * Durable translation data: startup ingestion, stats and maintenance
 */

use anyhow::Result;
use std::fs;

use scripttm::app_controller::Controller;
use scripttm::export::ExportFormat;
use scripttm::ingest;
use scripttm::memory::{ClearOutcome, TranslationKind, TranslationMemory};

use crate::common;

fn seeded_controller(root: &std::path::Path) -> Result<Controller> {
    let config = common::test_config(root, ExportFormat::Txt);
    let mut memory = TranslationMemory::new(&config.paths.database_file);
    memory.ingest("はい", "Yes", Some(TranslationKind::Machine), "a1_001", "");
    memory.ingest("いいえ", "No", Some(TranslationKind::Machine), "a1_001", "");
    memory.ingest("いいえ", "No way", Some(TranslationKind::Manual), "", "");
    memory.ingest("決定", "OK", Some(TranslationKind::Official), "", "");
    memory.save()?;
    Controller::with_config(config)
}

/// Test that declining the confirmation leaves everything in place
#[test]
fn test_clearMachine_withoutConfirmation_shouldChangeNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = seeded_controller(temp_dir.path())?;

    let outcome = controller.clear_machine_translations(|| false)?;

    assert_eq!(outcome, ClearOutcome::Aborted);
    assert_eq!(controller.stats()?.machine, 2);
    let backups = fs::read_dir(&controller.config().paths.cache_folder)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with("_TranslationData_Backup.json"))
        .count();
    assert_eq!(backups, 0);
    Ok(())
}

/// Test that a confirmed clear backs up first and keeps other fields
#[test]
fn test_clearMachine_withConfirmation_shouldBackupAndClear() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = seeded_controller(temp_dir.path())?;
    let before = fs::read_to_string(&controller.config().paths.database_file)?;

    let ClearOutcome::Cleared { backup, cleared } = controller.clear_machine_translations(|| true)? else {
        panic!("clearing was not confirmed");
    };

    assert_eq!(cleared, 2);
    let backup_name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(backup_name.starts_with('('));
    assert!(backup_name.ends_with(")_TranslationData_Backup.json"));
    assert_eq!(fs::read_to_string(&backup)?, before);

    let stats = controller.stats()?;
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.machine, 0);
    assert_eq!(stats.manual, 1);
    assert_eq!(stats.official, 1);
    Ok(())
}

/// Test folding every side source at startup
#[test]
fn test_ingestStartup_withSideSources_shouldMergeInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Txt);
    let paths = &config.paths;

    common::write_jp_cache(&config, r#"{"a1_001": ["はい", "決定"]}"#)?;
    common::create_test_file(&paths.cache_folder, "MachineTranslationCache.txt", "はい\tYeah\nno tab here\n")?;
    common::create_test_file(&paths.cache_folder, "ManualTranslationCache.txt", "はい\tYes\n")?;
    common::create_test_file(
        &paths.cache_folder,
        "parts.json",
        r#"{"mTerms": [{"Term": "p1", "Languages": ["胸", "Chest"]}, {"Term": "p2", "Languages": ["腰", null]}]}"#,
    )?;
    common::create_test_file(
        &paths.japanese_ui_folder,
        "ENG/menu.csv",
        "Key,Type,Desc,Japanese,English\nok,Text,,決定,OK\nshort,Text\n",
    )?;
    common::create_test_file(
        &paths.japanese_ui_folder,
        "JPN/menu.csv",
        "Key,Type,Desc,Japanese,English\nback,Text,,戻る,back\n",
    )?;

    let mut memory = TranslationMemory::new(&paths.database_file);
    let reports = ingest::ingest_startup(&mut memory, paths)?;

    let sources: Vec<&str> = reports.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, vec!["JpCache.json", "legacy caches", "I2 term documents", "CSV term tables"]);
    let csv_report = &reports[3];
    assert_eq!(csv_report.skipped.len(), 1);

    let yes = memory.get("はい").unwrap();
    assert_eq!(yes.machine, "Yeah");
    assert_eq!(yes.resolve(false).text, "Yes");
    assert!(yes.script_files.contains("a1_001"));

    assert_eq!(memory.get("胸").unwrap().official, "Chest");
    assert_eq!(memory.get("腰").unwrap().official, "");
    assert_eq!(memory.get("決定").unwrap().official, "OK");

    // Untranslated entries repeat the key, so nothing is stored for them.
    let back = memory.get("戻る").unwrap();
    assert!(back.official.is_empty());
    assert!(back.csv_files.contains("menu.csv"));

    // Each contributing source was saved.
    let saved = TranslationMemory::load(&paths.database_file)?;
    assert_eq!(saved.len(), memory.len());
    Ok(())
}

/// Test that a run without side sources writes nothing
#[test]
fn test_ingestStartup_withNoSources_shouldReportNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Txt);

    let mut memory = TranslationMemory::new(&config.paths.database_file);
    let reports = ingest::ingest_startup(&mut memory, &config.paths)?;

    assert!(reports.is_empty());
    assert!(memory.is_empty());
    assert!(!config.paths.database_file.exists());
    Ok(())
}

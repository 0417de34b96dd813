/*!
 * Tests for the translation memory store and the resolution policy
 */

use anyhow::Result;
use scripttm::memory::{TranslationKind, TranslationMemory};

/// Keys equal after trimming share one record
#[test]
fn test_ingest_withKeysEqualAfterTrim_shouldKeepOneRecord() {
    let mut memory = TranslationMemory::default();
    memory.ingest("こんにちは", "", None, "a1_001", "");
    memory.ingest("  こんにちは\t", "Hello", Some(TranslationKind::Machine), "b1_001", "");

    assert_eq!(memory.len(), 1);
    let record = memory.get("こんにちは").unwrap();
    assert_eq!(record.machine, "Hello");
    assert_eq!(record.script_files.len(), 2);
}

/// An empty translation never clears an existing field
#[test]
fn test_ingest_withEmptyTranslation_shouldNotClearField() {
    let mut memory = TranslationMemory::default();
    memory.ingest("はい", "Yes", Some(TranslationKind::Official), "", "");
    memory.ingest("はい", "", Some(TranslationKind::Official), "", "");

    assert_eq!(memory.get("はい").unwrap().official, "Yes");
}

/// Provenance sets never hold duplicates
#[test]
fn test_ingest_withRepeatedProvenance_shouldNotDuplicate() {
    let mut memory = TranslationMemory::default();
    for _ in 0..3 {
        memory.ingest("はい", "", None, "a1_001", "menu.csv");
    }

    let record = memory.get("はい").unwrap();
    assert_eq!(record.script_files.len(), 1);
    assert_eq!(record.csv_files.len(), 1);
}

/// Manual wins when every field is set
#[test]
fn test_resolve_withAllFields_shouldPickManual() {
    let mut memory = TranslationMemory::default();
    memory.ingest("はい", "Official", Some(TranslationKind::Official), "", "");
    memory.ingest("はい", "Machine", Some(TranslationKind::Machine), "", "");
    memory.ingest("はい", "Manual", Some(TranslationKind::Manual), "", "");

    let record = memory.get("はい").unwrap();
    assert_eq!(record.resolve(false).text, "Manual");
    assert_eq!(record.resolve(true).text, "Manual");
}

/// Safe export never returns the official text
#[test]
fn test_resolve_withSafeExportAndNoManual_shouldPickMachine() {
    let mut memory = TranslationMemory::default();
    memory.ingest("はい", "Official", Some(TranslationKind::Official), "", "");
    memory.ingest("はい", "Machine", Some(TranslationKind::Machine), "", "");

    let resolution = memory.get("はい").unwrap().resolve(true);
    assert_eq!(resolution.text, "Machine");
    assert_eq!(resolution.kind, Some(TranslationKind::Machine));
}

/// Saved memories load back with the same records, csv provenance excluded
#[test]
fn test_saveAndLoad_shouldKeepRecords() -> Result<()> {
    let temp_dir = crate::common::create_temp_dir()?;
    let path = temp_dir.path().join("Caches").join("TranslationData.json");

    let mut memory = TranslationMemory::new(&path);
    memory.ingest("はい", "Yes", Some(TranslationKind::Manual), "a1_001", "menu.csv");
    memory.ingest("いいえ", "", None, "a1_001", "");
    memory.save()?;

    let loaded = TranslationMemory::load(&path)?;
    assert_eq!(loaded.len(), 2);
    let record = loaded.get("はい").unwrap();
    assert_eq!(record.manual, "Yes");
    assert!(record.script_files.contains("a1_001"));
    assert!(record.csv_files.is_empty());

    let keys: Vec<&str> = loaded.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["はい", "いいえ"]);
    Ok(())
}

/// Stats count only non-empty fields
#[test]
fn test_stats_shouldCountEachKind() {
    let mut memory = TranslationMemory::default();
    memory.ingest("a", "A", Some(TranslationKind::Official), "", "");
    memory.ingest("b", "B", Some(TranslationKind::Machine), "", "");
    memory.ingest("b", "B!", Some(TranslationKind::Manual), "", "");
    memory.ingest("c", "", None, "", "");

    let stats = memory.stats();
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.official, 1);
    assert_eq!(stats.machine, 1);
    assert_eq!(stats.manual, 1);
}

/*!
 * Tests for export grouping, routing and write retries
 */

use anyhow::Result;
use std::time::Duration;

use scripttm::export::routing::{self, UNCATEGORIZED};
use scripttm::export::{ExportFormat, ExportUnit, Exporter, RetryPolicy, group_by_script, writers};
use scripttm::memory::{TranslationKind, TranslationMemory};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        backoff_base: Duration::from_millis(1),
    }
}

/// Two records of one script form one group routed to Muku
#[test]
fn test_groupByScript_withSharedScript_shouldFormOneGroup() {
    let mut memory = TranslationMemory::default();
    memory.ingest("はい", "Yes", Some(TranslationKind::Manual), "a1_001", "");
    memory.ingest("いいえ", "No", Some(TranslationKind::Machine), "a1_001", "");

    let groups = group_by_script(&memory, false);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups["a1_001"].len(), 2);
    assert_eq!(routing::route("a1_001"), "Muku");
}

/// Records without scripts are not exported
#[test]
fn test_groupByScript_withoutProvenance_shouldSkipRecord() {
    let mut memory = TranslationMemory::default();
    memory.ingest("決定", "OK", Some(TranslationKind::Official), "", "menu.csv");

    assert!(group_by_script(&memory, false).is_empty());
}

/// Longest prefix wins and unknown scripts are uncategorized
#[test]
fn test_route_shouldPreferLongestPrefix() {
    assert_eq!(routing::route("b1_010"), "Majime");
    assert_eq!(routing::route("b_010"), "Kuudere");
    assert_eq!(routing::route("crc_ck_100"), "[Commands & Choices]");
    assert_eq!(routing::route("lifemode_01"), "[Misc]/Lifemode");
    assert_eq!(routing::route("opening"), UNCATEGORIZED);
}

/// Four failures then a success is a success
#[tokio::test]
async fn test_retry_withFourFailures_shouldSucceed() {
    let mut calls = 0;
    let result: Result<(), std::io::Error> = fast_retry()
        .run(|attempt| {
            calls += 1;
            if attempt <= 4 {
                Err(std::io::Error::other("sharing violation"))
            } else {
                Ok(())
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(calls, 5);
}

/// Five failed appends report the script as not written
#[tokio::test]
async fn test_writeTextUnit_withBlockedFile_shouldReportFailure() -> Result<()> {
    let temp_dir = crate::common::create_temp_dir()?;
    let root = temp_dir.path().join("Script");
    writers::prepare_text_root(&root)?;

    // A directory in place of the text file makes every append fail.
    std::fs::create_dir_all(root.join("Muku").join("a1_001.txt"))?;
    let unit = ExportUnit {
        script: "a1_001".to_string(),
        lines: vec!["はい\tYes".to_string()],
    };

    assert!(!writers::write_text_unit(&root, &unit, &fast_retry()).await);
    Ok(())
}

/// A text export rotates the previous folder and writes under categories
#[tokio::test]
async fn test_export_withTxtFormat_shouldRotateAndWrite() -> Result<()> {
    let temp_dir = crate::common::create_temp_dir()?;
    let root = temp_dir.path().join("Script");
    crate::common::create_test_file(&root, "stale.txt", "old")?;
    crate::common::create_test_file(&temp_dir.path().join("Subtitles"), "zz_001.txt", "subtitle")?;

    let mut memory = TranslationMemory::default();
    memory.ingest("はい", "Yes", Some(TranslationKind::Manual), "a1_001", "");
    memory.ingest("いいえ", "No", Some(TranslationKind::Official), "zz_001", "");

    let exporter = Exporter::new(&root, ExportFormat::Txt, temp_dir.path().join("Subtitles"))
        .safe_export(true)
        .with_retry(fast_retry());
    let report = exporter.export(&memory).await?;

    assert_eq!(report.scripts, 2);
    assert!(report.is_complete());
    assert!(report.rotated.as_ref().is_some_and(|p| p.join("stale.txt").exists()));
    assert!(!root.join("stale.txt").exists());

    let muku = std::fs::read_to_string(root.join("Muku").join("a1_001.txt"))?;
    assert_eq!(muku, "はい\tYes\n");
    let other = std::fs::read_to_string(root.join(UNCATEGORIZED).join("zz_001.txt"))?;
    assert_eq!(other, "いいえ\t\nsubtitle\n");
    Ok(())
}

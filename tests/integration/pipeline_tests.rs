/*!
 * End-to-end runs from the script sources to the export files
 */

use anyhow::Result;
use std::fs;

use scripttm::app_controller::Controller;
use scripttm::export::ExportFormat;
use scripttm::export::routing::UNCATEGORIZED;
use scripttm::memory::{TranslationKind, TranslationMemory};
use scripttm::providers::mock::{MockProvider, MockRequest};
use scripttm::translation::TranslationService;

use crate::common;

/// Scripted backend: tagged lines get a placeholder back, one line loops
fn scripted_reply(request: &MockRequest) -> String {
    if request.text.contains("壊れた") {
        "a".repeat(20)
    } else if request.text.contains("MUKU") {
        "Hello MUKU".to_string()
    } else {
        "Fine".to_string()
    }
}

fn mock_service() -> TranslationService {
    TranslationService::new(Some(Box::new(
        MockProvider::working().with_custom_response(scripted_reply),
    )))
}

/// Test a full run over the script cache with a text export
#[tokio::test]
async fn test_run_withJpCache_shouldTranslateStoreAndExport() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Txt);

    common::write_jp_cache(
        &config,
        r#"{"a1_001": ["はい", "[HF]こんにちは", "壊れた", "はい", " "], "zz_001": ["はい"]}"#,
    )?;
    common::create_test_file(&config.paths.cache_folder, "OfficialTranslationCache.txt", "はい\tYes\n")?;

    let controller = Controller::with_config(config.clone())?;
    let report = controller.run_with_service(mock_service()).await?;

    assert_eq!(report.stats.scripts, 2);
    assert_eq!(report.stats.lines, 4);
    assert_eq!(report.stats.resolved, 2);
    assert_eq!(report.stats.translated, 1);
    assert_eq!(report.stats.rejected, 1);
    assert!(report.export.is_complete());

    let muku = fs::read_to_string(config.paths.export_folder.join("Muku").join("a1_001.txt"))?;
    assert_eq!(muku, "はい\tYes\n[HF]こんにちは\tHello [HF]\n壊れた\t\n");
    let other = fs::read_to_string(config.paths.export_folder.join(UNCATEGORIZED).join("zz_001.txt"))?;
    assert_eq!(other, "はい\tYes\n");

    let saved = TranslationMemory::load(&config.paths.database_file)?;
    assert_eq!(saved.get("[HF]こんにちは").unwrap().machine, "Hello [HF]");
    assert_eq!(saved.get("壊れた").unwrap().machine, "");
    assert!(saved.get("はい").unwrap().script_files.contains("zz_001"));

    let errors = fs::read_to_string(&config.paths.error_file)?;
    assert!(errors.contains("a1_001: 壊れた [repetition]"));
    Ok(())
}

/// Test that loose script files are used when there is no cache
#[tokio::test]
async fn test_run_withLooseScripts_shouldUseFileNames() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Bson);
    common::create_test_file(
        &config.paths.japanese_script_folder,
        "b1_002.TXT",
        "\u{feff}おはよう\tcolumn\nまたね\n",
    )?;

    let controller = Controller::with_config(config.clone())?;
    let report = controller.run_with_service(mock_service()).await?;

    assert_eq!(report.stats.translated, 2);
    let saved = TranslationMemory::load(&config.paths.database_file)?;
    assert_eq!(saved.get("おはよう").unwrap().machine, "Fine");
    assert!(saved.get("またね").unwrap().script_files.contains("b1_002"));
    assert!(config.paths.export_folder.join("script.bson").is_file());
    Ok(())
}

/// Test an offline run: nothing is translated, known lines still export
#[tokio::test]
async fn test_run_offline_shouldOnlyResolve() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Txt);
    common::write_jp_cache(&config, r#"{"a1_001": ["はい", "いいえ"]}"#)?;
    common::create_test_file(&config.paths.cache_folder, "ManualTranslationCache.txt", "はい\tSure\n")?;

    let controller = Controller::with_config(config.clone())?;
    let report = controller.run_with_service(TranslationService::new(None)).await?;

    assert_eq!(report.stats.resolved, 1);
    assert_eq!(report.stats.untranslatable, 1);
    let muku = fs::read_to_string(config.paths.export_folder.join("Muku").join("a1_001.txt"))?;
    assert_eq!(muku, "はい\tSure\nいいえ\t\n");
    Ok(())
}

/// Test that safe export machine-translates lines that only have an official text
#[tokio::test]
async fn test_run_withSafeExport_shouldWithholdOfficial() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path(), ExportFormat::Txt);
    config.export.safe_export = true;
    common::write_jp_cache(&config, r#"{"a1_001": ["はい"]}"#)?;
    common::create_test_file(&config.paths.cache_folder, "OfficialTranslationCache.txt", "はい\tYes\n")?;

    let controller = Controller::with_config(config.clone())?;
    let report = controller.run_with_service(mock_service()).await?;

    assert_eq!(report.stats.translated, 1);
    let muku = fs::read_to_string(config.paths.export_folder.join("Muku").join("a1_001.txt"))?;
    assert_eq!(muku, "はい\tFine\n");

    let saved = TranslationMemory::load(&config.paths.database_file)?;
    let record = saved.get("はい").unwrap();
    assert_eq!(record.official, "Yes");
    assert_eq!(record.machine, "Fine");
    Ok(())
}

/// Test exporting a stored memory into the compressed container
#[tokio::test]
async fn test_exportOnly_withZst_shouldWriteContainer() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Zst);

    let mut memory = TranslationMemory::new(&config.paths.database_file);
    memory.ingest("はい", "Yes", Some(TranslationKind::Official), "a1_001", "");
    memory.ingest("決定", "OK", Some(TranslationKind::Official), "", "menu.csv");
    memory.save()?;

    let controller = Controller::with_config(config.clone())?;
    let report = controller.export_only().await?;

    assert_eq!(report.scripts, 1);
    let path = config.paths.export_folder.join("script.zst");
    assert_eq!(report.written, vec![path.clone()]);

    let packed = zstd::stream::decode_all(fs::File::open(&path)?)?;
    let scripts: indexmap::IndexMap<String, serde_bytes::ByteBuf> = rmp_serde::from_slice(&packed)?;
    assert_eq!(scripts["a1_001"].as_ref(), "はい\tYes".as_bytes());
    Ok(())
}

/// Test exporting a stored memory into a BSON document
#[tokio::test]
async fn test_exportOnly_withBson_shouldWriteDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Bson);
    common::create_test_file(&config.paths.subtitle_folder(), "a1_001.txt", "subtitle line\n")?;

    let mut memory = TranslationMemory::new(&config.paths.database_file);
    memory.ingest("はい", "Yes", Some(TranslationKind::Machine), "a1_001", "");
    memory.save()?;

    let controller = Controller::with_config(config.clone())?;
    controller.export_only().await?;

    let document = bson::Document::from_reader(fs::File::open(config.paths.export_folder.join("script.bson"))?)?;
    let bytes = document.get_binary_generic("a1_001")?;
    assert_eq!(String::from_utf8(bytes.clone())?, "はい\tYes\nsubtitle line");
    Ok(())
}

/// Test that a failing autosave does not stop processing or the export
#[tokio::test]
async fn test_processScripts_withFailingAutosave_shouldKeepGoing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path(), ExportFormat::Txt);
    config.autosave_interval_secs = 1;
    common::write_jp_cache(&config, r#"{"a1_001": ["一つ目"], "a1_002": ["二つ目"]}"#)?;

    let blocked = temp_dir.path().join("blocked");
    fs::create_dir_all(&blocked)?;
    let mut memory = TranslationMemory::new(&blocked);

    // Each line takes longer than the autosave interval.
    let service = TranslationService::new(Some(Box::new(MockProvider::slow(1_100))));
    let controller = Controller::with_config(config.clone())?;
    let stats = controller.process_scripts(&mut memory, &service).await?;

    assert_eq!(stats.translated, 2);
    assert!(memory.get("一つ目").is_some_and(|r| !r.machine.is_empty()));

    controller.export(&memory).await?;
    assert!(config.paths.export_folder.join("Muku").join("a1_002.txt").is_file());
    Ok(())
}

/// Test that a line shared by two scripts is translated once when the
/// memory itself is the script source
#[tokio::test]
async fn test_run_fromMemory_shouldSkipLinesResolvedEarlierInRun() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), ExportFormat::Txt);

    let mut memory = TranslationMemory::new(&config.paths.database_file);
    memory.ingest("共有", "", None, "a1_001", "");
    memory.ingest("共有", "", None, "a1_002", "");
    memory.ingest("固有", "", None, "a1_002", "");
    memory.ingest("既知", "Known", Some(TranslationKind::Manual), "a1_003", "");
    memory.save()?;

    let provider = MockProvider::working();
    let service = TranslationService::new(Some(Box::new(provider.clone())));
    let controller = Controller::with_config(config.clone())?;
    let report = controller.run_with_service(service).await?;

    assert_eq!(provider.request_count(), 2);
    assert_eq!(report.stats.scripts, 2);
    assert_eq!(report.stats.lines, 2);
    assert_eq!(report.stats.translated, 2);

    let second = fs::read_to_string(config.paths.export_folder.join("Muku").join("a1_002.txt"))?;
    assert_eq!(second, "共有\t[TRANSLATED] 共有\n固有\t[TRANSLATED] 固有\n");
    Ok(())
}

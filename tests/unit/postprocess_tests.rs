/*!
 * Tests for tag handling and corruption detection
 */

use scripttm::translation::postprocess::{self, Verdict, classify, finish, prepare};

/// Tags come back in order in place of the placeholders
#[test]
fn test_finish_withTwoTags_shouldRestoreInOrder() {
    let prepared = prepare("[HF]こんにちは[HF2]");
    assert_eq!(prepared.tags, vec!["[HF]", "[HF2]"]);

    let attempt = finish(&prepared, "Hello MUKU, MUKU");
    assert_eq!(attempt.text, "Hello [HF], [HF2]");
    assert!(attempt.has_tag());
    assert!(attempt.is_usable());
}

/// A leading article before a restored tag is dropped
#[test]
fn test_finish_withArticleBeforeTag_shouldStripArticle() {
    let prepared = prepare("[HF]が来た");
    assert_eq!(finish(&prepared, "The MUKU came").text, "[HF] came");

    let prepared = prepare("[HF]を見た");
    assert_eq!(finish(&prepared, "I saw the muku").text, "I saw [HF]");
}

/// Unknown tokens are removed
#[test]
fn test_finish_withUnknownToken_shouldStripIt() {
    let prepared = prepare("えっと");
    assert_eq!(finish(&prepared, "Um<unk>...").text, "Um...");
}

/// Eighteen identical characters are a repeat
#[test]
fn test_classify_withLongCharRun_shouldFlagRepeat() {
    assert_eq!(classify(&"a".repeat(18)), Verdict::Repeat);
    assert_eq!(classify(&format!("Ah{}!", "h".repeat(16))), Verdict::Repeat);
}

/// Seven hyphen-joined repeats are a repeat
#[test]
fn test_classify_withWordChain_shouldFlagRepeat() {
    assert_eq!(classify("go-go-go-go-go-go-go"), Verdict::Repeat);
    assert_eq!(classify("go-go-go-go-go-go"), Verdict::Repeat);
}

/// Ordinary text is clean
#[test]
fn test_classify_withNormalText_shouldBeClean() {
    assert_eq!(classify("hello world"), Verdict::Clean);
    assert_eq!(classify("well-well, a hyphen-joined phrase"), Verdict::Clean);
}

/// Leaked transport errors are flagged
#[test]
fn test_finish_withBadRequest_shouldBeUnusable() {
    let prepared = prepare("テスト");
    let attempt = finish(&prepared, "400 Bad Request");
    assert!(attempt.has_error());
    assert!(!attempt.is_usable());
}

/// Blank results never pass the gate
#[test]
fn test_finish_withBlankResult_shouldBeUnusable() {
    let prepared = prepare("テスト");
    assert!(!finish(&prepared, "<unk>").is_usable());
    assert!(!finish(&prepared, "   ").is_usable());
}

/// Lines without tags go through untouched apart from the stripped symbol
#[test]
fn test_prepare_withoutTags_shouldKeepText() {
    let prepared = prepare("ご主人様♀");
    assert_eq!(prepared.text, "ご主人様");
    assert!(prepared.tags.is_empty());
    assert_eq!(postprocess::restore_tags("Master MUKU", &prepared.tags), "Master MUKU");
}

/*!
 * Clean-up applied to freshly produced machine translations.
 *
 * Bracketed name tags such as `[HF]` are swapped for a placeholder word
 * before the text reaches the translator and put back afterwards. The
 * result is then scrubbed of `<unk>` markers and checked for the usual
 * failure artifacts (runaway repetition, leaked HTTP errors).
 */

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Word substituted for every bracketed tag before translation
pub const TAG_PLACEHOLDER: &str = "MUKU";

/// Symbol the translator chokes on
const STRIPPED_SYMBOL: char = '♀';

const UNKNOWN_TOKEN: &str = "<unk>";
const BAD_REQUEST_MARKER: &str = "400 Bad Request";

/// Minimum run of one identical word character flagged as repetition
pub const CHAR_REPEAT_THRESHOLD: usize = 16;
/// Minimum number of identical hyphen-joined words flagged as repetition
pub const WORD_REPEAT_THRESHOLD: usize = 6;

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.*?\]").expect("tag pattern is valid"));
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{}\b", TAG_PLACEHOLDER)).expect("placeholder pattern is valid")
});

/// Japanese text ready to be sent to a translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedText {
    /// Text with tags replaced by the placeholder
    pub text: String,
    /// Extracted tags in encounter order
    pub tags: Vec<String>,
}

impl PreparedText {
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Quality verdict for a machine translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    /// Runaway character or word repetition
    Repeat,
    /// A transport error leaked into the text
    Error,
}

/// Outcome of one translation attempt after post-processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationAttempt {
    pub text: String,
    pub tags: Vec<String>,
    pub verdict: Verdict,
}

impl TranslationAttempt {
    pub fn has_tag(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn has_repeat(&self) -> bool {
        self.verdict == Verdict::Repeat
    }

    pub fn has_error(&self) -> bool {
        self.verdict == Verdict::Error
    }

    /// Whether the quality gate lets this translation through
    pub fn is_usable(&self) -> bool {
        self.verdict == Verdict::Clean && !self.text.trim().is_empty()
    }
}

/// Extract bracketed tags and strip characters the translator cannot handle.
///
/// Double quotes are left untouched; JSON request encoding escapes them.
pub fn prepare(japanese: &str) -> PreparedText {
    let tags: Vec<String> = TAG_REGEX
        .find_iter(japanese)
        .map(|m| m.as_str().to_string())
        .collect();

    let text = if tags.is_empty() {
        japanese.to_string()
    } else {
        TAG_REGEX.replace_all(japanese, TAG_PLACEHOLDER).into_owned()
    };

    PreparedText {
        text: text.replace(STRIPPED_SYMBOL, ""),
        tags,
    }
}

/// Put extracted tags back into a translation.
///
/// Each tag replaces the next remaining placeholder; surplus placeholders
/// stay as they are. An article directly before a restored tag is dropped.
pub fn restore_tags(translated: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return translated.to_string();
    }

    let mut text = translated.to_string();
    for tag in tags {
        text = PLACEHOLDER_REGEX.replacen(&text, 1, NoExpand(tag)).into_owned();
    }

    text.replace("the [", "[").replace("The [", "[")
}

/// Flag repetition and leaked errors without touching the text
pub fn classify(text: &str) -> Verdict {
    if text.contains(BAD_REQUEST_MARKER) {
        Verdict::Error
    } else if has_char_run(text, CHAR_REPEAT_THRESHOLD) || has_word_run(text, WORD_REPEAT_THRESHOLD) {
        Verdict::Repeat
    } else {
        Verdict::Clean
    }
}

/// Run the full post-translation pipeline on raw translator output
pub fn finish(prepared: &PreparedText, raw: &str) -> TranslationAttempt {
    let text = restore_tags(raw, &prepared.tags).replace(UNKNOWN_TOKEN, "");
    let verdict = classify(&text);
    TranslationAttempt {
        text,
        tags: prepared.tags.clone(),
        verdict,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn has_char_run(text: &str, threshold: usize) -> bool {
    let mut previous = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == previous && is_word_char(c) {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run >= threshold && is_word_char(c) {
            return true;
        }
    }
    false
}

fn has_word_run(text: &str, threshold: usize) -> bool {
    // A word followed by `-word` repeats, matched anywhere: "ago-go-go..."
    // and "...-go-gone" both count. `threshold` counts the first word too.
    let chars: Vec<char> = text.chars().collect();
    let same = |a: char, b: char| a == b || a.to_lowercase().eq(b.to_lowercase());

    for (hyphen, _) in chars.iter().enumerate().filter(|(_, c)| **c == '-') {
        let mut run_start = hyphen;
        while run_start > 0 && is_word_char(chars[run_start - 1]) {
            run_start -= 1;
        }

        for word_start in run_start..hyphen {
            let word = &chars[word_start..hyphen];
            let mut pos = hyphen;
            let mut repeats = 0;
            while pos + word.len() < chars.len()
                && chars[pos] == '-'
                && word.iter().zip(&chars[pos + 1..]).all(|(a, b)| same(*a, *b))
            {
                repeats += 1;
                pos += word.len() + 1;
            }
            if repeats + 1 >= threshold {
                return true;
            }
        }
    }
    false
}

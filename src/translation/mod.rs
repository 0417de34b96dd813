/*!
 * Machine translation of script lines.
 *
 * - `core`: resolve-or-translate service and per-run counters
 * - `postprocess`: tag handling and the quality gate for fresh translations
 */

pub use self::core::{LineOutcome, TranslationService, TranslationStats};
pub use self::postprocess::{PreparedText, TranslationAttempt, Verdict};

pub mod core;
pub mod postprocess;

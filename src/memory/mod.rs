/*!
 * Translation memory: line records and the store that owns them.
 *
 * - `record`: the per-sentence entity and the resolution policy
 * - `store`: keyed collection, merge rules and persistence
 */

pub use self::record::{LineRecord, Resolution, TranslationKind};
pub use self::store::{ClearOutcome, MemoryStats, TranslationMemory};

pub mod record;
pub mod store;

//! Durable key-value persistence
//!
//! All cross-restart state (previous metric values, threshold rules, the
//! mute flag) lives behind the [`KeyValueStore`] capability trait. The
//! trait is deliberately narrow and infallible from the caller's point of
//! view: a broken or missing backing store degrades the wallboard to
//! default/empty state instead of taking it down.
//!
//! ## Backends
//!
//! - [`FileStore`]: one file per key under a store directory (durable)
//! - [`MemoryStore`]: in-process map, used in tests and as the
//!   no-persistence fallback
//!
//! ## Stores
//!
//! - [`ThresholdRuleStore`]: the `thresholds_cfg` rule mapping
//! - [`PreviousValueStore`]: the `prev_metrics` snapshot

pub mod file;
pub mod kv;
pub mod memory;
pub mod prev;
pub mod rules;

pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use prev::PreviousValueStore;
pub use rules::ThresholdRuleStore;

/// Storage key for the previous-value snapshot (JSON object id → number).
pub const PREV_METRICS_KEY: &str = "prev_metrics";

/// Storage key for the threshold rule mapping (JSON object id → rule).
pub const THRESHOLDS_KEY: &str = "thresholds_cfg";

/// Storage key for the global mute flag ("true"/"false").
pub const MUTED_KEY: &str = "sound_muted";

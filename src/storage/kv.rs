//! The key-value storage capability trait

/// Synchronous string-keyed storage surviving restarts.
///
/// Both operations must never panic or surface an error to the caller:
/// any underlying I/O failure is handled inside the implementation,
/// reading as `None` and dropping the write. Callers own serialization;
/// values are opaque strings.
///
/// Implementations must be `Send + Sync`; the stores built on top are
/// handed between tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, or `None` if missing or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`. Failures are swallowed; the in-memory
    /// state of the caller stays correct, it just is not durable until a
    /// later write succeeds.
    fn set(&self, key: &str, value: &str);
}

use serde::{Deserialize, Serialize};
use shared::TtlMs;

/// Identifies a cached value: `segment` partitions the key space, `id` is unique within it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub segment: String,
    pub id: String,
}

impl CacheKey {
    pub fn new(segment: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            id: id.into(),
        }
    }

    /// Keys without a segment are never stored or looked up.
    pub fn has_segment(&self) -> bool {
        !self.segment.is_empty()
    }
}

/// A value read back from the table together with its bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord<V> {
    pub item: V,
    /// Write time in milliseconds since the UNIX epoch.
    pub stored: u64,
    pub ttl: TtlMs,
}

impl<V> CacheRecord<V> {
    pub fn new(item: V, stored: u64, ttl: TtlMs) -> Self {
        Self { item, stored, ttl }
    }
}

/// Lifecycle of a connection. The service handle only exists while started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Stopped,
    Started,
}

use dynamo_cache::{CacheConnection, CacheKey, CacheRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Result, TtlMs};
use std::sync::Arc;
use tracing::debug;

/// Caller-side cache policy over one segment.
///
/// The connection hands back records as stored; this layer decides when a record has
/// expired (`stored + ttl` at or before now) and treats it as a miss.
#[derive(Debug, Clone)]
pub struct Policy {
    connection: Arc<CacheConnection>,
    segment: String,
    expires_in: TtlMs,
}

impl Policy {
    pub fn new(
        connection: Arc<CacheConnection>,
        segment: impl Into<String>,
        expires_in: TtlMs,
    ) -> Result<Self> {
        let segment = segment.into();
        connection.validate_segment_name(segment.as_str())?;

        Ok(Self {
            connection,
            segment,
            expires_in,
        })
    }

    pub async fn set<V>(&self, id: &str, value: &V) -> Result<()>
    where
        V: Serialize + ?Sized,
    {
        self.connection
            .set(&self.key(id), value, self.expires_in)
            .await
    }

    pub async fn get<V>(&self, id: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned,
    {
        let record = self.connection.get::<V>(&self.key(id)).await?;

        Ok(record.and_then(|record| {
            if is_expired(&record, now_millis()) {
                debug!(segment = %self.segment, id, "record expired");
                None
            } else {
                Some(record.item)
            }
        }))
    }

    pub async fn drop(&self, id: &str) -> Result<()> {
        CacheConnection::drop(&self.connection, &self.key(id)).await
    }

    fn key(&self, id: &str) -> CacheKey {
        CacheKey::new(self.segment.clone(), id)
    }
}

pub fn is_expired<V>(record: &CacheRecord<V>, now_ms: u64) -> bool {
    record.stored.saturating_add(record.ttl.0) <= now_ms
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

use crate::codec::{self, RECORD_ATTRIBUTES};
use crate::domain::{CacheKey, CacheRecord, Lifecycle};
use crate::ports::{ItemService, ServiceFactory};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::{Settings, SettingsOverrides};
use shared::{Error, Result, SegmentNameError, TtlMs};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

enum ConnectionState {
    Stopped,
    Started(Arc<dyn ItemService>),
}

/// Cache client backed by a single DynamoDB table.
///
/// Values live under a composite primary key (`segment` as the partition key,
/// `id` as the sort key). The connection only stores and returns records; deciding
/// whether `stored + ttl` has passed is left to the caller.
///
/// `start` must be awaited before any data operation. Data operations may run
/// concurrently from any number of tasks.
pub struct CacheConnection {
    settings: Settings,
    factory: Arc<dyn ServiceFactory>,
    state: RwLock<ConnectionState>,
    // Serializes handle creation so racing `start` calls build a single service.
    start_gate: Mutex<()>,
}

impl CacheConnection {
    /// Create a stopped connection, merging `overrides` onto the default settings.
    pub fn new(overrides: SettingsOverrides, factory: Arc<dyn ServiceFactory>) -> Result<Self> {
        let settings = Settings::default().merge(overrides);
        check_key_attributes(&settings)?;

        Ok(Self {
            settings,
            factory,
            state: RwLock::new(ConnectionState::Stopped),
            start_gate: Mutex::new(()),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create the service handle if there is none yet. Safe to call repeatedly and concurrently.
    pub async fn start(&self) {
        let _gate = self.start_gate.lock().await;

        if self.is_ready() {
            debug!(table = %self.settings.table_name, "connection already started");
            return;
        }

        let service = self.factory.create_service(&self.settings).await;
        *self.state.write() = ConnectionState::Started(service);

        info!(
            table = %self.settings.table_name,
            region = %self.settings.region,
            "cache connection started"
        );
    }

    /// Discard the service handle. Stopping a stopped connection does nothing.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.state.write(), ConnectionState::Stopped);

        if let ConnectionState::Started(_) = previous {
            info!(table = %self.settings.table_name, "cache connection stopped");
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), ConnectionState::Started(_))
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match *self.state.read() {
            ConnectionState::Stopped => Lifecycle::Stopped,
            ConnectionState::Started(_) => Lifecycle::Started,
        }
    }

    /// Check a segment name before it is used to build keys.
    ///
    /// The data operations do not call this themselves.
    pub fn validate_segment_name<'a>(&self, name: impl Into<Option<&'a str>>) -> Result<()> {
        match name.into() {
            None | Some("") => Err(SegmentNameError::Empty.into()),
            Some(name) if name.contains('\0') => Err(SegmentNameError::NullCharacter.into()),
            Some(_) => Ok(()),
        }
    }

    /// Read the record stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored, and always for keys without a segment.
    /// A record whose value cannot be decoded as `V` fails with [`Error::BadValueContent`].
    pub async fn get<V>(&self, key: &CacheKey) -> Result<Option<CacheRecord<V>>>
    where
        V: DeserializeOwned,
    {
        let service = self.service()?;

        if !key.has_segment() {
            return Ok(None);
        }

        let item = service
            .get_item(
                &self.settings.table_name,
                codec::encode_key(&self.settings, key),
            )
            .await?;

        match item {
            Some(item) => {
                debug!(segment = %key.segment, id = %key.id, "cache hit");
                codec::decode_record(&item).map(Some)
            }
            None => {
                debug!(segment = %key.segment, id = %key.id, "cache miss");
                Ok(None)
            }
        }
    }

    /// Store `value` under `key`, overwriting whatever was there.
    ///
    /// The value is encoded before anything is sent, so an unencodable value never
    /// reaches the table. `ttl` is stored as given.
    pub async fn set<V>(&self, key: &CacheKey, value: &V, ttl: TtlMs) -> Result<()>
    where
        V: Serialize + ?Sized,
    {
        let service = self.service()?;

        if !key.has_segment() {
            return Err(SegmentNameError::Empty.into());
        }

        let value_json = serde_json::to_string(value).map_err(Error::Serialization)?;
        let stored = now_millis();
        let record = codec::encode_record(&self.settings, key, value_json, stored, ttl);

        service
            .put_item(&self.settings.table_name, record)
            .await?;

        debug!(segment = %key.segment, id = %key.id, ttl_ms = ttl.0, "stored cache item");
        Ok(())
    }

    /// Delete the record under `key`.
    ///
    /// Fails with [`Error::NotFound`] when no record existed.
    pub async fn drop(&self, key: &CacheKey) -> Result<()> {
        let service = self.service()?;

        if !key.has_segment() {
            return Err(Error::NotFound);
        }

        let previous = service
            .delete_item(
                &self.settings.table_name,
                codec::encode_key(&self.settings, key),
            )
            .await?;

        match previous {
            Some(_) => {
                debug!(segment = %key.segment, id = %key.id, "dropped cache item");
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    fn service(&self) -> Result<Arc<dyn ItemService>> {
        match &*self.state.read() {
            ConnectionState::Started(service) => Ok(Arc::clone(service)),
            ConnectionState::Stopped => Err(Error::NotStarted),
        }
    }
}

impl Debug for CacheConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConnection")
            .field("settings", &self.settings)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

fn check_key_attributes(settings: &Settings) -> Result<()> {
    let hash = settings.hash_attribute.as_str();
    let range = settings.range_attribute.as_str();

    if hash.is_empty() || range.is_empty() {
        return Err(Error::Usage(
            "hash and range attribute names must not be empty".to_string(),
        ));
    }
    if hash == range {
        return Err(Error::Usage(format!(
            "hash and range attributes must differ, both are '{hash}'"
        )));
    }
    if let Some(reserved) = [hash, range]
        .into_iter()
        .find(|name| RECORD_ATTRIBUTES.contains(name))
    {
        return Err(Error::Usage(format!(
            "'{reserved}' is a record attribute and cannot be used as a key attribute"
        )));
    }

    Ok(())
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

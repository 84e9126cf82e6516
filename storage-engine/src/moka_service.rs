use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use dynamo_cache::ports::{Item, ItemService, ServiceFactory};
use moka::future::Cache;
use shared::config::Settings;
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;

/// Table errors raised by the in-memory service, mirroring the checks DynamoDB applies.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryServiceError {
    #[error("table name must not be empty")]
    EmptyTableName,
    #[error("missing key attribute '{0}'")]
    MissingKeyAttribute(String),
    #[error("key attribute '{0}' must be a non-empty string")]
    InvalidKeyAttribute(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TableKey {
    table: String,
    hash: String,
    range: String,
}

/// Moka-based table service keyed by (table, hash, range)
/// Items never expire here; expiry belongs to whoever reads the records
pub struct MokaItemService {
    items: Cache<TableKey, Item>,
    hash_attribute: String,
    range_attribute: String,
}

impl MokaItemService {
    /// Create an unbounded service using the given key attribute names
    pub fn new(hash_attribute: impl Into<String>, range_attribute: impl Into<String>) -> Self {
        Self {
            items: Cache::builder().name("dynamo-cache-memory").build(),
            hash_attribute: hash_attribute.into(),
            range_attribute: range_attribute.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.hash_attribute.clone(),
            settings.range_attribute.clone(),
        )
    }

    fn table_key(&self, table_name: &str, item: &Item) -> Result<TableKey> {
        if table_name.is_empty() {
            return Err(Error::backend(MemoryServiceError::EmptyTableName));
        }

        Ok(TableKey {
            table: table_name.to_string(),
            hash: key_part(item, &self.hash_attribute)?,
            range: key_part(item, &self.range_attribute)?,
        })
    }
}

fn key_part(item: &Item, attribute: &str) -> Result<String> {
    match item.get(attribute) {
        Some(AttributeValue::S(value)) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(Error::backend(MemoryServiceError::InvalidKeyAttribute(
            attribute.to_string(),
        ))),
        None => Err(Error::backend(MemoryServiceError::MissingKeyAttribute(
            attribute.to_string(),
        ))),
    }
}

#[async_trait]
impl ItemService for MokaItemService {
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let key = self.table_key(table_name, &key)?;
        Ok(self.items.get(&key).await)
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        let key = self.table_key(table_name, &item)?;
        self.items.insert(key, item).await;
        Ok(())
    }

    async fn delete_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let key = self.table_key(table_name, &key)?;
        Ok(self.items.remove(&key).await)
    }
}

impl Debug for MokaItemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaItemService")
            .field("entry_count", &self.items.entry_count())
            .field("hash_attribute", &self.hash_attribute)
            .field("range_attribute", &self.range_attribute)
            .finish()
    }
}

/// Creates a fresh, empty in-memory table service on every start
#[derive(Clone, Copy, Debug, Default)]
pub struct MokaServiceFactory;

#[async_trait]
impl ServiceFactory for MokaServiceFactory {
    async fn create_service(&self, settings: &Settings) -> Arc<dyn ItemService> {
        Arc::new(MokaItemService::from_settings(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(segment: &str, id: &str) -> Item {
        Item::from([
            ("segment".to_string(), AttributeValue::S(segment.to_string())),
            ("id".to_string(), AttributeValue::S(id.to_string())),
        ])
    }

    fn record(segment: &str, id: &str, value: &str) -> Item {
        let mut item = key(segment, id);
        item.insert("value".to_string(), AttributeValue::S(value.to_string()));
        item
    }

    #[tokio::test]
    async fn test_moka_service_put_and_get() {
        let service = MokaItemService::new("segment", "id");

        service.put_item("t", record("s", "x", "1")).await.unwrap();

        let item = service.get_item("t", key("s", "x")).await.unwrap().unwrap();
        assert_eq!(item.get("value"), Some(&AttributeValue::S("1".to_string())));
    }

    #[tokio::test]
    async fn test_moka_service_get_nonexistent() {
        let service = MokaItemService::new("segment", "id");

        let item = service.get_item("t", key("s", "missing")).await.unwrap();
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn test_moka_service_overwrite() {
        let service = MokaItemService::new("segment", "id");

        service.put_item("t", record("s", "x", "1")).await.unwrap();
        service.put_item("t", record("s", "x", "2")).await.unwrap();

        let item = service.get_item("t", key("s", "x")).await.unwrap().unwrap();
        assert_eq!(item.get("value"), Some(&AttributeValue::S("2".to_string())));
    }

    #[tokio::test]
    async fn test_moka_service_delete_returns_old_item() {
        let service = MokaItemService::new("segment", "id");
        service.put_item("t", record("s", "x", "1")).await.unwrap();

        let old = service.delete_item("t", key("s", "x")).await.unwrap();
        assert_eq!(
            old.and_then(|item| item.get("value").cloned()),
            Some(AttributeValue::S("1".to_string()))
        );

        let again = service.delete_item("t", key("s", "x")).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_moka_service_tables_are_separate() {
        let service = MokaItemService::new("segment", "id");
        service.put_item("a", record("s", "x", "1")).await.unwrap();

        assert!(service.get_item("b", key("s", "x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_moka_service_rejects_bad_keys() {
        let service = MokaItemService::new("segment", "id");

        let cases = [
            (
                service.get_item("", key("s", "x")).await,
                MemoryServiceError::EmptyTableName,
            ),
            (
                service.get_item("t", key("", "x")).await,
                MemoryServiceError::InvalidKeyAttribute("segment".to_string()),
            ),
            (
                service
                    .get_item(
                        "t",
                        Item::from([("id".to_string(), AttributeValue::S("x".to_string()))]),
                    )
                    .await,
                MemoryServiceError::MissingKeyAttribute("segment".to_string()),
            ),
            (
                service
                    .get_item(
                        "t",
                        Item::from([
                            ("segment".to_string(), AttributeValue::S("s".to_string())),
                            ("id".to_string(), AttributeValue::N("1".to_string())),
                        ]),
                    )
                    .await,
                MemoryServiceError::InvalidKeyAttribute("id".to_string()),
            ),
        ];

        for (result, expected) in cases {
            match result {
                Err(Error::Backend(inner)) => {
                    assert_eq!(inner.downcast_ref::<MemoryServiceError>(), Some(&expected));
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_moka_factory_uses_configured_attributes() {
        let settings = Settings {
            hash_attribute: "pk".to_string(),
            range_attribute: "sk".to_string(),
            ..Settings::default()
        };
        let service = MokaServiceFactory.create_service(&settings).await;

        let item = Item::from([
            ("pk".to_string(), AttributeValue::S("s".to_string())),
            ("sk".to_string(), AttributeValue::S("x".to_string())),
        ]);
        service.put_item("t", item.clone()).await.unwrap();

        assert_eq!(service.get_item("t", item.clone()).await.unwrap(), Some(item));
    }
}

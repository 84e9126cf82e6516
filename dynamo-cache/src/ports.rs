#![deny(clippy::all)]

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use shared::Result;
use shared::config::Settings;
use std::collections::HashMap;
use std::sync::Arc;

// Ports are the pluggable seams between the connection and a table backend

/// A table item (or key) as a map of attribute name to typed attribute value.
pub type Item = HashMap<String, AttributeValue>;

/// Point operations the connection needs from a table service handle
#[async_trait]
pub trait ItemService: Send + Sync + 'static {
    /// Read a single item by its full primary key
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>>;

    /// Write an item, replacing any item stored under the same key
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()>;

    /// Delete an item by key, returning the attributes it had before deletion
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<Option<Item>>;
}

/// Port for creating a service handle from settings
/// Called once each time a connection moves from stopped to started
#[async_trait]
pub trait ServiceFactory: Send + Sync + 'static {
    async fn create_service(&self, settings: &Settings) -> Arc<dyn ItemService>;
}

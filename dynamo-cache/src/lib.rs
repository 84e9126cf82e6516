//! Cache client that keeps values in a DynamoDB table.
//!
//! [`CacheConnection`] translates get/set/drop on a `(segment, id)` key into point
//! operations against a table with a composite primary key. The table itself is
//! reached through the [`ports::ItemService`] port so the same connection logic runs
//! against DynamoDB or an in-memory stand-in.

pub mod codec;
pub mod connection;
pub mod domain;
pub mod ports;

pub use connection::CacheConnection;
pub use domain::{CacheKey, CacheRecord, Lifecycle};
pub use ports::{Item, ItemService, ServiceFactory};

//! Table services for `dynamo-cache`: DynamoDB itself, and a Moka-backed
//! in-memory table for local runs and tests.

pub mod dynamodb;
pub mod moka_service;

pub use dynamodb::{DynamoDbService, DynamoDbServiceFactory};
pub use moka_service::{MemoryServiceError, MokaItemService, MokaServiceFactory};

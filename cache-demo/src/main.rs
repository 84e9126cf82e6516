mod policy;

use dynamo_cache::{CacheConnection, ServiceFactory};
use policy::Policy;
use serde::{Deserialize, Serialize};
use shared::TtlMs;
use shared::config::SettingsOverrides;
use std::sync::Arc;
use storage_engine::{DynamoDbServiceFactory, MokaServiceFactory};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SEGMENT: &str = "segment";
const DEFAULT_EXPIRES_IN_MS: u64 = 10_000;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Greeting {
    message: String,
    count: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let factory: Arc<dyn ServiceFactory> = match std::env::var("CACHE_BACKEND").as_deref() {
        Ok("memory") => {
            info!("Using in-memory table backend");
            Arc::new(MokaServiceFactory)
        }
        _ => {
            info!("Using DynamoDB table backend");
            Arc::new(DynamoDbServiceFactory)
        }
    };

    let connection = Arc::new(CacheConnection::new(SettingsOverrides::from_env(), factory)?);
    info!(
        "Cache settings: table '{}', region '{}', key ({}, {})",
        connection.settings().table_name,
        connection.settings().region,
        connection.settings().hash_attribute,
        connection.settings().range_attribute
    );

    let segment =
        std::env::var("CACHE_DEMO_SEGMENT").unwrap_or_else(|_| DEFAULT_SEGMENT.to_string());
    let expires_in = std::env::var("CACHE_DEMO_EXPIRES_IN_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_MS);

    connection.start().await;
    let result = run(Policy::new(connection.clone(), segment, TtlMs(expires_in))?).await;
    connection.stop();

    result
}

async fn run(policy: Policy) -> Result<(), Box<dyn std::error::Error>> {
    let greeting = Greeting {
        message: "hello".to_string(),
        count: 1,
    };

    policy.set("greeting", &greeting).await?;
    info!("Stored greeting");

    match policy.get::<Greeting>("greeting").await? {
        Some(cached) => info!("Cache hit: {:?}", cached),
        None => info!("Cache miss"),
    }

    policy.drop("greeting").await?;
    info!("Dropped greeting");

    if policy.get::<Greeting>("greeting").await?.is_none() {
        info!("Greeting is gone");
    }

    Ok(())
}

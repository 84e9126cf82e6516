use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::operation::get_item::GetItemInput;
use aws_sdk_dynamodb::types::ReturnValue;
use dynamo_cache::ports::{Item, ItemService, ServiceFactory};
use shared::config::Settings;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Table service backed by the AWS DynamoDB client
#[derive(Clone, Debug)]
pub struct DynamoDbService {
    client: Client,
}

impl DynamoDbService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Point read request; strongly consistent so a caller always sees its own writes.
    pub fn get_item_input(table_name: &str, key: Item) -> Result<GetItemInput> {
        GetItemInput::builder()
            .table_name(table_name)
            .set_key(Some(key))
            .consistent_read(true)
            .build()
            .map_err(Error::backend)
    }
}

#[async_trait]
impl ItemService for DynamoDbService {
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let input = Self::get_item_input(table_name, key)?;
        let output = self
            .client
            .get_item()
            .set_table_name(input.table_name)
            .set_key(input.key)
            .set_consistent_read(input.consistent_read)
            .send()
            .await
            .map_err(Error::backend)?;

        Ok(output.item)
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(Error::backend)?;

        Ok(())
    }

    async fn delete_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let output = self
            .client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(Error::backend)?;

        Ok(output.attributes)
    }
}

/// Builds a DynamoDB client from the ambient AWS configuration plus the cache settings
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamoDbServiceFactory;

impl DynamoDbServiceFactory {
    /// Client configuration for `settings`, layered over an already loaded SDK config.
    pub fn client_config(sdk_config: &SdkConfig, settings: &Settings) -> aws_sdk_dynamodb::Config {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config)
            .region(Region::new(settings.region.clone()));

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        builder.build()
    }
}

#[async_trait]
impl ServiceFactory for DynamoDbServiceFactory {
    async fn create_service(&self, settings: &Settings) -> Arc<dyn ItemService> {
        if settings.api_version != Settings::DEFAULT_API_VERSION {
            warn!(
                requested = %settings.api_version,
                supported = Settings::DEFAULT_API_VERSION,
                "requested DynamoDB API version is not supported by the client, using the supported one"
            );
        }

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;
        let config = Self::client_config(&sdk_config, settings);

        debug!(
            region = %settings.region,
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            "created DynamoDB client"
        );

        Arc::new(DynamoDbService::new(Client::from_conf(config)))
    }
}

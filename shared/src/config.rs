use serde::Deserialize;

/// Connection settings for the DynamoDB cache adapter.
///
/// Built once by merging [`SettingsOverrides`] onto [`Settings::default`] and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub region: String,
    /// Endpoint override, e.g. a DynamoDB Local URL.
    pub endpoint: Option<String>,
    pub api_version: String,
    pub table_name: String,
    /// Partition key attribute; carries the key segment.
    pub hash_attribute: String,
    /// Sort key attribute; carries the key id.
    pub range_attribute: String,
}

impl Settings {
    pub const DEFAULT_REGION: &str = "us-east-1";
    pub const DEFAULT_API_VERSION: &str = "2012-08-10";
    pub const DEFAULT_HASH_ATTRIBUTE: &str = "segment";
    pub const DEFAULT_RANGE_ATTRIBUTE: &str = "id";

    /// Apply `overrides` on top of `self`, returning a new value.
    pub fn merge(&self, overrides: SettingsOverrides) -> Settings {
        Settings {
            region: overrides.region.unwrap_or_else(|| self.region.clone()),
            endpoint: overrides.endpoint.or_else(|| self.endpoint.clone()),
            api_version: overrides
                .api_version
                .unwrap_or_else(|| self.api_version.clone()),
            table_name: overrides
                .table_name
                .unwrap_or_else(|| self.table_name.clone()),
            hash_attribute: overrides
                .hash_attribute
                .unwrap_or_else(|| self.hash_attribute.clone()),
            range_attribute: overrides
                .range_attribute
                .unwrap_or_else(|| self.range_attribute.clone()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: Self::DEFAULT_REGION.to_string(),
            endpoint: None,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            table_name: String::new(),
            hash_attribute: Self::DEFAULT_HASH_ATTRIBUTE.to_string(),
            range_attribute: Self::DEFAULT_RANGE_ATTRIBUTE.to_string(),
        }
    }
}

/// User supplied settings; anything left as `None` falls back to the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsOverrides {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    #[serde(alias = "api_version")]
    pub api_version: Option<String>,
    #[serde(alias = "table_name")]
    pub table_name: Option<String>,
    #[serde(alias = "hash_attribute")]
    pub hash_attribute: Option<String>,
    #[serde(alias = "range_attribute")]
    pub range_attribute: Option<String>,
}

impl SettingsOverrides {
    pub const ENV_REGION: &str = "CACHE_DYNAMODB_REGION";
    pub const ENV_ENDPOINT: &str = "CACHE_DYNAMODB_ENDPOINT";
    pub const ENV_API_VERSION: &str = "CACHE_DYNAMODB_API_VERSION";
    pub const ENV_TABLE: &str = "CACHE_DYNAMODB_TABLE";
    pub const ENV_HASH_ATTRIBUTE: &str = "CACHE_DYNAMODB_HASH_ATTRIBUTE";
    pub const ENV_RANGE_ATTRIBUTE: &str = "CACHE_DYNAMODB_RANGE_ATTRIBUTE";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            region: read(Self::ENV_REGION),
            endpoint: read(Self::ENV_ENDPOINT),
            api_version: read(Self::ENV_API_VERSION),
            table_name: read(Self::ENV_TABLE),
            hash_attribute: read(Self::ENV_HASH_ATTRIBUTE),
            range_attribute: read(Self::ENV_RANGE_ATTRIBUTE),
        }
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

//! Mapping between cache keys/records and table items.
//!
//! A record is stored as
//! `{ <hash>: S(segment), <range>: S(id), value: S(json), stored: N(ms), ttl: N(ms) }`.

use crate::domain::{CacheKey, CacheRecord};
use crate::ports::Item;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::de::DeserializeOwned;
use shared::config::Settings;
use shared::{Error, Result, TtlMs};

pub const VALUE_ATTRIBUTE: &str = "value";
pub const STORED_ATTRIBUTE: &str = "stored";
pub const TTL_ATTRIBUTE: &str = "ttl";

/// Attribute names owned by the record layout; key attributes may not reuse them.
pub const RECORD_ATTRIBUTES: [&str; 3] = [VALUE_ATTRIBUTE, STORED_ATTRIBUTE, TTL_ATTRIBUTE];

pub fn encode_key(settings: &Settings, key: &CacheKey) -> Item {
    Item::from([
        (
            settings.hash_attribute.clone(),
            AttributeValue::S(key.segment.clone()),
        ),
        (
            settings.range_attribute.clone(),
            AttributeValue::S(key.id.clone()),
        ),
    ])
}

pub fn encode_record(
    settings: &Settings,
    key: &CacheKey,
    value_json: String,
    stored: u64,
    ttl: TtlMs,
) -> Item {
    let mut item = encode_key(settings, key);
    item.insert(VALUE_ATTRIBUTE.to_string(), AttributeValue::S(value_json));
    item.insert(
        STORED_ATTRIBUTE.to_string(),
        AttributeValue::N(stored.to_string()),
    );
    item.insert(TTL_ATTRIBUTE.to_string(), AttributeValue::N(ttl.0.to_string()));
    item
}

pub fn decode_record<V>(item: &Item) -> Result<CacheRecord<V>>
where
    V: DeserializeOwned,
{
    let value = match item.get(VALUE_ATTRIBUTE) {
        Some(AttributeValue::S(json)) => json,
        _ => return Err(Error::BadValueContent),
    };
    let value = serde_json::from_str(value).map_err(|_| Error::BadValueContent)?;

    let stored = decode_millis(item, STORED_ATTRIBUTE)?;
    let ttl = decode_millis(item, TTL_ATTRIBUTE)?;

    Ok(CacheRecord::new(value, stored, TtlMs(ttl)))
}

fn decode_millis(item: &Item, attribute: &str) -> Result<u64> {
    match item.get(attribute) {
        Some(AttributeValue::N(number)) => number.parse().map_err(|_| Error::BadValueContent),
        _ => Err(Error::BadValueContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn custom_settings() -> Settings {
        Settings {
            hash_attribute: "pk".to_string(),
            range_attribute: "sk".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_encode_key_uses_configured_attributes() {
        let key = encode_key(&custom_settings(), &CacheKey::new("users", "42"));

        assert_eq!(key.len(), 2);
        assert_eq!(key.get("pk"), Some(&AttributeValue::S("users".to_string())));
        assert_eq!(key.get("sk"), Some(&AttributeValue::S("42".to_string())));
    }

    #[test]
    fn test_encode_record_layout() {
        let item = encode_record(
            &Settings::default(),
            &CacheKey::new("s", "x"),
            r#"{"a":1}"#.to_string(),
            1_700_000_000_000,
            TtlMs(5000),
        );

        assert_eq!(item.len(), 5);
        assert_eq!(item.get("segment"), Some(&AttributeValue::S("s".to_string())));
        assert_eq!(item.get("id"), Some(&AttributeValue::S("x".to_string())));
        assert_eq!(
            item.get("value"),
            Some(&AttributeValue::S(r#"{"a":1}"#.to_string()))
        );
        assert_eq!(
            item.get("stored"),
            Some(&AttributeValue::N("1700000000000".to_string()))
        );
        assert_eq!(item.get("ttl"), Some(&AttributeValue::N("5000".to_string())));
    }

    #[test]
    fn test_decode_record() {
        let item = encode_record(
            &Settings::default(),
            &CacheKey::new("s", "x"),
            r#"{"nested":{"list":[1,2,3]},"flag":true}"#.to_string(),
            12,
            TtlMs(34),
        );

        let record: CacheRecord<Value> = decode_record(&item).unwrap();
        assert_eq!(record.item, json!({"nested": {"list": [1, 2, 3]}, "flag": true}));
        assert_eq!(record.stored, 12);
        assert_eq!(record.ttl, TtlMs(34));
    }

    #[test]
    fn test_decode_rejects_corrupt_json() {
        let item = encode_record(
            &Settings::default(),
            &CacheKey::new("s", "x"),
            r#""{"key": "value""#.to_string(),
            12,
            TtlMs(34),
        );

        let result = decode_record::<Value>(&item);
        assert!(matches!(result, Err(Error::BadValueContent)));
    }

    #[test]
    fn test_decode_rejects_missing_or_mistyped_attributes() {
        let mut item = encode_record(
            &Settings::default(),
            &CacheKey::new("s", "x"),
            "1".to_string(),
            12,
            TtlMs(34),
        );
        item.insert(TTL_ATTRIBUTE.to_string(), AttributeValue::S("34".to_string()));
        assert!(matches!(
            decode_record::<Value>(&item),
            Err(Error::BadValueContent)
        ));

        item.remove(TTL_ATTRIBUTE);
        assert!(matches!(
            decode_record::<Value>(&item),
            Err(Error::BadValueContent)
        ));

        let mut item = encode_record(
            &Settings::default(),
            &CacheKey::new("s", "x"),
            "1".to_string(),
            12,
            TtlMs(34),
        );
        item.remove(VALUE_ATTRIBUTE);
        assert!(matches!(
            decode_record::<Value>(&item),
            Err(Error::BadValueContent)
        ));
    }

    #[test]
    fn test_decode_into_typed_value() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Session {
            user: String,
            visits: u32,
        }

        let item = encode_record(
            &Settings::default(),
            &CacheKey::new("sessions", "abc"),
            r#"{"user":"ana","visits":3}"#.to_string(),
            1,
            TtlMs(2),
        );

        let record: CacheRecord<Session> = decode_record(&item).unwrap();
        assert_eq!(
            record.item,
            Session {
                user: "ana".to_string(),
                visits: 3
            }
        );
    }
}

//! DynamoDB implementation of the record store
//!
//! Read-only: exact-key `GetItem` on the designed composite keys, plus the
//! bounded partition `Query` used as a diagnostic fallback. Standard retry
//! mode with up to five attempts, matching the rest of the tooling around
//! these tables.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use pkcheck_core::{RecordKey, RecordStore, StoredRecord, ValidatorError};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Record store backed by DynamoDB tables
#[derive(Debug, Clone)]
pub struct DynamoRecordStore {
    client: Client,
}

impl DynamoRecordStore {
    /// Connect to the given region with standard retries (5 attempts)
    pub async fn connect(region: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::standard().with_max_attempts(5))
            .load()
            .await;
        Self {
            client: Client::new(&shared),
        }
    }

    /// Wrap an existing client (tests, custom endpoints)
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn get(
        &self,
        table: &str,
        key: &RecordKey,
    ) -> Result<Option<StoredRecord>, ValidatorError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key("pk", AttributeValue::S(key.pk.clone()))
            .key("sk", AttributeValue::S(key.sk.clone()))
            .send()
            .await
            .map_err(|e| ValidatorError::store(table, DisplayErrorContext(&e).to_string()))?;

        Ok(output.item.map(to_record))
    }

    async fn query_partition(
        &self,
        table: &str,
        pk: &str,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, ValidatorError> {
        let output = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression("pk = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
            .limit(limit as i32)
            .send()
            .await
            .map_err(|e| ValidatorError::store(table, DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(to_record)
            .collect())
    }
}

fn to_record(item: HashMap<String, AttributeValue>) -> StoredRecord {
    let mut attributes = Map::with_capacity(item.len());
    for (name, value) in item {
        attributes.insert(name, to_json(value));
    }
    StoredRecord::new(attributes)
}

fn to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => parse_number(&n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.into_iter().map(to_json).collect()),
        AttributeValue::M(map) => {
            let mut object = Map::with_capacity(map.len());
            for (name, nested) in map {
                object.insert(name, to_json(nested));
            }
            Value::Object(object)
        }
        AttributeValue::Ss(items) => {
            Value::Array(items.into_iter().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => {
            Value::Array(items.iter().map(|n| parse_number(n)).collect())
        }
        // Binary and other shapes never appear in these tables.
        _ => Value::Null,
    }
}

fn parse_number(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

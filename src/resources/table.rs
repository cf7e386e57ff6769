//! CF-007: DynamoDB table resource handler.

use super::tags_property;
use crate::core::types::{Attribute, BillingMode, TableSpec};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Render the `Properties` block of an `AWS::DynamoDB::Table`.
pub fn properties(spec: &TableSpec, tags: &BTreeMap<String, String>) -> Value {
    let mut props = Map::new();

    let keys: Vec<(&Attribute, &str)> = std::iter::once((&spec.partition_key, "HASH"))
        .chain(spec.sort_key.iter().map(|k| (k, "RANGE")))
        .collect();

    props.insert(
        "KeySchema".to_string(),
        Value::Array(
            keys.iter()
                .map(|(a, kt)| json!({ "AttributeName": a.name, "KeyType": kt }))
                .collect(),
        ),
    );
    props.insert(
        "AttributeDefinitions".to_string(),
        Value::Array(
            keys.iter()
                .map(|(a, _)| {
                    json!({ "AttributeName": a.name, "AttributeType": a.attribute_type.code() })
                })
                .collect(),
        ),
    );

    match spec.billing_mode {
        BillingMode::PayPerRequest => {
            props.insert("BillingMode".to_string(), json!("PAY_PER_REQUEST"));
        }
        BillingMode::Provisioned {
            read_capacity,
            write_capacity,
        } => {
            props.insert("BillingMode".to_string(), json!("PROVISIONED"));
            props.insert(
                "ProvisionedThroughput".to_string(),
                json!({
                    "ReadCapacityUnits": read_capacity,
                    "WriteCapacityUnits": write_capacity
                }),
            );
        }
    }

    if !tags.is_empty() {
        props.insert("Tags".to_string(), tags_property(tags));
    }

    Value::Object(props)
}

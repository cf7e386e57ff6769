//! Resource handlers: render CloudFormation properties for each resource kind.
//!
//! Each handler produces the `Properties` block for its kind. Support
//! resources that a kind needs (the auto-delete machinery for buckets) are
//! rendered by their own handler.

use serde_json::{json, Value};
use std::collections::BTreeMap;

pub mod auto_delete;
pub mod bucket;
pub mod table;

/// Render tags as a CloudFormation `Tags` list, ordered by key.
pub fn tags_property(tags: &BTreeMap<String, String>) -> Value {
    Value::Array(
        tags.iter()
            .map(|(k, v)| json!({ "Key": k, "Value": v }))
            .collect(),
    )
}

/// `{ "Ref": logical_id }`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{ "Fn::GetAtt": [logical_id, attribute] }`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `Metadata` block recording the construct path of a template resource.
pub fn path_metadata(stack_id: &str, construct_id: &str, child: &str) -> Value {
    json!({ "aws:cdk:path": format!("{stack_id}/{construct_id}/{child}") })
}

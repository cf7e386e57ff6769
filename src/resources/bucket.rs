//! CF-006: S3 bucket resource handler.

use super::auto_delete::AUTO_DELETE_TAG;
use super::tags_property;
use crate::core::types::{BucketEncryption, BucketSpec};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Tags the bucket carries in the template: the declared ones plus the
/// auto-delete marker when enabled.
pub fn effective_tags(spec: &BucketSpec, tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut tags = tags.clone();
    if spec.auto_delete_objects {
        tags.insert(AUTO_DELETE_TAG.to_string(), "true".to_string());
    }
    tags
}

/// Render the `Properties` block of an `AWS::S3::Bucket`.
pub fn properties(spec: &BucketSpec, tags: &BTreeMap<String, String>) -> Value {
    let mut props = Map::new();

    let sse_default = match spec.encryption {
        BucketEncryption::S3Managed => json!({ "SSEAlgorithm": "AES256" }),
        BucketEncryption::KmsManaged => json!({ "SSEAlgorithm": "aws:kms" }),
    };
    props.insert(
        "BucketEncryption".to_string(),
        json!({
            "ServerSideEncryptionConfiguration": [
                { "ServerSideEncryptionByDefault": sse_default }
            ]
        }),
    );

    let tags = effective_tags(spec, tags);
    if !tags.is_empty() {
        props.insert("Tags".to_string(), tags_property(&tags));
    }

    if spec.versioned {
        props.insert(
            "VersioningConfiguration".to_string(),
            json!({ "Status": "Enabled" }),
        );
    }

    Value::Object(props)
}

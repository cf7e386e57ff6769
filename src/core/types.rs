//! CF-001: Resource graph and template types.
//!
//! The stack definition produces a [`ResourceGraph`]; the synthesizer turns it
//! into a CloudFormation [`Template`]. Template types serialize with the
//! PascalCase keys CloudFormation expects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Stack options
// ============================================================================

/// Options handed to a stack definition alongside its id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOptions {
    /// Template description
    #[serde(default)]
    pub description: Option<String>,

    /// Target account/region (unresolved when absent)
    #[serde(default)]
    pub env: Option<Environment>,
}

/// Deployment environment of a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
}

impl Environment {
    /// Render as `aws://<account>/<region>`, with CDK's unknown placeholders.
    pub fn uri(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region.as_deref().unwrap_or("unknown-region")
        )
    }
}

// ============================================================================
// Resources
// ============================================================================

/// What happens to a resource when its stack is deleted or it is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    Destroy,
    #[default]
    Retain,
    Snapshot,
}

impl RemovalPolicy {
    /// CloudFormation `DeletionPolicy` / `UpdateReplacePolicy` value.
    pub fn cfn_value(self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
            Self::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destroy => write!(f, "destroy"),
            Self::Retain => write!(f, "retain"),
            Self::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Server-side encryption for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketEncryption {
    /// SSE-S3 (AES256), keys owned by the provider
    S3Managed,
    /// SSE-KMS with the account's `aws/s3` key
    KmsManaged,
}

/// Object store declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub versioned: bool,
    pub encryption: BucketEncryption,
    /// Empty the bucket when the stack is deleted
    pub auto_delete_objects: bool,
}

/// DynamoDB scalar attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    /// Single-letter code used in `AttributeDefinitions`.
    pub fn code(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
        }
    }
}

/// Key attribute of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

impl Attribute {
    pub fn new(name: &str, attribute_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            attribute_type,
        }
    }
}

/// Table capacity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// On-demand
    PayPerRequest,
    Provisioned {
        read_capacity: u32,
        write_capacity: u32,
    },
}

/// Schema-less key-value table declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub partition_key: Attribute,
    #[serde(default)]
    pub sort_key: Option<Attribute>,
    pub billing_mode: BillingMode,
}

/// Resource kind with its kind-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    Bucket(BucketSpec),
    Table(TableSpec),
}

impl ResourceKind {
    /// CloudFormation resource type.
    pub fn cfn_type(&self) -> &'static str {
        match self {
            Self::Bucket(_) => "AWS::S3::Bucket",
            Self::Table(_) => "AWS::DynamoDB::Table",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket(_) => write!(f, "bucket"),
            Self::Table(_) => write!(f, "table"),
        }
    }
}

/// A single declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDecl {
    /// Construct id, unique within the stack
    pub id: String,

    pub kind: ResourceKind,

    pub removal_policy: RemovalPolicy,

    /// Tags, ordered by key
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Named stack output exposing a resource's generated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub id: String,

    /// Id of the resource whose `Ref` becomes the value
    pub resource: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Explicit resource graph for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub stack_id: String,
    pub options: StackOptions,
    pub resources: Vec<ResourceDecl>,
    pub outputs: Vec<StackOutput>,
}

impl ResourceGraph {
    /// Look up a resource by construct id.
    pub fn resource(&self, id: &str) -> Option<&ResourceDecl> {
        self.resources.iter().find(|r| r.id == id)
    }
}

// ============================================================================
// CloudFormation template
// ============================================================================

/// Synthesized CloudFormation template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Resources keyed by logical id, in declaration order
    pub resources: IndexMap<String, CfnResource>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, CfnOutput>,
}

impl Template {
    /// Logical ids of every resource with the given CloudFormation type.
    pub fn resources_of_type(&self, cfn_type: &str) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == cfn_type)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// One template resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnResource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: serde_json::Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CfnResource {
    /// `Key`/`Value` tag pairs from the `Tags` property, if any.
    pub fn tags(&self) -> Vec<(String, String)> {
        self.properties
            .get("Tags")
            .and_then(|t| t.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| {
                        Some((
                            t.get("Key")?.as_str()?.to_string(),
                            t.get("Value")?.as_str()?.to_string(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One template output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnOutput {
    pub value: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cf001_removal_policy_cfn_value() {
        assert_eq!(RemovalPolicy::Destroy.cfn_value(), "Delete");
        assert_eq!(RemovalPolicy::Retain.cfn_value(), "Retain");
        assert_eq!(RemovalPolicy::Snapshot.cfn_value(), "Snapshot");
    }

    #[test]
    fn test_cf001_removal_policy_default_is_retain() {
        assert_eq!(RemovalPolicy::default(), RemovalPolicy::Retain);
        assert_eq!(RemovalPolicy::Destroy.to_string(), "destroy");
    }

    #[test]
    fn test_cf001_attribute_type_codes() {
        assert_eq!(AttributeType::String.code(), "S");
        assert_eq!(AttributeType::Number.code(), "N");
        assert_eq!(AttributeType::Binary.code(), "B");
    }

    #[test]
    fn test_cf001_resource_kind_cfn_type() {
        let bucket = ResourceKind::Bucket(BucketSpec {
            versioned: true,
            encryption: BucketEncryption::S3Managed,
            auto_delete_objects: false,
        });
        assert_eq!(bucket.cfn_type(), "AWS::S3::Bucket");
        assert_eq!(bucket.to_string(), "bucket");
    }

    #[test]
    fn test_cf001_environment_uri() {
        assert_eq!(
            Environment::default().uri(),
            "aws://unknown-account/unknown-region"
        );
        let env = Environment {
            account: Some("123456789012".to_string()),
            region: Some("eu-west-1".to_string()),
        };
        assert_eq!(env.uri(), "aws://123456789012/eu-west-1");
    }

    #[test]
    fn test_cf001_template_serializes_pascal_case() {
        let mut resources = IndexMap::new();
        resources.insert(
            "Thing1234ABCD".to_string(),
            CfnResource {
                resource_type: "AWS::S3::Bucket".to_string(),
                properties: json!({}),
                depends_on: vec![],
                update_replace_policy: Some("Delete".to_string()),
                deletion_policy: Some("Delete".to_string()),
                metadata: None,
            },
        );
        let template = Template {
            format_version: "2010-09-09".to_string(),
            description: None,
            resources,
            outputs: IndexMap::new(),
        };
        let text = serde_json::to_string(&template).unwrap();
        assert!(text.contains("\"AWSTemplateFormatVersion\":\"2010-09-09\""));
        assert!(text.contains("\"Type\":\"AWS::S3::Bucket\""));
        assert!(text.contains("\"DeletionPolicy\":\"Delete\""));
        assert!(!text.contains("Outputs"));
        assert!(!text.contains("DependsOn"));
        assert!(!text.contains("Description"));
    }

    #[test]
    fn test_cf001_cfn_resource_tags() {
        let r = CfnResource {
            resource_type: "AWS::DynamoDB::Table".to_string(),
            properties: json!({
                "Tags": [
                    {"Key": "a", "Value": "1"},
                    {"Key": "project", "Value": "x"}
                ]
            }),
            depends_on: vec![],
            update_replace_policy: None,
            deletion_policy: None,
            metadata: None,
        };
        assert_eq!(
            r.tags(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("project".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn test_cf001_graph_yaml_roundtrip() {
        let graph = ResourceGraph {
            stack_id: "S".to_string(),
            options: StackOptions::default(),
            resources: vec![ResourceDecl {
                id: "T".to_string(),
                kind: ResourceKind::Table(TableSpec {
                    partition_key: Attribute::new("pk", AttributeType::String),
                    sort_key: None,
                    billing_mode: BillingMode::PayPerRequest,
                }),
                removal_policy: RemovalPolicy::Destroy,
                tags: BTreeMap::new(),
            }],
            outputs: vec![],
        };
        let yaml = serde_yaml_ng::to_string(&graph).unwrap();
        let back: ResourceGraph = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, graph);
        assert!(back.resource("T").is_some());
        assert!(back.resource("missing").is_none());
    }
}

//! CF-003: The infrastructure stack: an artifacts bucket and an app table.
//!
//! A pure function from stack id and options to a [`ResourceGraph`]. Nothing
//! is registered globally; the caller hands the graph to the synthesizer.

use super::types::*;
use std::collections::BTreeMap;

/// Tag key shared by every resource in the stack.
pub const PROJECT_TAG_KEY: &str = "project";

/// Tag value shared by every resource in the stack.
pub const PROJECT_TAG_VALUE: &str = "cloud-foundation-lab";

pub const BUCKET_ID: &str = "ArtifactsBucket";
pub const TABLE_ID: &str = "AppTable";
pub const BUCKET_OUTPUT_ID: &str = "ArtifactsBucketName";
pub const TABLE_OUTPUT_ID: &str = "AppTableName";

/// Declare the stack.
pub fn infra_stack(stack_id: &str, options: &StackOptions) -> ResourceGraph {
    let removal_policy = RemovalPolicy::Destroy;
    let tags = BTreeMap::from([(PROJECT_TAG_KEY.to_string(), PROJECT_TAG_VALUE.to_string())]);

    let bucket = ResourceDecl {
        id: BUCKET_ID.to_string(),
        kind: ResourceKind::Bucket(BucketSpec {
            versioned: true,
            encryption: BucketEncryption::S3Managed,
            auto_delete_objects: true,
        }),
        removal_policy,
        tags: tags.clone(),
    };

    let table = ResourceDecl {
        id: TABLE_ID.to_string(),
        kind: ResourceKind::Table(TableSpec {
            partition_key: Attribute::new("pk", AttributeType::String),
            sort_key: None,
            billing_mode: BillingMode::PayPerRequest,
        }),
        removal_policy,
        tags,
    };

    ResourceGraph {
        stack_id: stack_id.to_string(),
        options: options.clone(),
        resources: vec![bucket, table],
        outputs: vec![
            StackOutput {
                id: BUCKET_OUTPUT_ID.to_string(),
                resource: BUCKET_ID.to_string(),
                description: None,
            },
            StackOutput {
                id: TABLE_OUTPUT_ID.to_string(),
                resource: TABLE_ID.to_string(),
                description: None,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cf003_declares_bucket_and_table() {
        let graph = infra_stack("InfraStack", &StackOptions::default());
        assert_eq!(graph.stack_id, "InfraStack");
        assert_eq!(graph.resources.len(), 2);

        let bucket = graph.resource(BUCKET_ID).unwrap();
        match &bucket.kind {
            ResourceKind::Bucket(spec) => {
                assert!(spec.versioned);
                assert!(spec.auto_delete_objects);
                assert_eq!(spec.encryption, BucketEncryption::S3Managed);
            }
            other => panic!("expected bucket, got {other}"),
        }

        let table = graph.resource(TABLE_ID).unwrap();
        match &table.kind {
            ResourceKind::Table(spec) => {
                assert_eq!(spec.partition_key, Attribute::new("pk", AttributeType::String));
                assert!(spec.sort_key.is_none());
                assert_eq!(spec.billing_mode, BillingMode::PayPerRequest);
            }
            other => panic!("expected table, got {other}"),
        }
    }

    #[test]
    fn test_cf003_shared_removal_policy_and_tag() {
        let graph = infra_stack("InfraStack", &StackOptions::default());
        for r in &graph.resources {
            assert_eq!(r.removal_policy, RemovalPolicy::Destroy);
            assert_eq!(
                r.tags.get(PROJECT_TAG_KEY).map(String::as_str),
                Some(PROJECT_TAG_VALUE)
            );
        }
    }

    #[test]
    fn test_cf003_outputs() {
        let graph = infra_stack("InfraStack", &StackOptions::default());
        let outputs: Vec<(&str, &str)> = graph
            .outputs
            .iter()
            .map(|o| (o.id.as_str(), o.resource.as_str()))
            .collect();
        assert_eq!(
            outputs,
            vec![("ArtifactsBucketName", "ArtifactsBucket"), ("AppTableName", "AppTable")]
        );
    }

    #[test]
    fn test_cf003_deterministic() {
        let options = StackOptions {
            description: Some("lab".to_string()),
            env: None,
        };
        assert_eq!(infra_stack("A", &options), infra_stack("A", &options));
    }

    #[test]
    fn test_cf003_options_carried() {
        let options = StackOptions {
            description: Some("lab".to_string()),
            env: Some(Environment {
                account: None,
                region: Some("us-west-2".to_string()),
            }),
        };
        let graph = infra_stack("B", &options);
        assert_eq!(graph.options, options);
    }
}

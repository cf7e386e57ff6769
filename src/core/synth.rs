//! CF-010: Template synthesis: dispatch to resource handlers.
//!
//! Turns a validated [`ResourceGraph`] into a CloudFormation [`Template`].
//! Each declaration becomes one template resource keyed by its logical id;
//! buckets with auto-delete add their support resources right after.

use super::hasher::logical_id;
use super::types::*;
use super::validate::validate_graph;
use crate::error::{Error, Result};
use crate::resources::{self, auto_delete, path_metadata, reference};
use indexmap::IndexMap;

/// CloudFormation template format version.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Logical id of a declared resource.
pub fn resource_logical_id(construct_id: &str) -> String {
    logical_id(construct_id, "Resource")
}

/// Render the `Properties` block of one declaration.
pub fn properties(resource: &ResourceDecl) -> serde_json::Value {
    match &resource.kind {
        ResourceKind::Bucket(spec) => resources::bucket::properties(spec, &resource.tags),
        ResourceKind::Table(spec) => resources::table::properties(spec, &resource.tags),
    }
}

fn insert_unique(
    resources: &mut IndexMap<String, CfnResource>,
    id: String,
    resource: CfnResource,
) -> Result<()> {
    if resources.contains_key(&id) {
        return Err(Error::Validation(format!("logical id '{id}' is generated twice")));
    }
    resources.insert(id, resource);
    Ok(())
}

/// Synthesize a template. Fails if the graph does not validate.
pub fn synthesize(graph: &ResourceGraph) -> Result<Template> {
    let errors = validate_graph(graph);
    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(Error::Validation(joined.join("; ")));
    }

    let mut template_resources = IndexMap::new();
    for resource in &graph.resources {
        let id = resource_logical_id(&resource.id);
        let policy = resource.removal_policy.cfn_value().to_string();
        tracing::debug!(resource = %resource.id, logical_id = %id, kind = %resource.kind, "synthesizing resource");

        insert_unique(
            &mut template_resources,
            id.clone(),
            CfnResource {
                resource_type: resource.kind.cfn_type().to_string(),
                properties: properties(resource),
                depends_on: vec![],
                update_replace_policy: Some(policy.clone()),
                deletion_policy: Some(policy),
                metadata: Some(path_metadata(&graph.stack_id, &resource.id, "Resource")),
            },
        )?;

        if let ResourceKind::Bucket(spec) = &resource.kind {
            if spec.auto_delete_objects {
                for (support_id, support) in
                    auto_delete::support_resources(&graph.stack_id, &resource.id, &id)
                {
                    insert_unique(&mut template_resources, support_id, support)?;
                }
            }
        }
    }

    let mut outputs = IndexMap::new();
    for output in &graph.outputs {
        outputs.insert(
            output.id.clone(),
            CfnOutput {
                value: reference(&resource_logical_id(&output.resource)),
                description: output.description.clone(),
            },
        );
    }

    tracing::info!(
        stack = %graph.stack_id,
        resources = template_resources.len(),
        outputs = outputs.len(),
        "synthesized template"
    );

    Ok(Template {
        format_version: TEMPLATE_FORMAT_VERSION.to_string(),
        description: graph.options.description.clone(),
        resources: template_resources,
        outputs,
    })
}

/// Render a template as pretty JSON with a trailing newline.
pub fn to_json(template: &Template) -> Result<String> {
    let mut text = serde_json::to_string_pretty(template)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stack::{infra_stack, PROJECT_TAG_KEY, PROJECT_TAG_VALUE};
    use serde_json::json;

    fn lab_template() -> Template {
        synthesize(&infra_stack("InfraStack", &StackOptions::default())).unwrap()
    }

    #[test]
    fn test_cf010_deterministic() {
        let options = StackOptions {
            description: Some("lab".to_string()),
            env: None,
        };
        let a = to_json(&synthesize(&infra_stack("InfraStack", &options)).unwrap()).unwrap();
        let b = to_json(&synthesize(&infra_stack("InfraStack", &options)).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cf010_one_bucket_one_table() {
        let t = lab_template();
        assert_eq!(t.resources_of_type("AWS::S3::Bucket").len(), 1);
        assert_eq!(t.resources_of_type("AWS::DynamoDB::Table").len(), 1);
    }

    #[test]
    fn test_cf010_project_tag_on_both() {
        let t = lab_template();
        for cfn_type in ["AWS::S3::Bucket", "AWS::DynamoDB::Table"] {
            let id = t.resources_of_type(cfn_type)[0];
            let tags = t.resources[id].tags();
            assert!(
                tags.contains(&(PROJECT_TAG_KEY.to_string(), PROJECT_TAG_VALUE.to_string())),
                "{cfn_type} missing project tag: {tags:?}"
            );
        }
    }

    #[test]
    fn test_cf010_destroy_on_removal() {
        let t = lab_template();
        for cfn_type in ["AWS::S3::Bucket", "AWS::DynamoDB::Table"] {
            let id = t.resources_of_type(cfn_type)[0];
            let r = &t.resources[id];
            assert_eq!(r.deletion_policy.as_deref(), Some("Delete"));
            assert_eq!(r.update_replace_policy.as_deref(), Some("Delete"));
        }
    }

    #[test]
    fn test_cf010_outputs_reference_resources() {
        let t = lab_template();
        assert_eq!(t.outputs.len(), 2);
        let bucket_id = t.resources_of_type("AWS::S3::Bucket")[0];
        let table_id = t.resources_of_type("AWS::DynamoDB::Table")[0];
        assert_eq!(t.outputs["ArtifactsBucketName"].value, json!({"Ref": bucket_id}));
        assert_eq!(t.outputs["AppTableName"].value, json!({"Ref": table_id}));
        let names: Vec<&String> = t.outputs.keys().collect();
        assert_eq!(names, vec!["ArtifactsBucketName", "AppTableName"]);
    }

    #[test]
    fn test_cf010_bucket_and_table_properties() {
        let t = lab_template();
        let bucket = &t.resources[t.resources_of_type("AWS::S3::Bucket")[0]];
        assert_eq!(bucket.properties["VersioningConfiguration"]["Status"], "Enabled");
        let table = &t.resources[t.resources_of_type("AWS::DynamoDB::Table")[0]];
        assert_eq!(table.properties["BillingMode"], "PAY_PER_REQUEST");
        assert_eq!(table.properties["KeySchema"][0]["AttributeName"], "pk");
        assert_eq!(table.properties["AttributeDefinitions"][0]["AttributeType"], "S");
    }

    #[test]
    fn test_cf010_auto_delete_support_present() {
        let t = lab_template();
        assert_eq!(t.resources_of_type(auto_delete::CUSTOM_RESOURCE_TYPE).len(), 1);
        assert_eq!(t.resources_of_type("AWS::Lambda::Function").len(), 1);
        assert_eq!(t.resources_of_type("AWS::IAM::Role").len(), 1);
        assert_eq!(t.resources.len(), 5);
    }

    #[test]
    fn test_cf010_logical_ids_independent_of_stack_id() {
        let a = synthesize(&infra_stack("StackA", &StackOptions::default())).unwrap();
        let b = synthesize(&infra_stack("StackB", &StackOptions::default())).unwrap();
        let ids_a: Vec<&String> = a.resources.keys().collect();
        let ids_b: Vec<&String> = b.resources.keys().collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_cf010_metadata_path() {
        let t = lab_template();
        let table = &t.resources[t.resources_of_type("AWS::DynamoDB::Table")[0]];
        assert_eq!(
            table.metadata,
            Some(json!({"aws:cdk:path": "InfraStack/AppTable/Resource"}))
        );
    }

    #[test]
    fn test_cf010_description_carried() {
        let options = StackOptions {
            description: Some("lab stack".to_string()),
            env: None,
        };
        let t = synthesize(&infra_stack("InfraStack", &options)).unwrap();
        assert_eq!(t.description.as_deref(), Some("lab stack"));
        assert!(to_json(&t).unwrap().contains("\"Description\": \"lab stack\""));
    }

    #[test]
    fn test_cf010_invalid_graph_rejected() {
        let mut graph = infra_stack("InfraStack", &StackOptions::default());
        graph.resources[0].removal_policy = RemovalPolicy::Retain;
        let err = synthesize(&graph).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_cf010_support_id_collision_rejected() {
        let mut graph = infra_stack("InfraStack", &StackOptions::default());
        graph.resources[1].id = "ArtifactsBucketAutoDeleteObjectsRole".to_string();
        graph.outputs[1].resource = graph.resources[1].id.clone();
        let err = synthesize(&graph).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err}");
    }

    #[test]
    fn test_cf010_insert_unique_refuses_overwrite() {
        let t = lab_template();
        let (id, resource) = t.resources.first().map(|(k, v)| (k.clone(), v.clone())).unwrap();
        let mut resources = t.resources.clone();
        let err = insert_unique(&mut resources, id.clone(), resource).unwrap_err();
        assert!(err.to_string().contains(&id));
        assert_eq!(resources.len(), t.resources.len());
    }

    proptest::proptest! {
        #[test]
        fn prop_cf010_any_stack_id_synthesizes_deterministically(
            stack_id in "[A-Za-z][A-Za-z0-9-]{0,40}",
            description in proptest::option::of("[ -~]{0,60}"),
        ) {
            let options = StackOptions { description, env: None };
            let a = to_json(&synthesize(&infra_stack(&stack_id, &options)).unwrap()).unwrap();
            let b = to_json(&synthesize(&infra_stack(&stack_id, &options)).unwrap()).unwrap();
            proptest::prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn test_cf010_to_json_trailing_newline() {
        let text = to_json(&lab_template()).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.starts_with("{\n  \"AWSTemplateFormatVersion\": \"2010-09-09\""));
    }
}

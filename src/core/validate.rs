//! CF-009: Resource graph validation.
//!
//! Checks structural constraints before synthesis:
//! - Stack id must be a valid stack name
//! - Resource and output ids must be unique
//! - Outputs must reference declared resources
//! - All resources share one removal policy and one project tag value
//! - Table keys and capacities must be usable
//! - Generated logical ids must not collide, including the ids of auto-delete
//!   support resources

use super::config::{is_valid_stack_id, ValidationError};
use super::hasher::logical_id;
use super::stack::PROJECT_TAG_KEY;
use super::types::*;
use crate::resources::auto_delete::support_logical_ids;
use std::collections::HashSet;

/// Validate a resource graph. Returns a list of errors (empty = valid).
pub fn validate_graph(graph: &ResourceGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_stack_id(&graph.stack_id) {
        errors.push(ValidationError {
            message: format!("stack id '{}' is not a valid stack name", graph.stack_id),
        });
    }

    let mut seen = HashSet::new();
    let mut logical_ids = HashSet::new();
    for resource in &graph.resources {
        if resource.id.is_empty() {
            errors.push(ValidationError {
                message: "resource id must not be empty".to_string(),
            });
            continue;
        }
        if !seen.insert(resource.id.as_str()) {
            errors.push(ValidationError {
                message: format!("duplicate resource id '{}'", resource.id),
            });
        } else if !logical_ids.insert(logical_id(&resource.id, "Resource")) {
            errors.push(ValidationError {
                message: format!("resource '{}' collides with another logical id", resource.id),
            });
        }

        if let ResourceKind::Table(spec) = &resource.kind {
            if spec.partition_key.name.is_empty() {
                errors.push(ValidationError {
                    message: format!("resource '{}' (table) has an empty partition key", resource.id),
                });
            }
            if let Some(sort_key) = &spec.sort_key {
                if sort_key.name == spec.partition_key.name {
                    errors.push(ValidationError {
                        message: format!(
                            "resource '{}' (table) uses '{}' as both partition and sort key",
                            resource.id, sort_key.name
                        ),
                    });
                }
            }
            if let BillingMode::Provisioned {
                read_capacity,
                write_capacity,
            } = spec.billing_mode
            {
                if read_capacity == 0 || write_capacity == 0 {
                    errors.push(ValidationError {
                        message: format!(
                            "resource '{}' (table) needs non-zero provisioned capacity",
                            resource.id
                        ),
                    });
                }
            }
        }
    }

    for resource in &graph.resources {
        let ResourceKind::Bucket(spec) = &resource.kind else {
            continue;
        };
        if !spec.auto_delete_objects || resource.id.is_empty() {
            continue;
        }
        for id in support_logical_ids(&resource.id) {
            if !logical_ids.insert(id.clone()) {
                errors.push(ValidationError {
                    message: format!(
                        "auto-delete support for '{}' collides with logical id '{}'",
                        resource.id, id
                    ),
                });
            }
        }
    }

    if let Some(first) = graph.resources.first() {
        for resource in &graph.resources[1..] {
            if resource.removal_policy != first.removal_policy {
                errors.push(ValidationError {
                    message: format!(
                        "resource '{}' has removal policy {} but '{}' has {}",
                        resource.id, resource.removal_policy, first.id, first.removal_policy
                    ),
                });
            }
            if resource.tags.get(PROJECT_TAG_KEY) != first.tags.get(PROJECT_TAG_KEY) {
                errors.push(ValidationError {
                    message: format!(
                        "resource '{}' has {} tag {:?} but '{}' has {:?}",
                        resource.id,
                        PROJECT_TAG_KEY,
                        resource.tags.get(PROJECT_TAG_KEY),
                        first.id,
                        first.tags.get(PROJECT_TAG_KEY)
                    ),
                });
            }
        }
    }

    let mut outputs = HashSet::new();
    for output in &graph.outputs {
        if !outputs.insert(output.id.as_str()) {
            errors.push(ValidationError {
                message: format!("duplicate output id '{}'", output.id),
            });
        }
        if graph.resource(&output.resource).is_none() {
            errors.push(ValidationError {
                message: format!(
                    "output '{}' references unknown resource '{}'",
                    output.id, output.resource
                ),
            });
        }
    }

    errors
}

//! CF-008: Auto-delete support for buckets.
//!
//! CloudFormation refuses to delete a non-empty bucket. A bucket declared with
//! `auto_delete_objects` gets three extra template resources:
//!
//! 1. an IAM role allowed to list and delete the bucket's object versions
//! 2. an inline Lambda handler that empties the bucket on a `Delete` request
//! 3. a `Custom::S3AutoDeleteObjects` resource binding the handler to the bucket
//!
//! Deletion runs in reverse dependency order, so the custom resource (and the
//! emptying) happens before the bucket itself is removed.

use super::{get_att, path_metadata, reference};
use crate::core::hasher::logical_id;
use crate::core::types::{CfnResource, RemovalPolicy};
use serde_json::json;

/// Tag marking a bucket whose objects are deleted with the stack.
pub const AUTO_DELETE_TAG: &str = "aws-cdk:auto-delete-objects";

/// Custom resource type of the binding resource.
pub const CUSTOM_RESOURCE_TYPE: &str = "Custom::S3AutoDeleteObjects";

const HANDLER_RUNTIME: &str = "python3.12";

const HANDLER_SOURCE: &str = r#"import boto3
import cfnresponse
from botocore.exceptions import ClientError


def handler(event, context):
    try:
        if event["RequestType"] == "Delete":
            name = event["ResourceProperties"]["BucketName"]
            boto3.resource("s3").Bucket(name).object_versions.delete()
        cfnresponse.send(event, context, cfnresponse.SUCCESS, {})
    except ClientError as exc:
        if exc.response.get("Error", {}).get("Code") == "NoSuchBucket":
            cfnresponse.send(event, context, cfnresponse.SUCCESS, {})
        else:
            cfnresponse.send(event, context, cfnresponse.FAILED, {"Error": str(exc)})
    except Exception as exc:
        cfnresponse.send(event, context, cfnresponse.FAILED, {"Error": str(exc)})
"#;

fn construct_ids(bucket_id: &str) -> [String; 3] {
    [
        format!("{bucket_id}AutoDeleteObjectsRole"),
        format!("{bucket_id}AutoDeleteObjectsHandler"),
        format!("{bucket_id}AutoDeleteObjects"),
    ]
}

/// Logical ids of the role, handler and custom resource added for `bucket_id`.
pub fn support_logical_ids(bucket_id: &str) -> [String; 3] {
    let [role, handler, custom] = construct_ids(bucket_id);
    [
        logical_id(&role, "Resource"),
        logical_id(&handler, "Resource"),
        logical_id(&custom, "Default"),
    ]
}

/// Render the support resources for one bucket, keyed by logical id.
pub fn support_resources(
    stack_id: &str,
    bucket_id: &str,
    bucket_logical_id: &str,
) -> Vec<(String, CfnResource)> {
    let [role_construct, handler_construct, custom_construct] = construct_ids(bucket_id);
    let [role_id, handler_id, custom_id] = support_logical_ids(bucket_id);

    let bucket_arn = get_att(bucket_logical_id, "Arn");

    let role = CfnResource {
        resource_type: "AWS::IAM::Role".to_string(),
        properties: json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole"
                }]
            },
            "ManagedPolicyArns": [{
                "Fn::Sub": "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            }],
            "Policies": [{
                "PolicyName": "AutoDeleteObjects",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": ["s3:GetBucket*", "s3:List*", "s3:DeleteObject*"],
                        "Resource": [
                            bucket_arn,
                            { "Fn::Join": ["", [bucket_arn, "/*"]] }
                        ]
                    }]
                }
            }]
        }),
        depends_on: vec![],
        update_replace_policy: None,
        deletion_policy: None,
        metadata: Some(path_metadata(stack_id, &role_construct, "Resource")),
    };

    let handler = CfnResource {
        resource_type: "AWS::Lambda::Function".to_string(),
        properties: json!({
            "Code": { "ZipFile": HANDLER_SOURCE },
            "Description": format!("Deletes all object versions in {bucket_id} when the stack is deleted"),
            "Handler": "index.handler",
            "MemorySize": 128,
            "Role": get_att(&role_id, "Arn"),
            "Runtime": HANDLER_RUNTIME,
            "Timeout": 900
        }),
        depends_on: vec![role_id.clone()],
        update_replace_policy: None,
        deletion_policy: None,
        metadata: Some(path_metadata(stack_id, &handler_construct, "Resource")),
    };

    let custom = CfnResource {
        resource_type: CUSTOM_RESOURCE_TYPE.to_string(),
        properties: json!({
            "ServiceToken": get_att(&handler_id, "Arn"),
            "BucketName": reference(bucket_logical_id)
        }),
        depends_on: vec![],
        update_replace_policy: Some(RemovalPolicy::Destroy.cfn_value().to_string()),
        deletion_policy: Some(RemovalPolicy::Destroy.cfn_value().to_string()),
        metadata: Some(path_metadata(stack_id, &custom_construct, "Default")),
    };

    vec![(role_id, role), (handler_id, handler), (custom_id, custom)]
}

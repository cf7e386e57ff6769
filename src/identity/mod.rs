//! Identity reporting: who do the configured credentials belong to.
//!
//! The identity service sits behind [`IdentityService`] so the report can be
//! driven by STS in production and by a fixed identity in tests. Ambient
//! configuration (the default region) is passed in as a [`SessionContext`]
//! instead of being looked up from the environment here.

pub mod report;
pub mod sts;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Account and principal behind the current credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub account_id: String,
    pub principal_arn: String,
    pub user_id: String,
}

/// Source of the caller identity.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Ask the service who the caller is.
    async fn caller_identity(&self) -> Result<CallerIdentity>;
}

/// Session settings resolved from ambient AWS configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// Default region, if one is configured
    pub region: Option<String>,
}

impl SessionContext {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    /// Read the region resolved by the standard provider chain.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self {
            region: config.region().map(ToString::to_string),
        }
    }
}

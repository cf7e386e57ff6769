//! CF-002: Project configuration (`cflab.yaml`) parsing and validation.
//!
//! Every field except `version` is optional. A missing file is not an error;
//! the stack is then synthesized with [`LabConfig::default`].

use super::types::{Environment, StackOptions};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Stack id used when none is configured.
pub const DEFAULT_STACK_ID: &str = "InfraStack";

/// Assembly directory used when none is configured.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    #[serde(default = "default_stack_id")]
    pub stack_id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub env: Option<Environment>,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_stack_id() -> String {
    DEFAULT_STACK_ID.to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            stack_id: default_stack_id(),
            description: None,
            env: None,
            out_dir: default_out_dir(),
        }
    }
}

impl LabConfig {
    /// Options handed to the stack definition.
    pub fn stack_options(&self) -> StackOptions {
        StackOptions {
            description: self.description.clone(),
            env: self.env.clone(),
        }
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn stack_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("valid stack id regex"))
}

fn account_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{12}$").expect("valid account regex"))
}

fn region_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("valid region regex"))
}

/// Whether `id` is usable as a CloudFormation stack name.
pub fn is_valid_stack_id(id: &str) -> bool {
    stack_id_re().is_match(id)
}

/// Parse a config file from disk. Returns defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<LabConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(LabConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml_ng::from_str(&content)
        .map_err(|e| Error::config(format!("{}: YAML parse error: {e}", path.display())))
}

/// Parse a config from a YAML string.
pub fn parse_config(yaml: &str) -> Result<LabConfig> {
    serde_yaml_ng::from_str(yaml).map_err(|e| Error::config(format!("YAML parse error: {e}")))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &LabConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if !is_valid_stack_id(&config.stack_id) {
        errors.push(ValidationError {
            message: format!(
                "stack_id '{}' must start with a letter and contain only letters, digits and hyphens (max 128)",
                config.stack_id
            ),
        });
    }

    if let Some(env) = &config.env {
        if let Some(account) = &env.account {
            if !account_re().is_match(account) {
                errors.push(ValidationError {
                    message: format!("env.account '{}' must be 12 digits", account),
                });
            }
        }
        if let Some(region) = &env.region {
            if !region_re().is_match(region) {
                errors.push(ValidationError {
                    message: format!("env.region '{}' is not a region name", region),
                });
            }
        }
    }

    errors
}

/// Starter config written by `cflab init`.
pub const STARTER_CONFIG: &str = r#"version: "1.0"
stack_id: InfraStack
description: "Cloud foundation lab: artifacts bucket and app table"

# Pin the deployment environment, or leave unset to resolve at deploy time.
# env:
#   account: "123456789012"
#   region: us-east-1

out_dir: cdk.out
"#;

//! cflab: cloud foundation lab.
//!
//! Reports the caller identity behind the configured AWS credentials, and
//! synthesizes a small declarative stack (artifacts bucket + app table) into
//! a CloudFormation template for an external engine to deploy.

pub mod cli;
pub mod core;
pub mod error;
pub mod identity;
pub mod logging;
pub mod resources;

pub use error::{Error, Result};

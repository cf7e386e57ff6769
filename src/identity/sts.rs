//! CF-013: STS-backed identity service (GetCallerIdentity).

use super::{CallerIdentity, IdentityService};
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_sts::config::{Builder as StsConfigBuilder, Region};
use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_sts::Client as StsClient;

/// Region the client signs for when none is configured. STS in the `aws`
/// partition answers from us-east-1 regardless of the caller's region.
pub const FALLBACK_STS_REGION: &str = "us-east-1";

/// STS error codes that mean the credentials themselves were rejected.
const AUTH_ERROR_CODES: &[&str] = &[
    "InvalidClientTokenId",
    "ExpiredToken",
    "ExpiredTokenException",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
    "AccessDenied",
];

/// Whether an STS error code is a credential rejection.
pub fn is_auth_error_code(code: &str) -> bool {
    AUTH_ERROR_CODES.contains(&code)
}

/// Identity service calling AWS STS.
#[derive(Debug, Clone)]
pub struct StsIdentityService {
    client: StsClient,
    credentials: Option<SharedCredentialsProvider>,
}

impl StsIdentityService {
    /// Build from a loaded SDK configuration.
    ///
    /// Without a configured region the client still resolves an endpoint by
    /// falling back to [`FALLBACK_STS_REGION`]. The session context keeps
    /// reporting the region as unset.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        let mut builder = StsConfigBuilder::from(config);
        if config.region().is_none() {
            tracing::debug!(region = FALLBACK_STS_REGION, "no region configured, using STS fallback");
            builder = builder.region(Region::new(FALLBACK_STS_REGION));
        }
        Self {
            client: StsClient::from_conf(builder.build()),
            credentials: config.credentials_provider(),
        }
    }

    /// Fail fast with an authentication error when no usable credentials exist.
    async fn ensure_credentials(&self) -> Result<()> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or_else(|| Error::authentication("no AWS credentials are configured"))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| Error::authentication(format!("unable to load credentials: {}", DisplayErrorContext(&e))))?;
        Ok(())
    }
}

#[async_trait]
impl IdentityService for StsIdentityService {
    async fn caller_identity(&self) -> Result<CallerIdentity> {
        self.ensure_credentials().await?;

        tracing::debug!("calling sts:GetCallerIdentity");
        let out = self.client.get_caller_identity().send().await.map_err(|e| {
            let code = e.as_service_error().and_then(ProvideErrorMetadata::code);
            let msg = format!("STS GetCallerIdentity failed: {}", DisplayErrorContext(&e));
            match code {
                Some(code) if is_auth_error_code(code) => Error::Authentication(msg),
                _ => Error::Identity(msg),
            }
        })?;

        let field = |value: Option<&str>, name: &str| {
            value
                .map(ToString::to_string)
                .ok_or_else(|| Error::identity(format!("STS GetCallerIdentity missing {name}")))
        };

        Ok(CallerIdentity {
            account_id: field(out.account(), "Account")?,
            principal_arn: field(out.arn(), "Arn")?,
            user_id: field(out.user_id(), "UserId")?,
        })
    }
}

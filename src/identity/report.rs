//! CF-014: Identity report rendering.

use super::{CallerIdentity, IdentityService, SessionContext};
use crate::error::Result;
use std::io::Write;

/// Marker printed when no default region is configured.
pub const REGION_NOT_SET: &str = "(not set)";

/// Render the report. An absent or empty region renders as `(not set)`.
pub fn render_report(identity: &CallerIdentity, region: Option<&str>) -> String {
    let region = region.filter(|r| !r.is_empty()).unwrap_or(REGION_NOT_SET);
    format!(
        "✅ AWS identity\n  Account: {}\n  Arn: {}\n  UserId: {}\n✅ Default region: {}\n",
        identity.account_id, identity.principal_arn, identity.user_id, region
    )
}

/// Fetch the caller identity and write the report to `out`.
pub async fn report<W: Write>(
    service: &dyn IdentityService,
    session: &SessionContext,
    out: &mut W,
) -> Result<()> {
    let identity = service.caller_identity().await?;
    tracing::debug!(account = %identity.account_id, "resolved caller identity");
    out.write_all(render_report(&identity, session.region.as_deref()).as_bytes())?;
    out.flush()?;
    Ok(())
}

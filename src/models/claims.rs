//! Claims carried by a bearer token.

use serde::{Deserialize, Serialize};

/// Payload of a signed bearer token.
///
/// Tokens are minted offline (see `--issue-token`); the serving process only
/// ever verifies them. The decoded claims are attached to the request and
/// echoed back as the `uploadedBy` field of upload responses.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    /// Identity label of the caller.
    pub sub: String,

    /// Role string, informational only (no role-based checks are applied).
    pub role: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

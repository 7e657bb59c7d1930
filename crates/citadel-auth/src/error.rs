//! Error types for session authentication.

use citadel_core::CitadelError;
use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refusal {
    /// Signature does not verify against the secret.
    BadSignature,
    /// Not a JWT, or claims do not deserialize.
    Malformed,
    /// Issuer claim differs from the configured issuer.
    IssuerMismatch,
    /// `XSRF-TOKEN` header missing.
    XsrfMissing,
    /// `XSRF-TOKEN` header differs from the token nonce.
    XsrfMismatch,
}

impl Refusal {
    /// Short label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadSignature => "bad_signature",
            Self::Malformed => "malformed",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::XsrfMissing => "xsrf_missing",
            Self::XsrfMismatch => "xsrf_mismatch",
        }
    }
}

impl std::fmt::Display for Refusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the authenticator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No `jwt` cookie on the request.
    #[error("no session cookie")]
    Missing,

    /// Token present but not acceptable.
    #[error("session refused: {0}")]
    Refused(Refusal),

    /// Token expired.
    #[error("session expired")]
    Expired,

    /// Subject holds none of the required roles.
    #[error("subject {subject} lacks roles {required:?}")]
    Denied {
        /// The authenticated subject.
        subject: String,
        /// Roles that would have granted access.
        required: Vec<String>,
    },

    /// Configured secret is unusable.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Label for the `reason` metric dimension.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Refused(refusal) => refusal.as_str(),
            Self::Expired => "expired",
            Self::Denied { .. } => "denied",
            Self::InvalidSecret(_) => "invalid_secret",
            Self::Signing(_) => "signing",
        }
    }
}

impl From<AuthError> for CitadelError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Missing => Self::AuthenticationMissing,
            AuthError::Expired => Self::AuthenticationExpired,
            AuthError::Refused(refusal) => Self::refused(refusal.as_str()),
            AuthError::Denied { required, .. } => Self::denied(required),
            other @ (AuthError::InvalidSecret(_) | AuthError::Signing(_)) => {
                Self::unexpected(other)
            }
        }
    }
}

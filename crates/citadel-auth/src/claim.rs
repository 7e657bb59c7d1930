//! Session claims carried inside the signed token.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims of a session token.
///
/// Timestamps are epoch milliseconds. `id` is a random nonce that doubles as
/// the anti-forgery token and survives refreshes.
///
/// ```
/// use citadel_auth::SessionClaim;
///
/// let claim = SessionClaim {
///     id: "n1".into(),
///     issuer: "citadel".into(),
///     subject: "alice".into(),
///     issued_at: 1_000,
///     expiration: Some(61_000),
/// };
/// let json = serde_json::to_value(&claim).unwrap();
/// assert_eq!(json["issuedAt"], 1_000);
/// assert_eq!(json["expiration"], 61_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaim {
    /// Nonce, also sent in clear in the `xsrfToken` cookie.
    pub id: String,
    /// Issuer, checked against the authenticator's configured issuer.
    pub issuer: String,
    /// Authenticated subject.
    pub subject: String,
    /// Issue time.
    pub issued_at: i64,
    /// Expiry time; `None` means the session never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

impl SessionClaim {
    /// Builds a claim issued at `now` that lives for `ttl`.
    #[must_use]
    pub fn issue(
        id: impl Into<String>,
        issuer: impl Into<String>,
        subject: impl Into<String>,
        now: i64,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            id: id.into(),
            issuer: issuer.into(),
            subject: subject.into(),
            issued_at: now,
            expiration: ttl.map(|ttl| now.saturating_add(ttl.as_millis() as i64)),
        }
    }

    /// True once `now` reaches the expiration.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration.is_some_and(|expiration| now >= expiration)
    }

    /// Original lifetime of the token, `expiration - issued_at`.
    #[must_use]
    pub fn lifetime(&self) -> Option<Duration> {
        self.expiration.map(|expiration| {
            Duration::from_millis(expiration.saturating_sub(self.issued_at).max(0) as u64)
        })
    }

    /// Re-issues the claim at `now` with the same lifetime and nonce.
    #[must_use]
    pub fn refreshed(&self, now: i64) -> Self {
        Self::issue(
            self.id.clone(),
            self.issuer.clone(),
            self.subject.clone(),
            now,
            self.lifetime(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(ttl: Option<Duration>) -> SessionClaim {
        SessionClaim::issue("nonce", "citadel", "alice", 10_000, ttl)
    }

    #[test]
    fn test_issue_computes_expiration() {
        let claim = claim(Some(Duration::from_secs(60)));
        assert_eq!(claim.expiration, Some(70_000));
        assert_eq!(claim.lifetime(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_expiry_boundary() {
        let claim = claim(Some(Duration::from_secs(60)));
        assert!(!claim.is_expired(69_999));
        assert!(claim.is_expired(70_000));
    }

    #[test]
    fn test_no_expiration_never_expires() {
        let claim = claim(None);
        assert!(!claim.is_expired(i64::MAX));
        assert_eq!(claim.lifetime(), None);
    }

    #[test]
    fn test_refresh_slides_window_and_keeps_nonce() {
        let refreshed = claim(Some(Duration::from_secs(60))).refreshed(40_000);
        assert_eq!(refreshed.id, "nonce");
        assert_eq!(refreshed.issued_at, 40_000);
        assert_eq!(refreshed.expiration, Some(100_000));
    }

    #[test]
    fn test_serialized_claim_names() {
        let json = serde_json::to_value(claim(None)).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["id", "issuedAt", "issuer", "subject"]);
    }

    #[test]
    fn test_missing_expiration_deserializes() {
        let claim: SessionClaim = serde_json::from_str(
            r#"{"id":"n","issuer":"citadel","subject":"bob","issuedAt":5}"#,
        )
        .unwrap();
        assert_eq!(claim.expiration, None);
    }
}

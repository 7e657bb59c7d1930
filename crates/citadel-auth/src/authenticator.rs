//! Cookie-based token authenticator.
//!
//! A session is a signed [`SessionClaim`] stored in the HttpOnly `jwt`
//! cookie. Its nonce is also sent in clear in the `xsrfToken` cookie; the
//! client echoes it in the `XSRF-TOKEN` header, which must match the nonce
//! inside the token (double-submit). Every accepted request re-issues the
//! token with its original lifetime counted from now.

use crate::claim::SessionClaim;
use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, AuthResult, Refusal};
use crate::roles::{admits, RoleFinder};
use crate::signer::TokenSigner;
use citadel_core::{CitadelError, RequestContext, SameSite, SetCookie};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Cookie holding the signed token.
pub const JWT_COOKIE: &str = "jwt";
/// Cookie holding the anti-forgery nonce in clear.
pub const XSRF_COOKIE: &str = "xsrfToken";
/// Header the client echoes the nonce in.
pub const XSRF_HEADER: &str = "XSRF-TOKEN";

/// Authenticator settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Issuer written into and required from every token.
    pub issuer: String,
    /// Require the `XSRF-TOKEN` header on authenticated calls.
    pub xsrf_protection: bool,
    /// Mark both cookies `Secure`.
    pub secure_cookies: bool,
    /// `SameSite` attribute for both cookies.
    pub same_site: SameSite,
    /// `Max-Age` of the `xsrfToken` cookie.
    pub xsrf_cookie_ttl: Duration,
    /// Lifetime used by [`TokenAuthenticator::connect_session`].
    pub session_ttl: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "citadel".to_string(),
            xsrf_protection: true,
            secure_cookies: true,
            same_site: SameSite::Lax,
            xsrf_cookie_ttl: Duration::from_secs(30 * 60),
            session_ttl: Some(Duration::from_secs(60 * 60)),
        }
    }
}

/// Issues, checks and refreshes session tokens.
///
/// # Example
///
/// ```
/// use citadel_auth::{AuthConfig, TokenAuthenticator};
/// use citadel_core::RequestContext;
/// use std::time::Duration;
///
/// let auth = TokenAuthenticator::builder()
///     .config(AuthConfig { xsrf_protection: false, ..AuthConfig::default() })
///     .secret(b"0123456789abcdef0123456789abcdef".to_vec())
///     .build()
///     .unwrap();
///
/// let login = RequestContext::mock();
/// let claim = auth.connect(&login, "alice", Some(Duration::from_secs(60))).unwrap();
/// assert_eq!(claim.subject, "alice");
///
/// let cookies = login.take_cookies();
/// let mut next = RequestContext::mock();
/// for cookie in &cookies {
///     next = next.with_cookie(cookie.name(), cookie.value());
/// }
/// assert_eq!(auth.verify(&next).unwrap().subject, "alice");
/// ```
pub struct TokenAuthenticator {
    config: AuthConfig,
    signer: TokenSigner,
    clock: Arc<dyn Clock>,
    roles: Arc<dyn RoleFinder>,
}

impl TokenAuthenticator {
    /// Starts building an authenticator.
    #[must_use]
    pub fn builder() -> TokenAuthenticatorBuilder {
        TokenAuthenticatorBuilder::default()
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Opens a session for `subject` and queues both cookies on `ctx`.
    ///
    /// `ttl` of `None` issues a token that never expires.
    pub fn connect(
        &self,
        ctx: &RequestContext,
        subject: impl Into<String>,
        ttl: Option<Duration>,
    ) -> AuthResult<SessionClaim> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let claim = SessionClaim::issue(
            nonce,
            self.config.issuer.clone(),
            subject,
            self.clock.now_millis(),
            ttl,
        );
        self.issue(ctx, &claim)?;
        tracing::info!(
            request_id = %ctx.request_id(),
            subject = %claim.subject,
            expiration = ?claim.expiration,
            "session opened"
        );
        Ok(claim)
    }

    /// Opens a session using the configured default lifetime.
    pub fn connect_session(
        &self,
        ctx: &RequestContext,
        subject: impl Into<String>,
    ) -> AuthResult<SessionClaim> {
        self.connect(ctx, subject, self.config.session_ttl)
    }

    /// Clears both session cookies.
    pub fn disconnect(&self, ctx: &RequestContext) {
        ctx.set_cookie(
            self.attributes(SetCookie::remove(JWT_COOKIE))
                .http_only(true),
        );
        ctx.set_cookie(self.attributes(SetCookie::remove(XSRF_COOKIE)));
        tracing::info!(request_id = %ctx.request_id(), "session closed");
    }

    /// Checks the session on `ctx` without refreshing it.
    pub fn verify(&self, ctx: &RequestContext) -> AuthResult<SessionClaim> {
        self.check(ctx).map_err(|err| {
            tracing::warn!(
                request_id = %ctx.request_id(),
                reason = err.reason(),
                "session rejected"
            );
            err
        })
    }

    /// Checks and refreshes the session, then runs `f` with the subject.
    pub async fn if_connected<F, Fut, T>(
        &self,
        ctx: &RequestContext,
        f: F,
    ) -> Result<T, CitadelError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CitadelError>>,
    {
        let claim = self.authenticate(ctx)?;
        f(claim.subject).await
    }

    /// Like [`if_connected`](Self::if_connected), but the subject must also
    /// hold one of `required` (an empty list admits any subject).
    pub async fn if_authorized<F, Fut, T>(
        &self,
        ctx: &RequestContext,
        required: &[&str],
        f: F,
    ) -> Result<T, CitadelError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CitadelError>>,
    {
        let claim = self.authenticate(ctx)?;
        self.authorize(&claim.subject, required)?;
        f(claim.subject).await
    }

    /// Checks `required` against the roles of `subject`.
    pub fn authorize(&self, subject: &str, required: &[&str]) -> AuthResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        let held = self.roles.roles(subject);
        if admits(required, &held) {
            Ok(())
        } else {
            tracing::warn!(subject, ?required, ?held, "authorization denied");
            Err(AuthError::Denied {
                subject: subject.to_string(),
                required: required.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Checks the session and re-issues it from now with the same lifetime.
    pub fn authenticate(&self, ctx: &RequestContext) -> AuthResult<SessionClaim> {
        let claim = self.verify(ctx)?;
        let refreshed = claim.refreshed(self.clock.now_millis());
        self.issue(ctx, &refreshed)?;
        tracing::debug!(
            request_id = %ctx.request_id(),
            subject = %refreshed.subject,
            "session refreshed"
        );
        Ok(refreshed)
    }

    fn check(&self, ctx: &RequestContext) -> AuthResult<SessionClaim> {
        let token = ctx.cookies().get(JWT_COOKIE).ok_or(AuthError::Missing)?;
        let claim = self.signer.verify(token)?;

        if claim.issuer != self.config.issuer {
            return Err(AuthError::Refused(Refusal::IssuerMismatch));
        }
        if claim.is_expired(self.clock.now_millis()) {
            return Err(AuthError::Expired);
        }
        if self.config.xsrf_protection {
            match ctx.header(XSRF_HEADER) {
                None => return Err(AuthError::Refused(Refusal::XsrfMissing)),
                Some(echoed) if echoed != claim.id => {
                    return Err(AuthError::Refused(Refusal::XsrfMismatch));
                }
                Some(_) => {}
            }
        }
        Ok(claim)
    }

    fn issue(&self, ctx: &RequestContext, claim: &SessionClaim) -> AuthResult<()> {
        let token = self.signer.sign(claim)?;

        let mut jwt = self.attributes(SetCookie::new(JWT_COOKIE, token)).http_only(true);
        if let Some(lifetime) = claim.lifetime() {
            jwt = jwt.max_age(lifetime);
        }
        ctx.set_cookie(jwt);

        ctx.set_cookie(
            self.attributes(SetCookie::new(XSRF_COOKIE, claim.id.clone()))
                .max_age(self.config.xsrf_cookie_ttl),
        );
        Ok(())
    }

    fn attributes(&self, cookie: SetCookie) -> SetCookie {
        cookie
            .path("/")
            .secure(self.config.secure_cookies)
            .same_site(self.config.same_site)
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

enum Secret {
    Raw(Vec<u8>),
    Base64(String),
}

/// Builder for [`TokenAuthenticator`].
#[derive(Default)]
pub struct TokenAuthenticatorBuilder {
    config: AuthConfig,
    secret: Option<Secret>,
    clock: Option<Arc<dyn Clock>>,
    roles: Option<Arc<dyn RoleFinder>>,
}

impl TokenAuthenticatorBuilder {
    /// Sets the authenticator settings.
    #[must_use]
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a raw signing secret (at least 32 bytes).
    #[must_use]
    pub fn secret(mut self, secret: Vec<u8>) -> Self {
        self.secret = Some(Secret::Raw(secret));
        self
    }

    /// Uses a base64-encoded signing secret.
    #[must_use]
    pub fn secret_base64(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(Secret::Base64(secret.into()));
        self
    }

    /// Sets the time source.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets the role finder used by `if_authorized`.
    #[must_use]
    pub fn role_finder(mut self, roles: impl RoleFinder) -> Self {
        self.roles = Some(Arc::new(roles));
        self
    }

    /// Builds the authenticator.
    ///
    /// Without a secret a random one is generated; tokens then do not survive
    /// a restart and cannot be shared between instances.
    pub fn build(self) -> AuthResult<TokenAuthenticator> {
        let signer = match self.secret {
            Some(Secret::Raw(bytes)) => TokenSigner::from_secret(&bytes)?,
            Some(Secret::Base64(encoded)) => TokenSigner::from_base64(&encoded)?,
            None => {
                tracing::warn!(
                    "no session secret configured, generated a per-process secret; \
                     sessions will not survive a restart"
                );
                TokenSigner::generate()
            }
        };

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let roles: Arc<dyn RoleFinder> = match self.roles {
            Some(roles) => roles,
            None => Arc::new(|_: &str| Vec::<String>::new()),
        };

        Ok(TokenAuthenticator {
            config: self.config,
            signer,
            clock,
            roles,
        })
    }
}

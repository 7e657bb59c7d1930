//! # Citadel Auth
//!
//! Stateless session authentication for Citadel handlers.
//!
//! [`TokenAuthenticator::connect`] signs a [`SessionClaim`] into the `jwt`
//! cookie and mirrors its nonce into the `xsrfToken` cookie. Protected
//! handlers wrap their body in [`TokenAuthenticator::if_connected`] or
//! [`TokenAuthenticator::if_authorized`], which verify the token, require the
//! `XSRF-TOKEN` header to echo the nonce, slide the expiry forward and hand
//! the subject to the closure.
//!
//! ```
//! use citadel_auth::{ManualClock, TokenAuthenticator, XSRF_COOKIE, XSRF_HEADER};
//! use citadel_core::RequestContext;
//! use std::time::Duration;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let auth = TokenAuthenticator::builder()
//!     .secret(b"0123456789abcdef0123456789abcdef".to_vec())
//!     .clock(ManualClock::at(0))
//!     .build()
//!     .unwrap();
//!
//! let login = RequestContext::mock();
//! auth.connect(&login, "alice", Some(Duration::from_secs(3600))).unwrap();
//!
//! let mut next = RequestContext::mock();
//! for cookie in login.take_cookies() {
//!     if cookie.name() == XSRF_COOKIE {
//!         next = next.with_header(XSRF_HEADER, cookie.value());
//!     }
//!     next = next.with_cookie(cookie.name(), cookie.value());
//! }
//!
//! let greeting = auth
//!     .if_connected(&next, |subject| async move { Ok(format!("hello {subject}")) })
//!     .await
//!     .unwrap();
//! assert_eq!(greeting, "hello alice");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/citadel-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authenticator;
mod claim;
mod clock;
mod error;
mod roles;
mod signer;

pub use authenticator::{
    AuthConfig, TokenAuthenticator, TokenAuthenticatorBuilder, JWT_COOKIE, XSRF_COOKIE,
    XSRF_HEADER,
};
pub use claim::SessionClaim;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, AuthResult, Refusal};
pub use roles::RoleFinder;
pub use signer::{TokenSigner, MIN_SECRET_LEN};

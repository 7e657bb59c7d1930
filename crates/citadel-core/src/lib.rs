//! # Citadel Core
//!
//! Core types shared by the Citadel crates:
//!
//! - [`RequestContext`] - Per-request context with cookies and the outgoing cookie queue
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Cookies`] / [`SetCookie`] - Request cookie jar and `Set-Cookie` builder
//! - [`CitadelError`] - Standard error taxonomy and response envelope

#![doc(html_root_url = "https://docs.rs/citadel-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod cookie;
mod error;

pub use context::{RequestContext, RequestId};
pub use cookie::{Cookies, SameSite, SetCookie};
pub use error::{
    CitadelError, CitadelResult, ErrorDetail, ErrorEnvelope, ErrorKind, INTERNAL_ERROR_MESSAGE,
};

//! Segment trie router for Citadel.
//!
//! Maps an HTTP method and a request path to a [`Route`] and extracts the
//! path parameters along the way.
//!
//! # Features
//!
//! - **One trie per method**: `GET /games/:id` and `DELETE /games/:id` never
//!   interfere
//! - **Named captures**: `:name` segments bind one path segment each
//! - **Full backtracking**: every capture branch is explored, so a dead literal
//!   branch never hides a matching capture route
//! - **Ambiguity detection**: two capture branches parting at one node and both
//!   terminating on the same path are reported instead of picked arbitrarily
//! - **Decoded segments**: each path segment is percent-decoded after
//!   splitting, so captures see `Bulge Ardennes`, not `Bulge%20Ardennes`
//!
//! # Example
//!
//! ```rust
//! use citadel_router::{Disposition, Route, RouteTable};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.register(Method::GET, "/articles", Route::payload("listArticles")).unwrap();
//! table.register(Method::GET, "/articles/:id", Route::payload("readArticle")).unwrap();
//! table
//!     .register(Method::GET, "/scenarios/:id/file", Route::stream("scenarioFile", Disposition::Attachment))
//!     .unwrap();
//!
//! let found = table.resolve(&Method::GET, "/articles/12").unwrap().unwrap();
//! assert_eq!(found.route.handler(), "readArticle");
//! assert_eq!(found.params.get("id"), Some("12"));
//!
//! assert!(table.resolve(&Method::GET, "/forums").unwrap().is_none());
//! ```
//!
//! # Architecture
//!
//! ```text
//!                 GET (root)
//!                     │
//!            ┌────────┴────────┐
//!            │                 │
//!        "games"          "articles"
//!            │                 │
//!      ┌─────┴─────┐         (leaf)
//!      │           │
//!    "new"       ":id"
//!    (leaf)        │
//!              "players"
//!               (leaf)
//! ```

mod error;
mod node;
mod params;
mod route;
mod router;

pub use error::RouteError;
pub use params::Params;
pub use route::{Disposition, ExecutionMode, Route};
pub use router::RouteTable;

/// A resolved route with its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The bound route.
    pub route: &'a Route,
    /// The pattern the route was registered under (normalized).
    pub pattern: &'a str,
    /// Captured path parameters, in path order.
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route: &'a Route, pattern: &'a str, params: Params) -> Self {
        Self {
            route,
            pattern,
            params,
        }
    }
}

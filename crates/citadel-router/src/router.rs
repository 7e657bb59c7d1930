//! The per-method route table.
//!
//! [`RouteTable`] keeps one segment trie per HTTP method. It is filled by
//! sequential [`register`](RouteTable::register) calls at startup and only
//! read afterwards, so a built table can be shared across request workers
//! without locking.

use std::collections::HashMap;

use http::Method;

use crate::error::RouteError;
use crate::node::{Bound, Candidate, Node, PathSegment, PatternSegment, Step};
use crate::route::Route;
use crate::RouteMatch;

/// Route table with one trie per HTTP method.
///
/// # Example
///
/// ```rust
/// use citadel_router::{Route, RouteTable};
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.register(Method::GET, "/games/:id/players", Route::payload("listPlayers")).unwrap();
/// table.register(Method::GET, "/games/new", Route::payload("newGameForm")).unwrap();
///
/// let found = table.resolve(&Method::GET, "/games/42/players").unwrap().unwrap();
/// assert_eq!(found.route.handler(), "listPlayers");
/// assert_eq!(found.params.get("id"), Some("42"));
///
/// let found = table.resolve(&Method::GET, "/games/new").unwrap().unwrap();
/// assert_eq!(found.route.handler(), "newGameForm");
/// assert!(found.params.is_empty());
/// ```
///
/// # Match priority
///
/// Every branch is explored. When several routes terminate on the same path,
/// they are compared at the node where their branches part: the literal child
/// wins there, so `/users/me` beats `/users/:id`. If only capture children
/// lead to terminal matches from that node and more than one does, the path
/// is reported as [`RouteError::Ambiguous`]; this is only detectable per
/// concrete path, at resolution time.
///
/// Path segments are percent-decoded one by one before matching, so
/// `/games/Bulge%20Ardennes` binds `Bulge Ardennes`. A segment that does not
/// decode to UTF-8 yields [`RouteError::MalformedPath`].
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    trees: HashMap<Method, Node>,
    route_count: usize,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `route` under `method` and `pattern`.
    ///
    /// Pattern segments starting with `:` capture one path segment under the
    /// name that follows. Literal segments match case-insensitively.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        route: Route,
    ) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        let normalized = normalize(&segments);

        let bound = Bound {
            pattern: normalized.clone(),
            route,
        };
        self.trees
            .entry(method.clone())
            .or_default()
            .insert(&segments, bound)
            .map_err(|_| RouteError::Duplicate {
                method: method.clone(),
                pattern: normalized.clone(),
            })?;

        self.route_count += 1;
        tracing::debug!(%method, pattern = %normalized, "route registered");
        Ok(())
    }

    /// Resolves a concrete path.
    ///
    /// Returns `Ok(None)` when nothing matches, including for methods with no
    /// registered route.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<Option<RouteMatch<'_>>, RouteError> {
        let Some(tree) = self.trees.get(method) else {
            return Ok(None);
        };

        let segments = PathSegment::split(path).map_err(|_| RouteError::MalformedPath {
            path: path.to_string(),
        })?;
        let candidates = tree.collect(&segments);
        select(candidates).map_err(|candidates| RouteError::Ambiguous {
            method: method.clone(),
            path: path.to_string(),
            candidates,
        })
    }

    /// Returns the methods under which `path` resolves (or is ambiguous).
    ///
    /// Useful to tell "wrong method" apart from "no such path" in diagnostics.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .trees
            .keys()
            .filter(|method| !matches!(self.resolve(method, path), Ok(None)))
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Lists every registered route as `(method, pattern, route)`.
    #[must_use]
    pub fn routes(&self) -> Vec<(&Method, &str, &Route)> {
        let mut routes: Vec<_> = self
            .trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.bounds()
                    .into_iter()
                    .map(move |b| (method, b.pattern.as_str(), &b.route))
            })
            .collect();
        routes.sort_by(|a, b| (a.1, a.0.as_str()).cmp(&(b.1, b.0.as_str())));
        routes
    }

    /// Returns the methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.trees.keys()
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<PatternSegment>, RouteError> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.strip_prefix(':') {
            Some("") => Err(RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "capture segment without a name".to_string(),
            }),
            Some(name) => Ok(PatternSegment::Capture(name.to_string())),
            None => Ok(PatternSegment::Literal(segment.to_lowercase())),
        })
        .collect()
}

fn normalize(segments: &[PatternSegment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments
        .iter()
        .map(|segment| match segment {
            PatternSegment::Literal(literal) => format!("/{literal}"),
            PatternSegment::Capture(name) => format!("/:{name}"),
        })
        .collect()
}

/// Picks the winning candidate by walking the branches in path order.
///
/// At the first segment where the remaining candidates part ways, a literal
/// branch beats every capture branch. Two or more capture branches with no
/// literal sibling make the path ambiguous; their patterns are returned.
fn select(candidates: Vec<Candidate<'_>>) -> Result<Option<RouteMatch<'_>>, Vec<String>> {
    let mut remaining = candidates;
    let mut depth = 0;

    while remaining.len() > 1 {
        let Some(first) = remaining[0].walk.get(depth).cloned() else {
            break;
        };

        if remaining.iter().any(|c| c.walk[depth] == Step::Literal) {
            remaining.retain(|c| c.walk[depth] == Step::Literal);
        } else if remaining.iter().any(|c| c.walk[depth] != first) {
            return Err(remaining.iter().map(|c| c.bound.pattern.clone()).collect());
        }
        depth += 1;
    }

    Ok(remaining.pop().map(|c| RouteMatch::new(&c.bound.route, &c.bound.pattern, c.params)))
}

//! Segment trie node.
//!
//! Each node owns two child maps: literal segments (stored case-folded)
//! and capture segments keyed by parameter name. Resolution explores the
//! literal child and every capture child, so it may find several terminal
//! matches; choosing among them is left to the caller.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::string::FromUtf8Error;

use crate::params::Params;
use crate::route::Route;

/// A route together with the pattern it was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    /// Normalized pattern (`/games/:id`).
    pub pattern: String,
    /// The bound route.
    pub route: Route,
}

/// One parsed segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Literal segment, already case-folded.
    Literal(String),
    /// Capture segment (`:name`), holding the parameter name.
    Capture(String),
}

/// One segment of a concrete request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment<'p> {
    /// The percent-decoded segment.
    pub raw: Cow<'p, str>,
    /// Case-folded form used for literal lookups.
    pub folded: String,
}

impl<'p> PathSegment<'p> {
    /// Splits a request path into segments, dropping empty parts.
    ///
    /// Each segment is percent-decoded after splitting, so an encoded `%2F`
    /// stays inside its segment.
    pub fn split(path: &'p str) -> Result<Vec<Self>, FromUtf8Error> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|encoded| {
                let raw = urlencoding::decode(encoded)?;
                let folded = raw.to_lowercase();
                Ok(Self { raw, folded })
            })
            .collect()
    }
}

/// How one path segment was consumed on the way to a terminal node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Matched a literal child.
    Literal,
    /// Bound by the named capture child.
    Capture(String),
}

/// Bindings accumulated on the way down, newest first.
///
/// Each recursive step pushes a new cell that points at its parent, so a
/// branch never observes the bindings of a sibling branch.
#[derive(Debug, Clone, Copy)]
enum Trail<'a> {
    Root,
    Literal {
        parent: &'a Trail<'a>,
    },
    Capture {
        name: &'a str,
        value: &'a str,
        parent: &'a Trail<'a>,
    },
}

impl Trail<'_> {
    /// Rebuilds the bindings in path order together with the steps taken.
    fn unwind(&self) -> (Params, Vec<Step>) {
        let mut steps = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Trail::Root => break,
                Trail::Literal { parent } => {
                    steps.push(None);
                    cursor = *parent;
                }
                Trail::Capture {
                    name,
                    value,
                    parent,
                } => {
                    steps.push(Some((*name, *value)));
                    cursor = *parent;
                }
            }
        }
        steps.reverse();

        let walk = steps
            .iter()
            .map(|step| match step {
                None => Step::Literal,
                Some((name, _)) => Step::Capture((*name).to_string()),
            })
            .collect();
        let params = steps
            .into_iter()
            .flatten()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        (params, walk)
    }
}

/// A terminal match found during resolution.
#[derive(Debug, Clone)]
pub struct Candidate<'n> {
    /// The route reached.
    pub bound: &'n Bound,
    /// Captured values, in path order.
    pub params: Params,
    /// How each path segment was consumed.
    pub walk: Vec<Step>,
}

/// A node of the segment trie.
#[derive(Debug, Clone, Default)]
pub struct Node {
    literals: HashMap<String, Node>,
    captures: BTreeMap<String, Node>,
    bound: Option<Bound>,
}

impl Node {
    /// Creates an empty root node.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Binds `bound` at the end of `segments`, creating nodes as needed.
    ///
    /// Returns the pattern already bound there if the slot is taken; the
    /// existing binding is left untouched.
    pub fn insert(&mut self, segments: &[PatternSegment], bound: Bound) -> Result<(), String> {
        let mut node = self;
        for segment in segments {
            node = match segment {
                PatternSegment::Literal(literal) => {
                    node.literals.entry(literal.clone()).or_default()
                }
                PatternSegment::Capture(name) => node.captures.entry(name.clone()).or_default(),
            };
        }

        if let Some(existing) = &node.bound {
            return Err(existing.pattern.clone());
        }
        node.bound = Some(bound);
        Ok(())
    }

    /// Collects every terminal match for `segments`.
    #[must_use]
    pub fn collect<'n>(&'n self, segments: &[PathSegment<'_>]) -> Vec<Candidate<'n>> {
        self.collect_from(segments, &Trail::Root)
    }

    fn collect_from<'n>(
        &'n self,
        segments: &[PathSegment<'_>],
        trail: &Trail<'_>,
    ) -> Vec<Candidate<'n>> {
        let Some((head, rest)) = segments.split_first() else {
            return self
                .bound
                .iter()
                .map(|bound| {
                    let (params, walk) = trail.unwind();
                    Candidate {
                        bound,
                        params,
                        walk,
                    }
                })
                .collect();
        };

        let mut found = Vec::new();

        if let Some(child) = self.literals.get(&head.folded) {
            found.extend(child.collect_from(rest, &Trail::Literal { parent: trail }));
        }

        for (name, child) in &self.captures {
            let next = Trail::Capture {
                name: name.as_str(),
                value: head.raw.as_ref(),
                parent: trail,
            };
            found.extend(child.collect_from(rest, &next));
        }

        found
    }

    /// Visits every bound route below this node.
    pub fn bounds(&self) -> Vec<&Bound> {
        let mut out: Vec<&Bound> = self.bound.iter().collect();
        for child in self.literals.values().chain(self.captures.values()) {
            out.extend(child.bounds());
        }
        out
    }
}

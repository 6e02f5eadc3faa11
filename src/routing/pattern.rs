//! Route string parsing.
//!
//! # Responsibilities
//! - Split `"METHOD /path"` into method and path (method defaults to GET)
//! - Record `{name}` placeholders in left-to-right order
//! - Compile an anchored matcher capturing one path segment per placeholder
//!
//! # Design Decisions
//! - Method is case-sensitive; only an exact method match is accepted
//! - Placeholder names are ASCII word characters (`[A-Za-z0-9_]+`)
//! - Unbalanced `{` or `}` are plain literal text, never an error
//! - Literal text is regex-escaped so `.` or `+` in a path match only themselves

use std::fmt;
use std::sync::OnceLock;

use axum::http::Method;
use regex::Regex;

use crate::routing::types::{RouteError, RouteResult};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex must compile"))
}

/// A compiled `"METHOD /path"` route.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    method: Method,
    path: String,
    /// Literal text around the placeholders; always `param_names.len() + 1` items.
    literal_segments: Vec<String>,
    param_names: Vec<String>,
    matcher: Regex,
}

impl RoutePattern {
    /// Parse a route string such as `"POST /v1/api/store/{collection}"`.
    pub fn parse(route: &str) -> RouteResult<Self> {
        let parts: Vec<&str> = route.split(' ').collect();
        let (method, path) = if parts.len() == 2 {
            let method = Method::from_bytes(parts[0].as_bytes())
                .map_err(|_| RouteError::InvalidMethod(parts[0].to_string()))?;
            (method, parts[1])
        } else {
            (Method::GET, route)
        };

        let mut literal_segments = Vec::new();
        let mut param_names = Vec::new();
        let mut regex_src = String::from("^");
        let mut last = 0;

        for caps in placeholder_re().captures_iter(path) {
            let Some(whole) = caps.get(0) else { continue };
            let literal = &path[last..whole.start()];
            regex_src.push_str(&regex::escape(literal));
            regex_src.push_str("([^/]+)");
            literal_segments.push(literal.to_string());
            param_names.push(caps[1].to_string());
            last = whole.end();
        }
        let tail = &path[last..];
        regex_src.push_str(&regex::escape(tail));
        regex_src.push('$');
        literal_segments.push(tail.to_string());

        let matcher = Regex::new(&regex_src).map_err(|e| RouteError::InvalidPattern {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            method,
            path: path.to_string(),
            literal_segments,
            param_names,
            matcher,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path template, placeholders included.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn literal_segments(&self) -> &[String] {
        &self.literal_segments
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// True for methods that carry a JSON body argument (POST and PUT).
    pub fn takes_body(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }

    /// Match a request path, returning the raw (still percent-encoded)
    /// captures in `param_names` order.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(path)?;
        Some(
            (1..=self.param_names.len())
                .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Match method and path together.
    pub fn matches(&self, method: &Method, path: &str) -> Option<Vec<String>> {
        if &self.method != method {
            return None;
        }
        self.captures(path)
    }

    /// Build a concrete path from already-encoded values.
    ///
    /// A `None` (or missing) value leaves its `{name}` placeholder in place.
    pub fn fill(&self, values: &[Option<String>]) -> String {
        let mut out = String::with_capacity(self.path.len());
        for (i, name) in self.param_names.iter().enumerate() {
            out.push_str(&self.literal_segments[i]);
            match values.get(i).and_then(|v| v.as_deref()) {
                Some(v) => out.push_str(v),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out.push_str(&self.literal_segments[self.param_names.len()]);
        out
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

//! Dynamic value resolution.
//!
//! # Data Flow
//! ```text
//! "Bearer #request.body.cpf || #request.query.cpf"
//!     → each chain `#tok ( || #tok )*` found left to right
//!     → tokens of a chain tried in order (first that resolves wins)
//!     → each `#token` looked up by JSON path in
//!          request   → Request::to_json()
//!          responses → History::to_json()
//!     → the chain replaced in place, surrounding text kept
//! ```
//!
//! # Design Decisions
//! - A chain where no token resolves stays in the output verbatim and the
//!   miss is reported as an error
//! - `||` only chains tokens; in plain text it is kept as is
//! - Substitution walks the original text once, so a substituted value is
//!   never re-scanned as a token
//! - Header names in paths are canonicalized, so `#request.header.x-id`
//!   finds `X-Id`

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::GatewayError;
use crate::json::{self, path};
use crate::model::header::canonical_key;
use crate::model::history::History;
use crate::model::request::Request;

const TOKEN_PATTERN: &str = r"#[a-zA-Z0-9_.\-\[\]]+";

static CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{TOKEN_PATTERN}(?:\s*\|\|\s*{TOKEN_PATTERN})*"))
        .unwrap_or_else(|e| panic!("invalid token pattern: {e}"))
});

const COALESCE: &str = "||";

/// Snapshot of the documents expressions resolve against.
pub struct Resolver {
    request: Value,
    responses: Value,
}

impl Resolver {
    pub fn new(request: &Request, history: &History) -> Self {
        Self {
            request: request.to_json(),
            responses: history.to_json(),
        }
    }

    /// Resolve an expression to text.
    pub fn get(&self, expr: &str) -> (String, Vec<GatewayError>) {
        let mut out = String::with_capacity(expr.len());
        let mut errors = Vec::new();
        let mut last = 0;

        for found in CHAIN.find_iter(expr) {
            let chain = found.as_str().trim_end_matches('.');
            out.push_str(&expr[last..found.start()]);
            match self.resolve_chain(chain) {
                Some(value) => out.push_str(&json::to_text(value)),
                None => {
                    out.push_str(chain);
                    errors.push(GatewayError::ValueNotFound(chain.to_string()));
                }
            }
            last = found.start() + chain.len();
        }
        out.push_str(&expr[last..]);
        (out, errors)
    }

    /// Resolve an expression to a JSON value. An expression that is exactly
    /// one chain yields the referenced value as is; anything else is
    /// resolved to text and read as a JSON literal.
    pub fn get_value(&self, expr: &str) -> (Value, Vec<GatewayError>) {
        let expr = expr.trim();
        if !is_single_chain(expr) {
            let (text, errors) = self.get(expr);
            return (json::parse_literal(&text), errors);
        }
        let chain = expr.trim_end_matches('.');
        match self.resolve_chain(chain) {
            Some(value) => (value.clone(), Vec::new()),
            None => (
                Value::String(chain.to_string()),
                vec![GatewayError::ValueNotFound(chain.to_string())],
            ),
        }
    }

    /// Resolve to a list of strings: arrays split into their elements, a
    /// missing value yields nothing.
    pub fn get_as_slice_of_string(&self, expr: &str) -> (Vec<String>, Vec<GatewayError>) {
        let (value, errors) = self.get_value(expr);
        let values = match value {
            Value::Array(items) => items.iter().map(json::to_text).collect(),
            Value::Null => Vec::new(),
            other => vec![json::to_text(&other)],
        };
        (values, errors)
    }

    fn resolve_chain(&self, chain: &str) -> Option<&Value> {
        chain
            .split(COALESCE)
            .map(str::trim)
            .find_map(|token| self.lookup(token))
    }

    fn lookup(&self, token: &str) -> Option<&Value> {
        let mut segments = path::segments(token.trim_start_matches('#').trim_end_matches('.'));
        let (root, header_at) = match segments.first().map(String::as_str) {
            Some("request") => (&self.request, 1),
            Some("responses") => (&self.responses, 2),
            _ => return None,
        };
        if segments.get(header_at).map(String::as_str) == Some("header") {
            if let Some(name) = segments.get_mut(header_at + 1) {
                *name = canonical_key(name);
            }
        }
        path::get(root, &segments[1..].join("."))
    }
}

fn is_single_chain(text: &str) -> bool {
    CHAIN
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.as_str().trim_end_matches('.') == text.trim_end_matches('.'))
}

/// One-shot resolution of `expr` against a request and its history.
pub fn get(expr: &str, request: &Request, history: &History) -> (String, Vec<GatewayError>) {
    Resolver::new(request, history).get(expr)
}

pub fn get_as_slice_of_string(
    expr: &str,
    request: &Request,
    history: &History,
) -> (Vec<String>, Vec<GatewayError>) {
    Resolver::new(request, history).get_as_slice_of_string(expr)
}

//! Turns marked requests into configuration passes.
//!
//! A request is marked when its path matches a rewrite rule that sets the
//! deploy query variable, or when it carries that variable itself. Marked
//! requests are answered here and never reach the router.

use crate::dispatcher::Dispatcher;
use crate::error::DeployError;
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use envcfg_domain::constants::{DEPLOY_QUERY_VAR, DEPLOY_REWRITE_PATTERN, DEPLOY_REWRITE_QUERY};
use fxhash::{FxHashMap, FxHashSet};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registered public query variables. Anything else is dropped during resolution.
#[derive(Debug, Clone, Default)]
pub struct QueryVars {
    vars: FxHashSet<String>,
}

impl QueryVars {
    pub fn register(&mut self, name: impl Into<String>) {
        self.vars.insert(name.into());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePriority {
    /// Checked before every rule registered so far.
    Top,
    /// Checked after every rule registered so far.
    Bottom,
}

#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    vars: Vec<(String, String)>,
}

impl RewriteRule {
    /// Compiles `pattern`; `query` is a `key=value&key=value` template.
    ///
    /// # Errors
    /// Returns [`DeployError::Rewrite`] when `pattern` is not a valid regex.
    pub fn new(pattern: &str, query: &str) -> Result<Self, DeployError> {
        let pattern = Regex::new(pattern)?;
        let vars = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_owned(), value.to_owned())
            })
            .collect();

        Ok(Self { pattern, vars })
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    #[must_use]
    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }
}

/// Ordered rewrite rules; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    rules: Vec<RewriteRule>,
}

impl RewriteRules {
    /// # Errors
    /// Returns [`DeployError::Rewrite`] when `pattern` is not a valid regex.
    pub fn add(
        &mut self,
        pattern: &str,
        query: &str,
        priority: RewritePriority,
    ) -> Result<(), DeployError> {
        let rule = RewriteRule::new(pattern, query)?;
        match priority {
            RewritePriority::Top => self.rules.insert(0, rule),
            RewritePriority::Bottom => self.rules.push(rule),
        }
        Ok(())
    }

    /// First rule matching `path` (without its leading `/`).
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|rule| rule.is_match(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The request-facing side of the deploy slice.
#[derive(Debug, Clone)]
pub struct Endpoint {
    query_vars: QueryVars,
    rewrites: RewriteRules,
    dispatcher: Arc<Dispatcher>,
}

impl Endpoint {
    /// Registers the deploy query variable and its rewrite rule.
    ///
    /// # Errors
    /// Returns [`DeployError::Rewrite`] if the built-in rule fails to compile.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Result<Self, DeployError> {
        let mut query_vars = QueryVars::default();
        query_vars.register(DEPLOY_QUERY_VAR);

        let mut rewrites = RewriteRules::default();
        rewrites.add(DEPLOY_REWRITE_PATTERN, DEPLOY_REWRITE_QUERY, RewritePriority::Top)?;

        Ok(Self { query_vars, rewrites, dispatcher })
    }

    /// Registered query variables for `uri`.
    ///
    /// The matching rewrite rule is applied first; the request's own query
    /// string only fills variables the rule left unset.
    #[must_use]
    pub fn resolve_query_vars(&self, uri: &Uri) -> FxHashMap<String, String> {
        let path = uri.path().strip_prefix('/').unwrap_or_else(|| uri.path());
        let mut resolved = FxHashMap::default();

        if let Some(rule) = self.rewrites.find(path) {
            for (key, value) in rule.vars() {
                if self.query_vars.contains(key) {
                    resolved.insert(key.clone(), value.clone());
                }
            }
        }

        match Query::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(Query(pairs)) => {
                for (key, value) in pairs {
                    if self.query_vars.contains(&key) {
                        resolved.entry(key).or_insert(value);
                    }
                }
            },
            Err(err) => trace!(error = %err, "Ignoring malformed query string"),
        }

        resolved
    }

    /// `true` when `uri` asks for a configuration pass.
    #[must_use]
    pub fn is_deploy_request(&self, uri: &Uri) -> bool {
        self.resolve_query_vars(uri).get(DEPLOY_QUERY_VAR).is_some_and(|value| is_truthy(value))
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Non-empty and not `0` or `false`.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Middleware answering deploy requests before routing.
///
/// The reply is an empty `200 OK` whatever the dispatcher decided, so callers
/// learn nothing about the gate.
pub async fn sniff_requests(
    State(endpoint): State<Arc<Endpoint>>,
    request: Request,
    next: Next,
) -> Response {
    if !endpoint.is_deploy_request(request.uri()) {
        return next.run(request).await;
    }

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string())
        .unwrap_or_default();

    let outcome = endpoint.dispatcher.run_configuration(&remote_addr);
    debug!(remote_addr, path = %request.uri().path(), ?outcome, "Deploy request handled");

    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        for value in ["1", "yes", "true", "x"] {
            assert!(is_truthy(value), "{value:?}");
        }
        for value in ["", "0", "false", "FALSE"] {
            assert!(!is_truthy(value), "{value:?}");
        }
    }

    #[test]
    fn top_rules_take_precedence() {
        let mut rules = RewriteRules::default();
        assert!(rules.is_empty());
        rules.add("^api/.*$", "a=1", RewritePriority::Bottom).unwrap();
        rules.add("^api/deploy$", "b=1", RewritePriority::Top).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.find("api/deploy").unwrap().vars(), [("b".to_owned(), "1".to_owned())]);
        assert_eq!(rules.find("api/other").unwrap().vars(), [("a".to_owned(), "1".to_owned())]);
    }

    #[test]
    fn bad_pattern_is_an_error() {
        let err = RewriteRule::new("(", "a=1").unwrap_err();
        assert!(matches!(err, DeployError::Rewrite { .. }));
    }
}

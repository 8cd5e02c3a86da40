use crate::server::handler::HandlerRecord;
use http::Method;
use serde::{Deserialize, Serialize};

pub mod path;
pub mod query;

/// A request prepared for matching: method normalized, base URL stripped, path segments and
/// query parameters decoded.
#[derive(Debug, Clone)]
pub(crate) struct MatchTarget {
    pub method: Option<Method>,
    pub path: String,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

/// Describes why a handler did not match a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub entity: String,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    fn new<E: Into<String>, A: Into<String>>(entity: &str, expected: E, actual: A) -> Self {
        Self {
            entity: entity.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Edit distance between expected and actual value.
    pub fn distance(&self) -> usize {
        let expected: Vec<char> = self.expected.chars().collect();
        let actual: Vec<char> = self.actual.chars().collect();
        stringmetrics::levenshtein_limit_iter(expected.iter(), actual.iter(), u32::MAX) as usize
    }
}

pub(crate) trait Matcher {
    fn matches(&self, req: &MatchTarget, handler: &HandlerRecord) -> bool;
    fn mismatches(&self, req: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch>;
}

/// All checks a handler must pass, in the order they are applied during resolution.
pub(crate) fn all() -> Vec<Box<dyn Matcher + Sync + Send>> {
    vec![
        Box::new(MethodMatcher),
        Box::new(PathMatcher),
        Box::new(PathParamMatcher),
        Box::new(SearchParamMatcher),
    ]
}

// *************************************************************************************************
// Method
// *************************************************************************************************
pub(crate) struct MethodMatcher;

impl Matcher for MethodMatcher {
    fn matches(&self, req: &MatchTarget, handler: &HandlerRecord) -> bool {
        req.method.as_ref() == Some(&handler.method)
    }

    fn mismatches(&self, req: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch> {
        if self.matches(req, handler) {
            return Vec::new();
        }

        vec![Mismatch::new(
            "method",
            handler.method.as_str(),
            req.method.as_ref().map_or("<invalid>", |m| m.as_str()),
        )]
    }
}

// *************************************************************************************************
// Path
// *************************************************************************************************
pub(crate) struct PathMatcher;

impl Matcher for PathMatcher {
    fn matches(&self, req: &MatchTarget, handler: &HandlerRecord) -> bool {
        handler.template.match_segments(&req.segments).is_some()
    }

    fn mismatches(&self, req: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch> {
        if self.matches(req, handler) {
            return Vec::new();
        }

        vec![Mismatch::new(
            "path",
            handler.template.pattern(),
            req.path.as_str(),
        )]
    }
}

// *************************************************************************************************
// Path parameters
// *************************************************************************************************
/// Checks declared path parameter values. Parameters the template captures but that carry no
/// constraint are ignored. A request whose path does not match the template is reported by
/// [PathMatcher] only.
pub(crate) struct PathParamMatcher;

impl PathParamMatcher {
    fn unmatched<'a>(
        &self,
        req: &MatchTarget,
        handler: &'a HandlerRecord,
    ) -> Vec<(&'a String, &'a String, Option<String>)> {
        let params = match handler.template.match_segments(&req.segments) {
            Some(params) => params,
            None => return Vec::new(),
        };

        handler
            .path_params
            .iter()
            .filter(|(name, value)| params.get(*name) != Some(*value))
            .map(|(name, value)| (name, value, params.get(name).cloned()))
            .collect()
    }
}

impl Matcher for PathParamMatcher {
    fn matches(&self, req: &MatchTarget, handler: &HandlerRecord) -> bool {
        match handler.template.match_segments(&req.segments) {
            Some(params) => handler
                .path_params
                .iter()
                .all(|(name, value)| params.get(name) == Some(value)),
            None => true,
        }
    }

    fn mismatches(&self, req: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch> {
        self.unmatched(req, handler)
            .into_iter()
            .map(|(name, value, actual)| {
                Mismatch::new(
                    "path parameter",
                    format!("{}={}", name, value),
                    format!("{}={}", name, actual.unwrap_or_default()),
                )
            })
            .collect()
    }
}

// *************************************************************************************************
// Search parameters
// *************************************************************************************************
pub(crate) struct SearchParamMatcher;

impl Matcher for SearchParamMatcher {
    fn matches(&self, req: &MatchTarget, handler: &HandlerRecord) -> bool {
        query::matches(&req.query, &handler.search_params)
    }

    fn mismatches(&self, req: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch> {
        query::unmatched(&req.query, &handler.search_params)
            .into_iter()
            .map(|(key, value)| {
                let actual = req
                    .query
                    .iter()
                    .find(|(k, _)| k == key)
                    .map_or_else(String::new, |(k, v)| format!("{}={}", k, v));
                Mismatch::new("search parameter", format!("{}={}", key, value), actual)
            })
            .collect()
    }
}

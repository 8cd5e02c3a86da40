use crate::common::{error::Error, util::decode};
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// The result of matching a request path against a [PathTemplate].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathMatch {
    pub is_match: bool,
    pub params: BTreeMap<String, String>,
}

/// A compiled path pattern such as `/users/:id/posts`.
///
/// Segments starting with `:` capture the corresponding request segment under the given name,
/// all other segments must be equal to the request segment after percent-decoding both sides.
/// A single leading and a single trailing `/` are not significant, so `test`, `/test` and
/// `test/` compile to the same template. Empty interior segments (`a//b`) are kept as literal
/// empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compiles a path pattern. A query string embedded in the pattern (`/test?id=1`) is not part
    /// of the path and is ignored here, see
    /// [embedded_search_params](crate::embedded_search_params).
    pub fn compile(pattern: &str) -> Result<PathTemplate, Error> {
        let invalid = |reason: &str| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.contains("://") {
            return Err(invalid(
                "absolute URLs are not supported, register a path relative to the base URL",
            ));
        }

        if pattern.contains('#') {
            return Err(invalid("fragments are not supported"));
        }

        let path = split_path_and_query(pattern).0;

        Url::parse("http://localhost/")
            .and_then(|base| base.join(path))
            .map_err(|err| invalid(&err.to_string()))?;

        let mut segments = Vec::new();
        for segment in split_segments(path) {
            match segment.strip_prefix(':') {
                Some("") => return Err(invalid("path parameter without a name")),
                Some(name) => {
                    if segments.contains(&Segment::Param(name.to_string())) {
                        return Err(invalid(&format!(
                            "path parameter '{}' is declared more than once",
                            name
                        )));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => {
                    let literal = decode(segment).into_owned();
                    // Request URLs are normalized, so dot segments never reach the matcher.
                    if literal == "." || literal == ".." {
                        return Err(invalid("dot segments are not supported"));
                    }
                    segments.push(Segment::Literal(literal));
                }
            }
        }

        Ok(PathTemplate {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the template declares a path parameter with the given name.
    pub fn has_param(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param(n) if n == name))
    }

    /// Matches a raw (still percent-encoded) request path.
    pub fn match_path(&self, path: &str) -> PathMatch {
        let path = split_path_and_query(path).0;
        let segments: Vec<String> = split_segments(path)
            .into_iter()
            .map(|s| decode(s).into_owned())
            .collect();

        match self.match_segments(&segments) {
            Some(params) => PathMatch {
                is_match: true,
                params,
            },
            None => PathMatch::default(),
        }
    }

    /// Matches already decoded request segments and returns the captured parameters.
    pub(crate) fn match_segments(&self, segments: &[String]) -> Option<BTreeMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(literal) if literal != actual => return None,
                Segment::Literal(_) => {}
                Segment::Param(name) => {
                    params.insert(name.clone(), actual.clone());
                }
            }
        }

        Some(params)
    }
}

/// Splits a path into its `/` delimited segments, ignoring one leading and one trailing `/`.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    if path.is_empty() {
        return Vec::new();
    }

    path.split('/').collect()
}

pub(crate) fn split_path_and_query(value: &str) -> (&str, Option<&str>) {
    match value.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (value, None),
    }
}

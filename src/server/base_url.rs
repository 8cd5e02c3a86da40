use crate::{
    common::error::Error,
    server::matchers::path::split_segments,
};
use url::Url;

/// The normalized base URL of a mock server: an origin plus an optional base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BaseUrl {
    origin: String,
    segments: Vec<String>,
    normalized: String,
}

impl BaseUrl {
    pub fn parse(url: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url).map_err(|err| invalid(&err.to_string()))?;

        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(invalid("the URL must have a host"));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("the URL must not have a query or fragment"));
        }

        let origin = parsed.origin().ascii_serialization();
        let segments: Vec<String> = split_segments(parsed.path())
            .into_iter()
            .map(str::to_string)
            .collect();

        let normalized = if segments.is_empty() {
            origin.clone()
        } else {
            format!("{}/{}", origin, segments.join("/"))
        };

        Ok(Self {
            origin,
            segments,
            normalized,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Number of base path segments. Used to prefer the most specific of several bases.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns the request path segments below this base, still percent-encoded, or `None`
    /// if the URL is not located under this base.
    pub fn strip<'a>(&self, url: &'a Url) -> Option<Vec<&'a str>> {
        if url.origin().ascii_serialization() != self.origin {
            return None;
        }

        let segments = split_segments(url.path());
        if segments.len() < self.segments.len() {
            return None;
        }

        let is_prefix = self
            .segments
            .iter()
            .zip(&segments)
            .all(|(base, actual)| base == actual);

        if !is_prefix {
            return None;
        }

        Some(segments[self.segments.len()..].to_vec())
    }
}

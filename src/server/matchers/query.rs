use crate::{common::util::decode, server::matchers::path::split_path_and_query};
use std::collections::BTreeMap;

/// Parses a raw query string into decoded key/value pairs, keeping repeated keys.
pub(crate) fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Returns the search parameters embedded in a handler pattern such as `/test?id=hello`.
pub fn embedded_search_params(pattern: &str) -> BTreeMap<String, String> {
    match split_path_and_query(pattern).1 {
        Some(query) => parse_query(query).into_iter().collect(),
        None => BTreeMap::new(),
    }
}

/// Decodes configured search parameters with the same form rules as request queries, so that
/// `a%20b`, `a+b` and `a b` are the same constraint.
pub(crate) fn normalize_search_params(
    params: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (decode_form_component(k), decode_form_component(v)))
        .collect()
}

// `+` is a space in form encoding, `%2B` stays a literal plus.
fn decode_form_component(value: &str) -> String {
    decode(&value.replace('+', " ")).into_owned()
}

/// Returns `true` if every required key is present in the request query with an equal value.
///
/// Keys that the request carries but that are not required never cause a mismatch. A key that
/// appears more than once in the request satisfies the constraint if any of its values is
/// equal. Both sides must already be decoded.
pub fn matches(request_query: &[(String, String)], required: &BTreeMap<String, String>) -> bool {
    required
        .iter()
        .all(|(key, value)| contains_entry(request_query, key, value))
}

/// Returns the required entries that the request query does not satisfy.
pub(crate) fn unmatched<'a>(
    request_query: &[(String, String)],
    required: &'a BTreeMap<String, String>,
) -> Vec<(&'a String, &'a String)> {
    required
        .iter()
        .filter(|(key, value)| !contains_entry(request_query, key, value))
        .collect()
}

fn contains_entry(request_query: &[(String, String)], key: &str, value: &str) -> bool {
    request_query.iter().any(|(k, v)| k == key && v == value)
}

//! First-value header snapshots used by the summaries.

use axum::http::HeaderMap;
use std::collections::BTreeMap;

/// Header name to its first value, names in canonical `Title-Case`.
pub type HeaderSet = BTreeMap<String, String>;

/// Collapses `headers` to one value per name, keeping the first one seen.
pub fn snapshot(headers: &HeaderMap) -> HeaderSet {
    let mut set = HeaderSet::new();
    for name in headers.keys() {
        if let Some(value) = headers.get(name) {
            set.entry(canonical_name(name.as_str()))
                .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
    }
    set
}

/// `content-type` -> `Content-Type`.
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

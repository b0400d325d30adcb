//! OpenSearch sink settings and domain endpoint resolution.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::source::violation;

/// Maximum OpenSearch index name length in bytes.
pub const MAX_INDEX_NAME_LENGTH: usize = 255;

/// Characters OpenSearch forbids in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#'];

/// Characters an index name may not start with.
const FORBIDDEN_INDEX_PREFIXES: &[char] = &['_', '-', '+'];

/// A domain the console already knows the endpoint of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownDomain {
    pub name: String,
    pub endpoint: String,
}

impl KnownDomain {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Turn the user's domain input into an endpoint.
///
/// A known domain name resolves to its endpoint; anything else is taken to
/// be an endpoint already and is returned trimmed but otherwise verbatim.
pub fn resolve_domain_endpoint(known: &[KnownDomain], input: &str) -> String {
    let input = input.trim();
    known
        .iter()
        .find(|d| d.name == input)
        .map(|d| d.endpoint.clone())
        .unwrap_or_else(|| input.to_string())
}

/// Where the pipeline writes enriched documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OpenSearchSink {
    /// Resolved domain endpoint (`https://...`).
    #[validate(custom(function = "validate_endpoint"))]
    pub endpoint: String,
    #[validate(custom(function = "validate_index_name"))]
    pub index: String,
}

impl OpenSearchSink {
    /// Build a sink from raw user input, resolving domain names.
    pub fn from_input(known: &[KnownDomain], domain: &str, index: &str) -> Self {
        Self {
            endpoint: resolve_domain_endpoint(known, domain),
            index: index.trim().to_string(),
        }
    }
}

pub fn validate_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    let Some(host) = endpoint.strip_prefix("https://") else {
        return Err(violation(
            "endpoint",
            "Domain endpoint must be an https:// URL or a known domain name",
        ));
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(violation("endpoint", "Domain endpoint has no valid host"));
    }
    Ok(())
}

pub fn validate_index_name(index: &str) -> Result<(), ValidationError> {
    if index.is_empty() {
        return Err(violation("index_name", "Index name must not be empty"));
    }
    if index.len() > MAX_INDEX_NAME_LENGTH {
        return Err(violation(
            "index_name",
            "Index name exceeds the maximum length of 255 bytes",
        ));
    }
    if index.chars().any(|c| c.is_uppercase()) {
        return Err(violation("index_name", "Index name must be lowercase"));
    }
    if index.contains(FORBIDDEN_INDEX_CHARS) {
        return Err(violation(
            "index_name",
            "Index name contains a forbidden character",
        ));
    }
    if index.starts_with(FORBIDDEN_INDEX_PREFIXES) {
        return Err(violation(
            "index_name",
            "Index name must not start with '_', '-' or '+'",
        ));
    }
    if index == "." || index == ".." {
        return Err(violation("index_name", "Index name must not be '.' or '..'"));
    }
    Ok(())
}

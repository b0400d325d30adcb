//! S3 source settings for the ingestion pipeline.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Minimum S3 bucket name length.
pub const MIN_BUCKET_NAME_LENGTH: u64 = 3;

/// Maximum S3 bucket name length.
pub const MAX_BUCKET_NAME_LENGTH: u64 = 63;

/// Maximum length of an S3 key prefix.
pub const MAX_PREFIX_LENGTH: u64 = 1024;

static BUCKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").expect("valid regex"));

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("valid regex"));

/// Where the pipeline reads documents from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct S3Source {
    #[validate(
        length(
            min = MIN_BUCKET_NAME_LENGTH,
            max = MAX_BUCKET_NAME_LENGTH,
            message = "Bucket name must be between 3 and 63 characters"
        ),
        custom(function = "validate_bucket_name")
    )]
    pub bucket: String,
    /// Prefix for metadata files stored separately from data files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(max = MAX_PREFIX_LENGTH, message = "Metadata prefix is too long"),
        custom(function = "validate_prefix")
    )]
    pub metadata_prefix: Option<String>,
}

/// Check the character-level S3 bucket naming rules.
pub fn validate_bucket_name(bucket: &str) -> Result<(), ValidationError> {
    if !BUCKET_RE.is_match(bucket) {
        return Err(violation(
            "bucket_name",
            "Bucket name may only contain lowercase letters, digits, dots and hyphens, \
             and must start and end with a letter or digit",
        ));
    }
    if bucket.contains("..") {
        return Err(violation(
            "bucket_name",
            "Bucket name must not contain two adjacent periods",
        ));
    }
    if IPV4_RE.is_match(bucket) {
        return Err(violation(
            "bucket_name",
            "Bucket name must not be formatted as an IP address",
        ));
    }
    Ok(())
}

/// Prefixes are relative to the bucket root.
pub fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.starts_with('/') {
        return Err(violation("prefix", "Prefix must not start with '/'"));
    }
    Ok(())
}

pub(crate) fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(bucket: &str) -> S3Source {
        S3Source {
            bucket: bucket.to_string(),
            metadata_prefix: None,
        }
    }

    #[test]
    fn valid_buckets_accepted() {
        assert!(source("my-bucket").validate().is_ok());
        assert!(source("logs.example.com").validate().is_ok());
        assert!(source("abc").validate().is_ok());
    }

    #[test]
    fn empty_bucket_rejected() {
        let errs = source("").validate().unwrap_err();
        assert!(errs.field_errors().contains_key("bucket"));
    }

    #[test]
    fn uppercase_bucket_rejected() {
        assert!(validate_bucket_name("MyBucket").is_err());
    }

    #[test]
    fn bucket_edge_characters_rejected() {
        assert!(validate_bucket_name("-bucket").is_err());
        assert!(validate_bucket_name("bucket.").is_err());
        assert!(validate_bucket_name("my..bucket").is_err());
    }

    #[test]
    fn ip_formatted_bucket_rejected() {
        assert!(validate_bucket_name("192.168.5.4").is_err());
    }

    #[test]
    fn overlong_bucket_rejected() {
        let long = "a".repeat(MAX_BUCKET_NAME_LENGTH as usize + 1);
        assert!(source(&long).validate().is_err());
        let exact = "a".repeat(MAX_BUCKET_NAME_LENGTH as usize);
        assert!(source(&exact).validate().is_ok());
    }

    #[test]
    fn short_bucket_rejected_at_length_floor() {
        let short = "a".repeat(MIN_BUCKET_NAME_LENGTH as usize - 1);
        let errs = source(&short).validate().unwrap_err();
        let bucket = &errs.field_errors()["bucket"];
        assert!(bucket.iter().any(|e| e.code == "length"));
        let exact = "a".repeat(MIN_BUCKET_NAME_LENGTH as usize);
        assert!(source(&exact).validate().is_ok());
    }

    #[test]
    fn overlong_metadata_prefix_rejected() {
        let mut s = source("my-bucket");
        s.metadata_prefix = Some("m".repeat(MAX_PREFIX_LENGTH as usize));
        assert!(s.validate().is_ok());
        s.metadata_prefix = Some("m".repeat(MAX_PREFIX_LENGTH as usize + 1));
        let errs = s.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("metadata_prefix"));
    }

    #[test]
    fn metadata_prefix_rules() {
        let mut s = source("my-bucket");
        s.metadata_prefix = Some("metadata/".into());
        assert!(s.validate().is_ok());
        s.metadata_prefix = Some("/metadata/".into());
        assert!(s.validate().is_err());
    }
}

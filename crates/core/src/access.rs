//! Service access: the IAM role the ingestion pipeline assumes.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum IAM role name length.
pub const MAX_ROLE_NAME_LENGTH: usize = 64;

/// Prefix of generated role names.
pub const DEFAULT_ROLE_NAME_PREFIX: &str = "MLInferenceOSIRole";

static ROLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+=,.@_-]+$").expect("valid regex"));

static ROLE_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:iam::\d{12}:role/[A-Za-z0-9+=,.@_/-]+$").expect("valid regex")
});

/// How the pipeline is authorised to invoke the model and write to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ServiceAccess {
    CreateNew { role_name: String },
    UseExisting { role_arn: String },
}

impl ServiceAccess {
    /// A new role named after the current time.
    pub fn create_default(now: Timestamp) -> Self {
        Self::CreateNew {
            role_name: default_role_name(now),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateNew { role_name } => validate_role_name(role_name),
            Self::UseExisting { role_arn } => validate_role_arn(role_arn),
        }
    }
}

/// `MLInferenceOSIRole-<unix seconds>`.
pub fn default_role_name(now: Timestamp) -> String {
    format!("{DEFAULT_ROLE_NAME_PREFIX}-{}", now.timestamp())
}

pub fn validate_role_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Service role name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_ROLE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Service role name exceeds maximum length of {MAX_ROLE_NAME_LENGTH} characters (got {})",
            name.len()
        )));
    }
    if !ROLE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Service role name '{name}' contains invalid characters. \
             Allowed: alphanumerics and + = , . @ - _"
        )));
    }
    Ok(())
}

pub fn validate_role_arn(arn: &str) -> Result<(), CoreError> {
    if !ROLE_ARN_RE.is_match(arn) {
        return Err(CoreError::Validation(format!(
            "'{arn}' is not an IAM role ARN"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_role_name_uses_unix_seconds() {
        let now = chrono::Utc.timestamp_opt(1_769_711_899, 0).unwrap();
        assert_eq!(default_role_name(now), "MLInferenceOSIRole-1769711899");
        assert!(ServiceAccess::create_default(now).validate().is_ok());
    }

    #[test]
    fn role_name_allowed_characters() {
        assert!(validate_role_name("My+Role=1,a.b@c-d_e").is_ok());
        assert!(validate_role_name("bad role").is_err());
        assert!(validate_role_name("bad/role").is_err());
        assert!(validate_role_name("").is_err());
    }

    #[test]
    fn role_name_length_limit() {
        assert!(validate_role_name(&"r".repeat(MAX_ROLE_NAME_LENGTH)).is_ok());
        let err = validate_role_name(&"r".repeat(MAX_ROLE_NAME_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn existing_role_requires_arn() {
        let ok = ServiceAccess::UseExisting {
            role_arn: "arn:aws:iam::123456789012:role/OpenSearchPipelineRole".into(),
        };
        assert!(ok.validate().is_ok());
        let bad = ServiceAccess::UseExisting {
            role_arn: "OpenSearchPipelineRole".into(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn access_wire_format() {
        let json = serde_json::json!({ "method": "create_new", "role_name": "R" });
        let access: ServiceAccess = serde_json::from_value(json).unwrap();
        assert_eq!(
            access,
            ServiceAccess::CreateNew {
                role_name: "R".into()
            }
        );
    }
}

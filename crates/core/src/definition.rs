//! Full pipeline definition handed to the ingestion service.
//!
//! Combines the pipeline name, S3 source, processor document, OpenSearch
//! sink and service access into one document, rendered as JSON or YAML.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::ServiceAccess;
use crate::document::{validate_processors, PipelineDocument, ProcessorDeclaration};
use crate::error::CoreError;
use crate::processor::Processor;
use crate::sink::OpenSearchSink;
use crate::source::S3Source;
use crate::validation::{from_validation_errors, FieldViolation, ValidationReport};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Definition schema version understood by the ingestion service.
pub const DEFINITION_VERSION: &str = "2";

pub const MIN_PIPELINE_NAME_LENGTH: usize = 3;

pub const MAX_PIPELINE_NAME_LENGTH: usize = 28;

/// Top-level keys of the rendered definition that a pipeline name would shadow.
pub const RESERVED_PIPELINE_NAMES: &[&str] = &["version"];

static PIPELINE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything about the definition that is not the processor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSettings {
    pub name: String,
    pub source: Option<S3Source>,
    pub sink: Option<OpenSearchSink>,
    pub access: ServiceAccess,
}

impl DefinitionSettings {
    pub fn new(name: impl Into<String>, access: ServiceAccess) -> Self {
        Self {
            name: name.into(),
            source: None,
            sink: None,
            access,
        }
    }

    /// Collect every settings problem, in form order: name, source, sink, access.
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();

        if let Err(CoreError::Validation(msg)) = validate_pipeline_name(&self.name) {
            out.push(FieldViolation::new("name", "pipeline_name", msg));
        }

        match &self.source {
            Some(source) => {
                if let Err(errs) = source.validate() {
                    out.extend(from_validation_errors("source", &errs));
                }
            }
            None => out.push(FieldViolation::new(
                "source",
                "required",
                "An S3 source must be configured",
            )),
        }

        match &self.sink {
            Some(sink) => {
                if let Err(errs) = sink.validate() {
                    out.extend(from_validation_errors("sink", &errs));
                }
            }
            None => out.push(FieldViolation::new(
                "sink",
                "required",
                "An OpenSearch sink must be configured",
            )),
        }

        if let Err(CoreError::Validation(msg)) = self.access.validate() {
            out.push(FieldViolation::new("access", "service_access", msg));
        }

        out
    }
}

pub fn validate_pipeline_name(name: &str) -> Result<(), CoreError> {
    if name.len() < MIN_PIPELINE_NAME_LENGTH || name.len() > MAX_PIPELINE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Pipeline name must be between {MIN_PIPELINE_NAME_LENGTH} and \
             {MAX_PIPELINE_NAME_LENGTH} characters (got {})",
            name.len()
        )));
    }
    if !PIPELINE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Pipeline name '{name}' must start with a lowercase letter and contain only \
             lowercase letters, digits and hyphens"
        )));
    }
    if RESERVED_PIPELINE_NAMES.contains(&name) {
        return Err(CoreError::Validation(format!(
            "Pipeline name '{name}' is reserved"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendered definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineDefinition {
    pub version: &'static str,
    #[serde(flatten)]
    pub pipelines: BTreeMap<String, PipelineBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineBody {
    pub source: SourceDeclaration,
    pub processor: Vec<ProcessorDeclaration>,
    pub sink: Vec<SinkDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDeclaration {
    pub s3: S3Declaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3Declaration {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_prefix: Option<String>,
    pub aws: AwsDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkDeclaration {
    pub opensearch: OpenSearchDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenSearchDeclaration {
    pub hosts: Vec<String>,
    pub index: String,
    pub aws: AwsDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sts_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_role: Option<String>,
}

impl From<&ServiceAccess> for AwsDeclaration {
    fn from(access: &ServiceAccess) -> Self {
        match access {
            ServiceAccess::CreateNew { role_name } => Self {
                sts_role_arn: None,
                create_role: Some(role_name.clone()),
            },
            ServiceAccess::UseExisting { role_arn } => Self {
                sts_role_arn: Some(role_arn.clone()),
                create_role: None,
            },
        }
    }
}

impl PipelineDefinition {
    /// Validate settings and processors together, then assemble the document.
    ///
    /// All violations are reported at once in a single
    /// [`CoreError::Validation`].
    pub fn build(settings: &DefinitionSettings, processors: &[Processor]) -> Result<Self, CoreError> {
        let mut violations = settings.violations();
        violations.extend(validate_processors(processors).errors);
        ValidationReport::from_violations(violations).into_result()?;

        let (Some(source), Some(sink)) = (&settings.source, &settings.sink) else {
            return Err(CoreError::Internal(
                "validated settings are missing source or sink".into(),
            ));
        };
        let aws = AwsDeclaration::from(&settings.access);
        let document = PipelineDocument::from_processors(processors)?;

        let body = PipelineBody {
            source: SourceDeclaration {
                s3: S3Declaration {
                    bucket: source.bucket.clone(),
                    metadata_prefix: source.metadata_prefix.clone(),
                    aws: aws.clone(),
                },
            },
            processor: document.processors,
            sink: vec![SinkDeclaration {
                opensearch: OpenSearchDeclaration {
                    hosts: vec![sink.endpoint.clone()],
                    index: sink.index.clone(),
                    aws,
                },
            }],
        };

        Ok(Self {
            version: DEFINITION_VERSION,
            pipelines: BTreeMap::from([(settings.name.clone(), body)]),
        })
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Internal(format!("Failed to render definition as JSON: {e}")))
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        serde_yaml::to_string(self)
            .map_err(|e| CoreError::Internal(format!("Failed to render definition as YAML: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

/// Rendering format for [`PipelineDefinition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionFormat {
    #[default]
    Json,
    Yaml,
}

impl DefinitionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(CoreError::Validation(format!(
                "Invalid format: '{s}'. Must be one of: json, yaml"
            ))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }

    pub fn render(&self, definition: &PipelineDefinition) -> Result<String, CoreError> {
        match self {
            Self::Json => definition.to_json(),
            Self::Yaml => definition.to_yaml(),
        }
    }
}

//! Processor section of the ingestion document.
//!
//! Converts the pipeline, in order, into the tagged processor declarations
//! the ingestion service consumes. Structurally invalid processors fail the
//! conversion; nothing is dropped silently.

use serde::Serialize;

use crate::entry::Entry;
use crate::error::CoreError;
use crate::processor::{ActionType, ModelProvider, Processor, ProcessorKind};
use crate::validation::ValidationReport;

/// One processor as emitted into the ingestion document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorDeclaration {
    MlInference(MlInferenceDeclaration),
    CopyValues(CopyValuesDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MlInferenceDeclaration {
    pub model_id: String,
    pub action_type: ActionType,
    pub provider: ModelProvider,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub input_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output_key: String,
    #[serde(rename = "when", skip_serializing_if = "String::is_empty")]
    pub condition_expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyValuesDeclaration {
    pub entries: Vec<CopyEntryDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyEntryDeclaration {
    pub from_key: String,
    pub to_key: String,
    pub overwrite_if_to_key_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_when: Option<String>,
}

impl From<&Entry> for CopyEntryDeclaration {
    fn from(entry: &Entry) -> Self {
        let copy_when = entry.copy_when.trim();
        Self {
            from_key: entry.from_key.trim().to_string(),
            to_key: entry.to_key.trim().to_string(),
            overwrite_if_to_key_exists: entry.overwrite_if_exists,
            copy_when: (!copy_when.is_empty()).then(|| copy_when.to_string()),
        }
    }
}

impl From<&Processor> for ProcessorDeclaration {
    fn from(processor: &Processor) -> Self {
        match &processor.kind {
            ProcessorKind::MlInference(cfg) => Self::MlInference(MlInferenceDeclaration {
                model_id: cfg.model_id.trim().to_string(),
                action_type: cfg.action_type,
                provider: cfg.provider,
                output_path: cfg.output_path.trim().to_string(),
                input_key: cfg.input_key.trim().to_string(),
                output_key: cfg.output_key.trim().to_string(),
                condition_expression: cfg.condition_expression.trim().to_string(),
            }),
            ProcessorKind::CopyValues(cfg) => Self::CopyValues(CopyValuesDeclaration {
                entries: cfg.entries.iter().map(CopyEntryDeclaration::from).collect(),
            }),
        }
    }
}

/// Collect every structural problem across the processors, in order.
pub fn validate_processors(processors: &[Processor]) -> ValidationReport {
    ValidationReport::from_violations(processors.iter().flat_map(Processor::violations).collect())
}

/// The ordered processor section of the ingestion document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PipelineDocument {
    pub processors: Vec<ProcessorDeclaration>,
}

impl PipelineDocument {
    /// Convert processors in pipeline order, failing on any invalid one.
    pub fn from_processors(processors: &[Processor]) -> Result<Self, CoreError> {
        validate_processors(processors).into_result()?;
        Ok(Self {
            processors: processors.iter().map(ProcessorDeclaration::from).collect(),
        })
    }
}

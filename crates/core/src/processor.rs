//! Processor kinds, their configuration and per-kind field edits.
//!
//! A processor is one enrichment stage of the ingestion pipeline. The set of
//! kinds is closed: adding a kind means extending [`ProcessorKind`] and every
//! exhaustive match over it.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::CoreError;
use crate::types::ProcessorId;
use crate::validation::FieldViolation;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of entries a single copy-values processor may hold.
pub const MAX_ENTRIES_PER_PROCESSOR: usize = 100;

/// Minimum number of entries a copy-values processor must retain.
pub const MIN_ENTRIES_PER_PROCESSOR: usize = 1;

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// How the ML inference stage invokes the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    BatchPredict,
    Predict,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchPredict => "batch_predict",
            Self::Predict => "predict",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "batch_predict" => Ok(Self::BatchPredict),
            "predict" => Ok(Self::Predict),
            _ => Err(CoreError::Validation(format!(
                "Invalid action_type: '{s}'. Must be one of: batch_predict, predict"
            ))),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ModelProvider
// ---------------------------------------------------------------------------

/// Where the embedding model is hosted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    #[default]
    Sagemaker,
    Bedrock,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sagemaker => "sagemaker",
            Self::Bedrock => "bedrock",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "sagemaker" => Ok(Self::Sagemaker),
            "bedrock" => Ok(Self::Bedrock),
            _ => Err(CoreError::Validation(format!(
                "Invalid provider: '{s}'. Must be one of: sagemaker, bedrock"
            ))),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Kind configurations
// ---------------------------------------------------------------------------

/// Scalar configuration of an ML inference stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlInferenceConfig {
    pub model_id: String,
    pub output_path: String,
    pub action_type: ActionType,
    pub condition_expression: String,
    pub provider: ModelProvider,
    /// Document field holding the text to embed.
    pub input_key: String,
    /// Document field receiving the embedding.
    pub output_key: String,
}

/// A single scalar edit applied to an [`MlInferenceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MlInferenceUpdate {
    ModelId(String),
    OutputPath(String),
    ActionType(ActionType),
    ConditionExpression(String),
    Provider(ModelProvider),
    InputKey(String),
    OutputKey(String),
}

impl MlInferenceUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::ModelId(_) => "model_id",
            Self::OutputPath(_) => "output_path",
            Self::ActionType(_) => "action_type",
            Self::ConditionExpression(_) => "condition_expression",
            Self::Provider(_) => "provider",
            Self::InputKey(_) => "input_key",
            Self::OutputKey(_) => "output_key",
        }
    }
}

impl MlInferenceConfig {
    pub fn with_update(&self, update: MlInferenceUpdate) -> Self {
        let mut next = self.clone();
        match update {
            MlInferenceUpdate::ModelId(v) => next.model_id = v,
            MlInferenceUpdate::OutputPath(v) => next.output_path = v,
            MlInferenceUpdate::ActionType(v) => next.action_type = v,
            MlInferenceUpdate::ConditionExpression(v) => next.condition_expression = v,
            MlInferenceUpdate::Provider(v) => next.provider = v,
            MlInferenceUpdate::InputKey(v) => next.input_key = v,
            MlInferenceUpdate::OutputKey(v) => next.output_key = v,
        }
        next
    }
}

/// Configuration of a copy-values stage. `entries` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyValuesConfig {
    pub entries: Vec<Entry>,
}

impl Default for CopyValuesConfig {
    fn default() -> Self {
        Self {
            entries: vec![Entry::default()],
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessorKind / Processor
// ---------------------------------------------------------------------------

/// Discriminant of [`ProcessorKind`], used where only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKindTag {
    MlInference,
    CopyValues,
}

impl ProcessorKindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MlInference => "ml_inference",
            Self::CopyValues => "copy_values",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "ml_inference" => Ok(Self::MlInference),
            "copy_values" => Ok(Self::CopyValues),
            _ => Err(CoreError::Validation(format!(
                "Invalid processor kind: '{s}'. Must be one of: ml_inference, copy_values"
            ))),
        }
    }
}

impl std::fmt::Display for ProcessorKindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessorKind {
    MlInference(MlInferenceConfig),
    CopyValues(CopyValuesConfig),
}

impl ProcessorKind {
    pub fn tag(&self) -> ProcessorKindTag {
        match self {
            Self::MlInference(_) => ProcessorKindTag::MlInference,
            Self::CopyValues(_) => ProcessorKindTag::CopyValues,
        }
    }

    /// Default configuration for a freshly added processor of `tag`.
    pub fn default_for(tag: ProcessorKindTag) -> Self {
        match tag {
            ProcessorKindTag::MlInference => Self::MlInference(MlInferenceConfig::default()),
            ProcessorKindTag::CopyValues => Self::CopyValues(CopyValuesConfig::default()),
        }
    }
}

/// One configured stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processor {
    pub id: ProcessorId,
    #[serde(flatten)]
    pub kind: ProcessorKind,
}

impl Processor {
    pub fn new(id: ProcessorId, kind: ProcessorKind) -> Self {
        Self { id, kind }
    }

    pub fn tag(&self) -> ProcessorKindTag {
        self.kind.tag()
    }

    pub fn is_ml_inference(&self) -> bool {
        matches!(self.kind, ProcessorKind::MlInference(_))
    }

    /// Entries of a copy-values processor, `None` for other kinds.
    pub fn entries(&self) -> Option<&[Entry]> {
        match &self.kind {
            ProcessorKind::CopyValues(cfg) => Some(&cfg.entries),
            ProcessorKind::MlInference(_) => None,
        }
    }

    /// Borrow the copy-values configuration or reject the call.
    pub fn as_copy_values(&self) -> Result<&CopyValuesConfig, CoreError> {
        match &self.kind {
            ProcessorKind::CopyValues(cfg) => Ok(cfg),
            other => Err(CoreError::InvariantViolation(format!(
                "Processor {} is {}, entries are only supported on copy_values",
                self.id,
                other.tag()
            ))),
        }
    }

    /// Borrow the ML inference configuration or reject the call.
    pub fn as_ml_inference(&self) -> Result<&MlInferenceConfig, CoreError> {
        match &self.kind {
            ProcessorKind::MlInference(cfg) => Ok(cfg),
            other => Err(CoreError::InvariantViolation(format!(
                "Processor {} is {}, not ml_inference",
                self.id,
                other.tag()
            ))),
        }
    }

    /// Collect the structural problems that block serialization.
    pub fn violations(&self) -> Vec<FieldViolation> {
        match &self.kind {
            ProcessorKind::MlInference(cfg) => {
                let mut out = Vec::new();
                if cfg.model_id.trim().is_empty() {
                    out.push(FieldViolation::new(
                        format!("{}.model_id", self.id),
                        "required",
                        "Model ID must not be empty",
                    ));
                }
                out
            }
            ProcessorKind::CopyValues(cfg) => {
                let mut out = Vec::new();
                if cfg.entries.is_empty() {
                    out.push(FieldViolation::new(
                        format!("{}.entries", self.id),
                        "min_length",
                        "Copy values processor needs at least one entry",
                    ));
                }
                for (i, entry) in cfg.entries.iter().enumerate() {
                    out.extend(entry.violations(&format!("{}.entries[{i}]", self.id)));
                }
                out
            }
        }
    }
}

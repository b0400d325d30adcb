//! Handlers for pipeline settings and the rendered definition document.

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use vectorflow_core::access::ServiceAccess;
use vectorflow_core::definition::{DefinitionFormat, DefinitionSettings};
use vectorflow_core::sink::OpenSearchSink;
use vectorflow_core::source::S3Source;
use vectorflow_core::validation::ValidationReport;

use super::pipeline::committed;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DefinitionParams {
    pub format: Option<String>,
}

/// Sink as entered in the form: a known domain name or an endpoint.
#[derive(Debug, Deserialize)]
pub struct SinkInput {
    pub domain: String,
    pub index: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettings {
    pub name: String,
    pub source: Option<S3Source>,
    pub sink: Option<SinkInput>,
    /// Omitted keeps the current service access.
    pub access: Option<ServiceAccess>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: DefinitionSettings,
    pub validation: ValidationReport,
}

/// GET /api/v1/definition?format=json|yaml
///
/// Returns the document itself (not enveloped) with a matching content type.
/// Fails with 422 while settings or processors are incomplete.
pub async fn get_definition(
    State(state): State<AppState>,
    Query(params): Query<DefinitionParams>,
) -> AppResult<impl IntoResponse> {
    let format = match params.format.as_deref() {
        Some(raw) => DefinitionFormat::from_str(raw)?,
        None => DefinitionFormat::default(),
    };

    let definition = state.session.lock().await.build_definition()?;
    let rendered = format.render(&definition)?;

    tracing::debug!(format = format.as_str(), bytes = rendered.len(), "Definition rendered");

    Ok(([(CONTENT_TYPE, format.content_type())], rendered))
}

/// GET /api/v1/definition/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = state.session.lock().await;
    Ok(Json(DataResponse {
        data: SettingsResponse {
            settings: session.settings().clone(),
            validation: session.validate(),
        },
    }))
}

/// PUT /api/v1/definition/settings
///
/// Replaces the settings wholesale. Incomplete settings are stored as a
/// draft; problems are reported in `validation` rather than rejected.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdateSettings>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;

    let access = input
        .access
        .unwrap_or_else(|| session.settings().access.clone());
    let sink = input
        .sink
        .map(|s| OpenSearchSink::from_input(&state.config.known_domains, &s.domain, &s.index));
    let settings = DefinitionSettings {
        name: input.name,
        source: input.source,
        sink,
        access,
    };

    let change = session.replace_settings(settings);
    let validation = session.validate();

    tracing::info!(
        name = %session.settings().name,
        valid = validation.is_valid,
        "Definition settings updated"
    );

    let body = committed(&state, &session, change, Some(validation));
    Ok(Json(DataResponse { data: body }))
}

/// GET /api/v1/definition/validation
pub async fn get_validation(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = state.session.lock().await.validate();
    Ok(Json(DataResponse { data: report }))
}

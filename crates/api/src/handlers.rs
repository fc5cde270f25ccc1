use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ProcessError;
use crate::metrics::MetricsSnapshot;
use crate::pages;
use crate::pipeline::{self, ProcessOutcome, Submission, UploadedFile};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    parser: String,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    #[serde(default = "default_input_type")]
    input_type: String,
    text: Option<String>,
    url: Option<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

pub async fn index() -> Html<String> {
    Html(pages::index_page(None, None))
}

/// Form submission. Failures are shown on the page rather than as an
/// error status.
pub async fn submit(State(state): State<Arc<AppState>>, multipart: Multipart) -> Html<String> {
    let result = match read_form(multipart).await {
        Ok(submission) => pipeline::process(&state, submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => Html(pages::index_page(Some(&outcome), None)),
        Err(e) => Html(pages::index_page(None, Some(&e.to_string()))),
    }
}

async fn read_form(mut multipart: Multipart) -> Result<Submission, ProcessError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProcessError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "input_type" => submission.input_type = read_text(field).await?,
            "text_input" => submission.text = Some(read_text(field).await?),
            "url_input" => submission.url = Some(read_text(field).await?),
            "pdf_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ProcessError::BadRequest(e.body_text()))?;
                submission.pdf = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ProcessError> {
    field
        .text()
        .await
        .map_err(|e| ProcessError::BadRequest(e.body_text()))
}

pub async fn extract_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ProcessOutcome>, ProcessError> {
    let submission = Submission {
        input_type: req.input_type,
        text: req.text,
        url: req.url,
        pdf: None,
    };

    pipeline::process(&state, submission).await.map(Json)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.extractor.parser().health().await {
        Ok(()) => Json(HealthResponse {
            status: "ok".to_string(),
            parser: "ok".to_string(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
                parser: format!("error: {:#}", e),
            }),
        )
            .into_response(),
    }
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Why a submission produced no graph. `Display` is the message shown to
/// the user.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("URL cannot be empty")]
    EmptyUrl,

    #[error("No PDF file selected")]
    NoPdf,

    #[error("No text input provided")]
    EmptyText,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Ingest(anyhow::Error),

    #[error("{0:#}")]
    Extract(anyhow::Error),

    #[error("{0:#}")]
    Render(anyhow::Error),
}

impl ProcessError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyUrl | Self::NoPdf | Self::EmptyText | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Ingest(_) => StatusCode::BAD_GATEWAY,
            Self::Extract(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyUrl | Self::NoPdf | Self::EmptyText | Self::BadRequest(_) => "input",
            Self::Ingest(_) => "ingest",
            Self::Extract(_) => "extract",
            Self::Render(_) => "render",
        }
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ProcessError::EmptyText.to_string(), "No text input provided");
        assert_eq!(ProcessError::EmptyUrl.to_string(), "URL cannot be empty");

        let err = ProcessError::Ingest(anyhow::anyhow!("timed out").context("Failed to fetch http://x/"));
        assert_eq!(err.to_string(), "Failed to fetch http://x/: timed out");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}

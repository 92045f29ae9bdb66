use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error as ThisError;

use crate::types::ApiErrorBody;

/// Unexpected failure while assembling a response.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Internal error: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("Gateway rejected the message with HTTP {status}")]
    Rejected { status: u16, body: ApiErrorBody },

    #[error("Could not reach the gateway: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not sign gateway request: {0}")]
    Signing(String),
}

impl GatewayError {
    /// The payload shown to the user. Anything that is not a gateway rejection
    /// is presented as a top-level message.
    pub fn into_api_error(self) -> ApiErrorBody {
        match self {
            GatewayError::Rejected { body, .. } => body,
            other => ApiErrorBody::from_message(other.to_string()),
        }
    }
}

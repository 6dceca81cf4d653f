//! Mapping from service errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::error;

use crate::quotes::QuoteError;
use crate::trading::TradeError;

pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.").into_response()
}

/// Plain-text body, as the buy form expects.
impl IntoResponse for TradeError {
    fn into_response(self) -> Response {
        let status = match &self {
            TradeError::InvalidShares
            | TradeError::InvalidStopLoss
            | TradeError::PositionTooLarge
            | TradeError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            TradeError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
            TradeError::QuoteUnavailable => StatusCode::BAD_GATEWAY,
            TradeError::UnknownAccount => return Redirect::to("/login").into_response(),
            TradeError::Store(e) => {
                error!(error = %e, "buy failed on storage");
                return internal_error();
            }
        };
        (status, self.to_string()).into_response()
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub fn quote_error_json(e: &QuoteError) -> Response {
    match e {
        QuoteError::NotFound(symbol) => {
            json_error(StatusCode::NOT_FOUND, format!("Symbol '{symbol}' not found"))
        }
        QuoteError::Unavailable(_) => {
            json_error(StatusCode::BAD_GATEWAY, "Quote service unavailable")
        }
    }
}

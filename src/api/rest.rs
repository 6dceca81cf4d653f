//! JSON read endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::error::{json_error, quote_error_json};
use crate::api::routes::AppState;
use crate::api::session::ApiUser;

/// GET /api/portfolio: the caller's account without its password hash.
pub async fn portfolio(State(state): State<AppState>, ApiUser(user): ApiUser) -> Response {
    match state.accounts.summary(&user.email).await {
        Ok(Some(summary)) => Json(summary).into_response(),
        Ok(None) => json_error(StatusCode::UNAUTHORIZED, "Account not found"),
        Err(e) => {
            error!(error = %e, "failed to read account");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Storage error")
        }
    }
}

/// GET /api/quote/{symbol}
pub async fn quote(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    Path(symbol): Path<String>,
) -> Response {
    match state.trading.quote(&symbol).await {
        Ok((symbol, price)) => {
            Json(serde_json::json!({ "symbol": symbol, "price": price })).into_response()
        }
        Err(e) => quote_error_json(&e),
    }
}

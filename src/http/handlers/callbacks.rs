use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};

use crate::domain::callback::{CallbackResolution, GatewayCallback};
use crate::AppState;

/// Endpoint gateway servers redirect users back to, and send behind-the-scenes
/// notify requests to. The query string is opaque gateway payload; the core
/// never interprets it.
pub async fn gateway_callback(
    State(state): State<AppState>,
    Path((identifier, status)): Path<(String, String)>,
    RawQuery(payload): RawQuery,
) -> impl IntoResponse {
    let callback = GatewayCallback {
        identifier,
        status,
        payload,
    };

    match state.callback_dispatcher.dispatch(&callback).await {
        Ok(CallbackResolution::DuplicateRejected) => (
            StatusCode::BAD_REQUEST,
            "Duplicated response from payment gateway",
        )
            .into_response(),
        Ok(CallbackResolution::PaymentNotFound) => {
            (StatusCode::NOT_FOUND, "Payment could not be found.").into_response()
        }
        Ok(CallbackResolution::RedirectSuccess { url })
        | Ok(CallbackResolution::RedirectFailure { url }) => Redirect::to(&url).into_response(),
        Ok(CallbackResolution::Acknowledged) => StatusCode::OK.into_response(),
        Ok(CallbackResolution::InvalidOutcome) => {
            (StatusCode::NOT_FOUND, "Invalid payment url.").into_response()
        }
        Err(err) => {
            tracing::error!("callback dispatch failed: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

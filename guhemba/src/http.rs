//! Axum boundary: renders gateway outcomes as HTTP responses so handlers
//! can return [`Payment`], [`GatewayRedirect`] or a raised [`GatewayError`]
//! directly.

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::{GatewayError, NormalizedError};
use crate::gateway::{GatewayRedirect, Payment};

impl IntoResponse for NormalizedError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.normalized().into_response()
    }
}

impl IntoResponse for Payment {
    fn into_response(self) -> Response {
        match self.into_result() {
            Ok(response) => Json(response).into_response(),
            Err(error) => error.into_response(),
        }
    }
}

impl IntoResponse for GatewayRedirect {
    fn into_response(self) -> Response {
        Redirect::to(self.url.as_str()).into_response()
    }
}

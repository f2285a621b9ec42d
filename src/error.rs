use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy of the order lifecycle engine. Every variant has a
/// stable machine-readable kind next to its human-readable message.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: String },

    #[error("reservation retries exhausted, try again")]
    Contention,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("order has already been paid")]
    AlreadyPaid,

    #[error("{0}")]
    EscrowNotReleasable(String),

    #[error("order was modified concurrently, re-read and retry")]
    Conflict,
}

impl OrderError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::InvalidArgument(_) => "invalid_argument",
            OrderError::Unauthorized(_) => "unauthorized",
            OrderError::NotFound(_) => "not_found",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::Contention => "contention",
            OrderError::InvalidTransition(_) => "invalid_transition",
            OrderError::AlreadyPaid => "already_paid",
            OrderError::EscrowNotReleasable(_) => "escrow_not_releasable",
            OrderError::Conflict => "conflict",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            OrderError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            OrderError::Unauthorized(_) => StatusCode::FORBIDDEN,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Contention => StatusCode::SERVICE_UNAVAILABLE,
            OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition(_)
            | OrderError::AlreadyPaid
            | OrderError::EscrowNotReleasable(_)
            | OrderError::Conflict => StatusCode::CONFLICT,
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => OrderError::NotFound("record not found".to_string()),
            StoreError::VersionMismatch => OrderError::Conflict,
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

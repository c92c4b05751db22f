use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient deposit: {0}")]
    InsufficientDeposit(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Contract query failed: {0}")]
    ContractQueryFailed(String),

    #[error("Contract not initialized: {0}")]
    ContractNotInitialized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("ABI error: {0}")]
    Abi(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            AppError::InsufficientDeposit(_) => (StatusCode::BAD_REQUEST, "INSUFFICIENT_DEPOSIT"),
            AppError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ContractQueryFailed(_) => (StatusCode::BAD_GATEWAY, "CONTRACT_QUERY_FAILED"),
            AppError::ContractNotInitialized(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CONTRACT_NOT_INITIALIZED",
            ),
            AppError::Abi(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ABI_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::InvalidAmount(ref msg)
            | AppError::InsufficientDeposit(ref msg)
            | AppError::InvalidAddress(ref msg)
            | AppError::ContractQueryFailed(ref msg)
            | AppError::ContractNotInitialized(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::BadRequest(ref msg) => msg.clone(),
            AppError::Abi(_) => self.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

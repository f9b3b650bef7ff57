//! Error handling for the Restaurant Stock Management Platform
//!
//! Provides consistent error responses in Thai and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::catalog::CatalogError;
use shared::models::StockCheck;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_th: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_th: String,
    },

    // Catalog configuration errors (cyclic recipe, empty recipe,
    // dangling component reference) are fatal for the operation
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // Raised only when the blocking insufficiency policy is active
    #[error("Insufficient stock for {} product(s)", .checks.len())]
    InsufficientStock { checks: Vec<StockCheck> },

    // Day bookkeeping errors
    #[error("Invalid day transition: {0}")]
    InvalidDayTransition(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<StockCheck>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_th: message_th.clone(),
                    field: Some(field.clone()),
                    checks: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_th: format!("ไม่พบ {}", resource),
                    field: None,
                    checks: None,
                },
            ),
            AppError::Conflict {
                resource,
                message,
                message_th,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_th: message_th.clone(),
                    field: Some(resource.clone()),
                    checks: None,
                },
            ),
            AppError::Catalog(err) => {
                let code = match err {
                    CatalogError::RecipeCycle(_) => "RECIPE_CYCLE",
                    CatalogError::EmptyRecipe(_) => "EMPTY_RECIPE",
                    CatalogError::UnknownComponent { .. } => "UNKNOWN_COMPONENT",
                    CatalogError::NonPositiveComponentQuantity { .. } => {
                        "INVALID_COMPONENT_QUANTITY"
                    }
                    CatalogError::UnknownProduct(_) => "UNKNOWN_PRODUCT",
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorDetail {
                        code: code.to_string(),
                        message_en: err.to_string(),
                        message_th: format!("เกิดข้อผิดพลาดในการตั้งค่าสูตรสินค้า: {}", err),
                        field: None,
                        checks: None,
                    },
                )
            }
            AppError::InsufficientStock { checks } => {
                let names: Vec<&str> = checks
                    .iter()
                    .map(|c| c.product_name.as_str())
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorDetail {
                        code: "INSUFFICIENT_STOCK".to_string(),
                        message_en: format!("Insufficient stock: {}", names.join(", ")),
                        message_th: format!("สินค้าคงคลังไม่เพียงพอ: {}", names.join(", ")),
                        field: None,
                        checks: Some(checks.clone()),
                    },
                )
            }
            AppError::InvalidDayTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_DAY_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ไม่สามารถเปลี่ยนสถานะวันได้: {}", msg),
                    field: None,
                    checks: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดกับฐานข้อมูล".to_string(),
                    field: None,
                    checks: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                    checks: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                    checks: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

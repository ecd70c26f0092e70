use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Required input missing or malformed; the message goes back to the caller as-is.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Vendor not found")]
    VendorNotFound,

    #[error("Product with ID {0} not found")]
    ProductNotFound(Uuid),

    #[error("Sale not found")]
    SaleNotFound,

    #[error("Purchase not found")]
    PurchaseNotFound,

    #[error("Notification not found")]
    NotificationNotFound,

    #[error("Product \"{product}\" does not belong to vendor \"{vendor}\"")]
    VendorMismatch { product: String, vendor: String },

    #[error("Insufficient stock for product \"{product}\". Available: {available}")]
    InsufficientStock { product: String, available: i32 },

    #[error("E-mail already in use")]
    EmailAlreadyExists,

    #[error("SKU already exists")]
    SkuAlreadyExists,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User is inactive or suspended")]
    UserInactive,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Forbidden(String),

    /// The last stored document number could not be parsed; numbering refuses to guess.
    #[error("Cannot derive next document number from \"{0}\"")]
    CorruptDocumentNumber(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Report rendering failed: {0}")]
    ReportRender(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Already logged with its context where it happened; the response
    /// conversion does not log it again.
    #[error(transparent)]
    Reported(Box<AppError>),
}

impl AppError {
    pub fn insufficient_stock(product: &str, available: i32) -> Self {
        AppError::InsufficientStock {
            product: product.to_string(),
            available,
        }
    }

    /// Marks the error as logged.
    pub fn reported(self) -> Self {
        match self {
            AppError::Reported(_) => self,
            other => AppError::Reported(Box::new(other)),
        }
    }

    /// The underlying error, looking through `Reported`.
    pub fn cause(&self) -> &AppError {
        match self {
            AppError::Reported(inner) => inner.cause(),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Reported(inner) => inner.status_code(),
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::VendorMismatch { .. }
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::VendorNotFound
            | AppError::ProductNotFound(_)
            | AppError::SaleNotFound
            | AppError::PurchaseNotFound
            | AppError::NotificationNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::SkuAlreadyExists | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserInactive | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error came from rejected input rather than from the server.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Formats a money amount the way it is shown to people (two decimals).
pub fn display_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Field messages keyed by path, nested lines included (`items[0].quantity`).
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut details = BTreeMap::new();
    collect_details("", errors, &mut details);
    details
}

fn collect_details(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(nested) => collect_details(&path, nested, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect_details(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

impl AppError {
    fn respond(self, log_server_error: bool) -> Response {
        let status = self.status_code();

        let message = match self {
            // Returns every field error so the front-end can highlight them.
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": validation_details(&errors),
                }));
                return (status, body).into_response();
            }
            ref e if status.is_server_error() => {
                if log_server_error {
                    tracing::error!("Internal server error: {}", e);
                }
                "An unexpected error occurred.".to_string()
            }
            e => e.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Reported(inner) => inner.respond(false),
            other => other.respond(true),
        }
    }
}

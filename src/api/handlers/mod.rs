pub mod auth;
pub mod weather;

use crate::error::AppError;

/// Fallback for unmatched routes. Anonymous callers never get here (policy default-deny).
pub async fn not_found() -> AppError {
    AppError::not_found("route")
}

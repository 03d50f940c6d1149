/**
 * Routes Module
 * Public page handlers, the admin JSON API and health probes
 */
pub mod admin;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod health;
pub mod pages;
pub mod site;
pub mod subscribe;
pub mod upload;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Error body shared by every JSON endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            message: None,
        }),
    )
}

/// Map a repository failure onto an API status. Database faults are logged here and
/// reported generically.
pub fn store_api_error(e: StoreError) -> ApiError {
    match e {
        StoreError::Conflict { .. } => api_error(StatusCode::CONFLICT, e.to_string()),
        StoreError::MissingReference(_) | StoreError::Invalid(_) => {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        }
        StoreError::Database(ref inner) => {
            tracing::error!(error = %inner, "database error in admin API");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_statuses() {
        let (status, Json(body)) = store_api_error(StoreError::Conflict {
            entity: "page",
            field: "slug",
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "page with this slug already exists");

        let (status, _) = store_api_error(StoreError::MissingReference("account"));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) =
            store_api_error(StoreError::Invalid("value too long for type".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "value too long for type");

        let (status, Json(body)) = store_api_error(StoreError::Database(sqlx::Error::PoolClosed));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Database error");
    }
}

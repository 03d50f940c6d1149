use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views;

/// Failure of a repository operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the row.
    #[error("{entity} with this {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },
    /// A foreign key pointed at a row that does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
    /// The row was rejected by a column limit or range check.
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// SQLSTATE 22001 (string too long) and 22003 (numeric out of range).
const DATA_EXCEPTION_CODES: &[&str] = &["22001", "22003"];

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db
                .code()
                .is_some_and(|code| DATA_EXCEPTION_CODES.contains(&&*code))
            {
                return StoreError::Invalid(db.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Failure of a public HTML handler.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::not_found().into_string())).into_response()
            }
            PageError::Store(e) => {
                tracing::error!(error = %e, "store failure while rendering page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::server_error().into_string()),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_entity_and_field() {
        let e = StoreError::Conflict {
            entity: "page",
            field: "slug",
        };
        assert!(e.is_conflict());
        assert_eq!(e.to_string(), "page with this slug already exists");
    }

    #[test]
    fn test_not_found_renders_404() {
        let res = PageError::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_failure_renders_500() {
        let res = PageError::Store(StoreError::Database(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

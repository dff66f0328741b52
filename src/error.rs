use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Failures of the schema/import core. Per-row reference misses during an
/// import are not errors; they are reported in the `ImportReport`.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("database is unreachable: {0}")]
    Connectivity(#[source] sea_orm::DbErr),

    #[error("schema reset failed: {0}")]
    Schema(#[source] sea_orm::DbErr),

    #[error("import aborted: {0}")]
    Import(#[source] sea_orm::DbErr),

    #[error("could not read {}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

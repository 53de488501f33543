// HTTP error type; messages are localized before the error is built
use crate::application::session_service::DeleteError;
use crate::domain::i18n::Translator;
use crate::domain::settings::SettingsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// The team exists but has no running pollers (settings incomplete).
    #[error("{0}")]
    NotConfigured(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
    #[error("response encoding failed")]
    Encoding(StatusCode),
}

impl AppError {
    pub fn settings(err: SettingsError, tr: &Translator) -> Self {
        match err {
            SettingsError::Incomplete => AppError::BadRequest(tr.t("dashboard.alert.fillAll")),
            SettingsError::Storage(reason) => {
                tracing::error!("Settings storage error: {}", reason);
                AppError::Internal(reason)
            }
        }
    }

    pub fn delete(err: DeleteError, tr: &Translator) -> Self {
        match err {
            DeleteError::MissingSessionId => {
                AppError::BadRequest(tr.t("session.delete.missingId"))
            }
            DeleteError::Rejected(reason) => {
                AppError::Upstream(tr.translate("session.delete.failed", &[("reason", &reason)]))
            }
            DeleteError::Network(reason) => {
                AppError::Upstream(tr.translate("session.delete.network", &[("reason", &reason)]))
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotConfigured(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Encoding(status) => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(serde_json::json!({ "ok": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

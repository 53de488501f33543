// Session service - Use case for deleting a backend session
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DeleteError {
    #[error("session id is required")]
    MissingSessionId,
    /// The backend answered with a non-2xx status; carries its body text.
    #[error("delete rejected: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Clone)]
pub struct SessionService {
    api: Arc<dyn TelemetryApi>,
}

impl SessionService {
    pub fn new(api: Arc<dyn TelemetryApi>) -> Self {
        Self { api }
    }

    pub async fn delete(&self, session_id: &str, password: &str) -> Result<(), DeleteError> {
        if session_id.trim().is_empty() {
            return Err(DeleteError::MissingSessionId);
        }

        match self.api.delete_session(session_id, password).await {
            Ok(()) => {
                tracing::info!("Deleted session {}", session_id);
                Ok(())
            }
            Err(ApiError::Status { status, body }) => {
                tracing::warn!("Delete of session {} rejected with {}", session_id, status);
                Err(DeleteError::Rejected(body))
            }
            Err(e) => {
                tracing::error!("Delete session error: {}", e);
                Err(DeleteError::Network(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeApi, Scripted};

    #[tokio::test]
    async fn test_blank_session_is_rejected_locally() {
        let service = SessionService::new(Arc::new(FakeApi::new()));
        assert_eq!(service.delete("   ", "pw").await, Err(DeleteError::MissingSessionId));
    }

    #[tokio::test]
    async fn test_backend_body_is_surfaced() {
        let api = Arc::new(FakeApi::new());
        api.set_delete(Scripted::Status(403, "wrong password".to_string())).await;

        let service = SessionService::new(api);
        assert_eq!(
            service.delete("s1", "nope").await,
            Err(DeleteError::Rejected("wrong password".to_string()))
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let api = Arc::new(FakeApi::new());
        api.set_delete(Scripted::Down).await;

        let service = SessionService::new(api);
        assert!(matches!(service.delete("s1", "pw").await, Err(DeleteError::Network(_))));
    }

    #[tokio::test]
    async fn test_delete_succeeds() {
        let service = SessionService::new(Arc::new(FakeApi::new()));
        assert_eq!(service.delete("s1", "pw").await, Ok(()));
    }
}

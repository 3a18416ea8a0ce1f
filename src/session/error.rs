use crate::domain_port::TransportError;

/// Failure surfaced by [`ApiClient`](crate::session::ApiClient) calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// No response came back.
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// The request was unauthorized and the session could not be renewed.
    /// Carries the original unauthorized response.
    #[error("session expired (status {status})")]
    SessionExpired { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::SessionExpired { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (400..500).contains(status))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status >= 500)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Outcome of a failed token refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingToken,
    #[error("refresh rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("refresh request failed: {0}")]
    Network(TransportError),
    #[error("invalid refresh response: {0}")]
    Decode(String),
}

impl RefreshError {
    /// Terminal failures end the session; a network failure leaves it intact.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RefreshError::Network(_))
    }
}

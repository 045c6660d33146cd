use crate::errors::GantryError;
use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No base repository selected")]
    NoBaseRepository,

    #[error("Unknown session '{session_id}'")]
    UnknownSession { session_id: String },

    #[error("Backend command failed: {message}")]
    Backend { message: String },
}

impl GantryError for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NoBaseRepository => "NO_BASE_REPOSITORY",
            SessionError::UnknownSession { .. } => "UNKNOWN_SESSION",
            SessionError::Backend { .. } => "BACKEND_COMMAND_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SessionError::NoBaseRepository | SessionError::UnknownSession { .. }
        )
    }
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        SessionError::Backend {
            message: err.message().to_string(),
        }
    }
}

// errors.rs
use thiserror::Error;

/// Everything that can go wrong between the form, the local store and the
/// remote ArcGIS services.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Transport failure, timeout or abort while talking to a remote service.
    #[error("Network error: {0}")]
    Network(String),
    /// The service answered, but with an `error` body or a failed edit result.
    #[error("Service error: {0}")]
    Service(String),
    /// Missing or malformed user input. Never reaches the network.
    #[error("{0}")]
    Validation(String),
    /// The sale has no placed location yet.
    #[error("{0}")]
    Geometry(String),
    #[error("Database Error: {0}")]
    Db(String),
    #[error("Export Error: {0}")]
    Export(String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    /// Remote failures worth another attempt on read.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdminError::Network(_) | AdminError::Service(_))
    }

    /// Errors the user caused and can fix from the form.
    pub fn is_user_input(&self) -> bool {
        matches!(self, AdminError::Validation(_) | AdminError::Geometry(_))
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AdminError::Network(format!("request timed out: {e}"))
        } else {
            AdminError::Network(e.to_string())
        }
    }
}

impl From<rusqlite::Error> for AdminError {
    fn from(e: rusqlite::Error) -> Self {
        AdminError::Db(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_failures_are_retryable() {
        assert!(AdminError::Network("reset".into()).is_retryable());
        assert!(AdminError::Service("400".into()).is_retryable());
        assert!(!AdminError::Validation("Address is required".into()).is_retryable());
        assert!(!AdminError::Geometry("no pin".into()).is_retryable());
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = AdminError::Validation("Address is required".into());
        assert_eq!(err.to_string(), "Address is required");
        assert!(err.is_user_input());
    }
}

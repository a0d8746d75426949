use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Subject does not exist or is not a seeker
    #[error("Invalid subject: {0}")]
    InvalidSubject(Uuid),

    /// A collaborator read or write failed
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn collaborator(context: &str, err: impl std::fmt::Display) -> Self {
        AppError::Collaborator(format!("{}: {}", context, err))
    }

    /// Whether the error identifies a bad subject rather than a failing dependency
    pub fn is_invalid_subject(&self) -> bool {
        matches!(self, AppError::InvalidSubject(_))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Redis(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<envy::Error> for AppError {
    fn from(err: envy::Error) -> Self {
        AppError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_context() {
        let err = AppError::collaborator("fetch_wallet", "connection reset");
        assert_eq!(
            err.to_string(),
            "Collaborator error: fetch_wallet: connection reset"
        );
        assert!(!err.is_invalid_subject());
    }

    #[test]
    fn test_invalid_subject_flag() {
        let err = AppError::InvalidSubject(Uuid::nil());
        assert!(err.is_invalid_subject());
    }
}

//! Error types for update generation, delivery, and local state
//!
//! Errors are classified by who can fix them:
//! - Retryable: the agent declined or the transport failed
//! - RequiresUserAction: a precondition the user has to satisfy first
//! - Absorbed: persistence and serialization problems the session survives

use thiserror::Error;

/// Fallback when a transport error carries no message.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Error types for the update lifecycle
#[derive(Debug, Error)]
pub enum PulseError {
    // Retryable errors
    #[error("{0}")]
    DeclaredFailure(String),

    #[error("{0}")]
    Transport(String),

    // Requires user action
    #[error("{0}")]
    Precondition(String),

    // Absorbed by the session
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl PulseError {
    /// Build a transport error, substituting the generic message for a blank one.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            PulseError::Transport(UNEXPECTED_ERROR_MESSAGE.to_string())
        } else {
            PulseError::Transport(message)
        }
    }

    /// Returns true if re-invoking the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PulseError::DeclaredFailure(_) | PulseError::Transport(_)
        )
    }

    /// Returns true if the user has to change something before retrying
    pub fn requires_user_action(&self) -> bool {
        matches!(self, PulseError::Precondition(_) | PulseError::Config(_))
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PulseError::DeclaredFailure(_) => "The agent could not complete the request. Try again.",
            PulseError::Transport(_) => "Check your connection to the agent endpoint and try again.",
            PulseError::Precondition(_) => "Fill in the missing input and try again.",
            PulseError::Persistence(_) => "Local storage is unavailable. Changes last for this session only.",
            PulseError::Serialization(_) => "The update could not be encoded.",
            PulseError::Config(_) => "Check your configuration in ~/.productpulse/config.json",
            PulseError::Io(_) => "Check file permissions and disk space.",
        }
    }
}

impl From<std::io::Error> for PulseError {
    fn from(err: std::io::Error) -> Self {
        PulseError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        PulseError::Serialization(err.to_string())
    }
}

/// Serializable error representation for display
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Retryable,
    RequiresUserAction,
    Absorbed,
}

impl From<&PulseError> for OutcomeError {
    fn from(err: &PulseError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::Absorbed
        };

        OutcomeError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_failure_displays_raw_message() {
        let err = PulseError::DeclaredFailure("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_blank_transport_message_falls_back() {
        let err = PulseError::transport("   ");
        assert_eq!(err.to_string(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_outcome_error_classification() {
        let precondition = OutcomeError::from(&PulseError::Precondition("x".into()));
        assert_eq!(precondition.error_type, ErrorType::RequiresUserAction);
        assert!(!precondition.can_retry);

        let persistence = OutcomeError::from(&PulseError::Persistence("disk full".into()));
        assert_eq!(persistence.error_type, ErrorType::Absorbed);
        assert_eq!(persistence.message, "Persistence error: disk full");
    }
}

//! Error types for Carelink.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarelinkError {
    #[error("A turn is already in progress")]
    TurnInProgress,

    #[error("User input is empty")]
    EmptyInput,

    #[error("Unknown sub-agent: {0}")]
    UnknownSubAgent(String),

    #[error("Resolver contract violation: {0}")]
    ResolverContract(String),

    #[error("Resolver transport error: {0}")]
    ResolverTransport(String),

    #[error("LLM API error {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CarelinkError {
    /// Failures that originate outside the process (network, remote service).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CarelinkError::ResolverTransport(_) | CarelinkError::LlmStatus { .. }
        )
    }

    /// Whether a transport-level retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CarelinkError::ResolverTransport(_) => true,
            CarelinkError::LlmStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CarelinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify_retryability() {
        let rate_limited = CarelinkError::LlmStatus {
            status: 429,
            body: "slow down".into(),
        };
        let unavailable = CarelinkError::LlmStatus {
            status: 503,
            body: String::new(),
        };
        let unauthorized = CarelinkError::LlmStatus {
            status: 401,
            body: "bad key".into(),
        };

        assert!(rate_limited.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(unauthorized.is_transport());
    }

    #[test]
    fn contract_errors_are_not_transport() {
        let err = CarelinkError::ResolverContract("two delegations".into());
        assert!(!err.is_transport());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Resolver contract violation: two delegations"
        );
    }
}

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A response object was assembled with fields that disagree with each other
    #[error("Contract violation: {message}")]
    Contract { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    /// Check if this error is a contract violation
    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Answer 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Answer 'abc' not found");
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("openai", "timeout");
        assert_eq!(error.to_string(), "Provider error: openai - timeout");
    }

    #[test]
    fn test_contract_error() {
        let error = DomainError::contract("answer_style mismatch");
        assert!(error.is_contract());
        assert_eq!(error.to_string(), "Contract violation: answer_style mismatch");
        assert!(!DomainError::validation("x").is_contract());
    }
}

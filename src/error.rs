//! Error types for allot.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for allot operations.
#[derive(Error, Debug)]
pub enum AllotError {
    /// User provided invalid arguments or input files could not be read.
    #[error("{0}")]
    UserError(String),

    /// Configuration or catalog file failed to parse or validate.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An agent id was looked up but is not in the catalog.
    #[error("agent '{id}' not found. Available agents: {available}")]
    AgentNotFound { id: String, available: String },

    /// A registry was built with no agents at all.
    #[error("agent catalog is empty; load the registry with AgentRegistry::load")]
    EmptyCatalog,
}

impl AllotError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AllotError::UserError(_) => exit_codes::USER_ERROR,
            AllotError::ConfigError(_) => exit_codes::CONFIG_ERROR,
            AllotError::AgentNotFound { .. } => exit_codes::NOT_FOUND,
            AllotError::EmptyCatalog => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for allot operations.
pub type Result<T> = std::result::Result<T, AllotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = AllotError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = AllotError::ConfigError("bad yaml".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn not_found_has_correct_exit_code() {
        let err = AllotError::AgentNotFound {
            id: "security-agent".to_string(),
            available: "general".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = AllotError::AgentNotFound {
            id: "security-agent".to_string(),
            available: "infra, ui".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "agent 'security-agent' not found. Available agents: infra, ui"
        );

        let err = AllotError::ConfigError("version 7 is not supported".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: version 7 is not supported"
        );
    }
}

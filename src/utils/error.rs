use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Amount not found in message")]
    AmountNotFound,

    #[error("Expense service rejected the expense: {}", .errors.join("; "))]
    ExpenseRejected { errors: Vec<String> },

    #[error("Expense service request failed: {0}")]
    ExpenseServiceTransport(#[from] reqwest::Error),

    #[error("Expense service rejected credentials (HTTP {status})")]
    ExpenseServiceUnauthorized { status: u16 },

    #[error("Expense service returned HTTP {status}: {body}")]
    ExpenseServiceStatus { status: u16, body: String },

    #[error("Malformed expense service response: {message}")]
    MalformedResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl RelayError {
    /// Errors caused by the caller's input rather than by this process or the
    /// expense service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::AmountNotFound
                | RelayError::ExpenseRejected { .. }
                | RelayError::ValidationError { .. }
        )
    }

    /// Faults talking to the expense service.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            RelayError::ExpenseServiceTransport(_)
                | RelayError::ExpenseServiceUnauthorized { .. }
                | RelayError::ExpenseServiceStatus { .. }
                | RelayError::MalformedResponse { .. }
        )
    }

    /// Message safe to hand back to a webhook caller or print on the console.
    pub fn user_friendly_message(&self) -> String {
        match self {
            RelayError::AmountNotFound => self.to_string(),
            RelayError::ValidationError { message } => message.clone(),
            RelayError::ExpenseRejected { errors } => errors.join("; "),
            RelayError::ExpenseServiceTransport(e) if e.is_timeout() => {
                "Expense service timed out".to_string()
            }
            RelayError::ExpenseServiceTransport(_) => "Expense service unreachable".to_string(),
            RelayError::ExpenseServiceUnauthorized { .. } => {
                "Expense service rejected the configured credentials".to_string()
            }
            RelayError::ExpenseServiceStatus { status, .. } => {
                format!("Expense service returned HTTP {}", status)
            }
            RelayError::MalformedResponse { .. } => {
                "Expense service returned an unexpected response".to_string()
            }
            RelayError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            RelayError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            RelayError::ConfigError { message } => message.clone(),
            RelayError::TomlError(_) => "Configuration file could not be parsed".to_string(),
            RelayError::IoError(_) => "Internal error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_not_found_message_is_fixed() {
        let err = RelayError::AmountNotFound;
        assert_eq!(err.to_string(), "Amount not found in message");
        assert_eq!(err.user_friendly_message(), "Amount not found in message");
        assert!(err.is_client_error());
        assert!(!err.is_upstream_error());
    }

    #[test]
    fn test_upstream_classification() {
        let err = RelayError::ExpenseServiceUnauthorized { status: 401 };
        assert!(err.is_upstream_error());
        assert!(!err.is_client_error());

        let err = RelayError::ExpenseServiceStatus {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert!(err.is_upstream_error());
        assert_eq!(err.user_friendly_message(), "Expense service returned HTTP 503");
    }
}

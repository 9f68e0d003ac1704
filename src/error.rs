use thiserror::Error;

use crate::payments::types::PaymentMethod;

pub type IuguResult<T> = Result<T, IuguError>;

/// Errors raised by the Iugu client.
///
/// Validation failures are detected before any network call is attempted, so a
/// request is never partially submitted.
#[derive(Debug, Error)]
pub enum IuguError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request path: '{path}'")]
    InvalidRequestPath { path: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Timeout error: operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Unexpected gateway response (HTTP {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },
}

/// Caller-input errors for builder setters and the charge/invoice assemblers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Payment method must be '{expected}' for this operation, got '{actual}'")]
    MethodMismatch {
        expected: PaymentMethod,
        actual: PaymentMethod,
    },

    #[error("Card token is missing; tokenize a credit card first")]
    MissingToken,

    #[error("Payment method '{method}' is not supported for {operation}")]
    UnsupportedMethod { method: String, operation: String },

    #[error("At least one item is required")]
    NoItems,

    #[error("A payer is required for payment method '{method}'")]
    MissingPayer { method: PaymentMethod },

    #[error("Order id must be greater than zero, got {order_id}")]
    InvalidOrderId { order_id: i64 },

    #[error("Invalid or missing e-mail: '{email}'")]
    InvalidEmail { email: String },

    #[error("Invalid due date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Option '{option}' has an invalid type or value")]
    InvalidOptionType { option: String },

    #[error("Installment count must be at most 12, got {months}")]
    InvalidInstallmentCount { months: u32 },

    #[error("Invalid item: {reason}")]
    InvalidItem { reason: String },

    #[error("Custom variable name and value must not be empty")]
    InvalidCustomVariable,

    #[error("Invalid early payment discount: {reason}")]
    InvalidDiscount { reason: String },
}

impl IuguError {
    /// Missing or invalid credentials, endpoint or HTTP client settings
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Empty path, or one that does not resolve against the endpoint template
    pub fn invalid_request_path(path: impl Into<String>) -> Self {
        Self::InvalidRequestPath { path: path.into() }
    }

    /// Connection-level failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Body that could not be encoded or decoded as JSON
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Gateway reply that lacks a field the operation depends on
    pub fn unexpected_response(status: u16, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status,
            message: message.into(),
        }
    }

    /// True for failures of the HTTP exchange itself, as opposed to caller input
    /// or configuration problems.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::Serialization { .. }
                | Self::UnexpectedResponse { .. }
        )
    }

    /// True for caller-input errors detected before any request is sent
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validation failure, if this is one
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl ValidationError {
    pub fn unsupported_method(method: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
            operation: operation.into(),
        }
    }

    pub fn invalid_item(reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            reason: reason.into(),
        }
    }

    pub fn invalid_discount(reason: impl Into<String>) -> Self {
        Self::InvalidDiscount {
            reason: reason.into(),
        }
    }

    pub fn invalid_option_type(option: impl Into<String>) -> Self {
        Self::InvalidOptionType {
            option: option.into(),
        }
    }
}

impl From<reqwest::Error> for IuguError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            // reqwest does not report the configured duration
            IuguError::Timeout { seconds: 0 }
        } else if err.is_builder() {
            IuguError::configuration(format!("HTTP client error: {}", err))
        } else {
            IuguError::network(format!("Request error: {}", err))
        }
    }
}

impl From<serde_json::Error> for IuguError {
    fn from(err: serde_json::Error) -> Self {
        IuguError::serialization(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for IuguError {
    fn from(err: config::ConfigError) -> Self {
        IuguError::configuration(err.to_string())
    }
}

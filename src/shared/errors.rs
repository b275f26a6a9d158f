//! Error handling for the application

use thiserror::Error;

/// Errors returned by the external collaborators (wallet, RPC, aggregator)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No trade route found")]
    NoRoute,

    #[error("Wallet error: {0}")]
    Wallet(String),
}

impl ServiceError {
    /// HTTP status carried by the failure, if the remote side answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if let Some(status) = err.status() {
            ServiceError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Input-side errors raised while editing the form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    #[error("Invalid Sui address: {0}")]
    InvalidAddress(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_only_reported_for_http_failures() {
        let http = ServiceError::Status {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(http.status(), Some(429));
        assert_eq!(ServiceError::Timeout.status(), None);
        assert_eq!(ServiceError::NoRoute.status(), None);
    }

    #[test]
    fn test_form_error_messages() {
        assert_eq!(
            FormError::UnknownCommand("buy 3".to_string()).to_string(),
            "Unknown command: buy 3"
        );
        assert_eq!(
            FormError::InvalidNumber(".".to_string()).to_string(),
            "Invalid number: \".\""
        );
    }
}

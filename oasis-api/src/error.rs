use thiserror::Error;

/// Transport-level errors for Oasis device and cloud exchanges
///
/// This enum covers every way a single request/response exchange can fail.
/// Retry policy is intentionally absent here: the client never retries, the
/// caller decides what a failure means for it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// The device or cloud service could not be reached: connection refused,
    /// DNS failure, or the socket dropped mid-exchange.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The exchange exceeded the configured connect or read timeout
    #[error("Request timed out")]
    Timeout,

    /// Response violates the wire contract
    ///
    /// The endpoint answered, but with a non-success HTTP status or a payload
    /// that does not parse as a valid status line / JSON document.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A command parameter is outside the range the device accepts
    ///
    /// Raised before any request is made, so an invalid value never reaches
    /// the device.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Cloud credentials are missing or were rejected
    ///
    /// Only cloud calls produce this; device control never authenticates.
    #[error("Cloud authentication rejected or missing credentials")]
    Auth,
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_connect() || error.is_request() {
            ApiError::Connection(error.to_string())
        } else if error.is_decode() {
            ApiError::Protocol(error.to_string())
        } else {
            ApiError::Connection(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Connection("connection refused".to_string());
        assert_eq!(format!("{}", err), "Connection error: connection refused");

        let err = ApiError::Protocol("HTTP 500".to_string());
        assert_eq!(format!("{}", err), "Protocol error: HTTP 500");

        assert_eq!(format!("{}", ApiError::Timeout), "Request timed out");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ApiError::InvalidParameter("ball speed 50 out of range".to_string());
        assert!(format!("{}", err).contains("ball speed 50"));
    }
}

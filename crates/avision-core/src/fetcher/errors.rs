use crate::errors::AvisionError;

/// Failure class of a single poll.
///
/// The scheduler treats all of them the same way; the distinction is kept
/// for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection refused, reset, DNS failure or a transport timeout.
    Network,
    /// The service answered with a non-success status code.
    HttpStatus(u16),
    /// The body was not a valid snapshot.
    Parse,
}

/// A failed poll, tagged with the base URL that was in effect when the
/// request was issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
    pub base_url: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>, base_url: &str) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            message: message.into(),
            base_url: base_url.to_string(),
        }
    }

    pub fn http_status(status: u16, base_url: &str) -> Self {
        Self {
            kind: FetchErrorKind::HttpStatus(status),
            message: format!("HTTP {}", status),
            base_url: base_url.to_string(),
        }
    }

    pub fn parse(message: impl Into<String>, base_url: &str) -> Self {
        Self {
            kind: FetchErrorKind::Parse,
            message: message.into(),
            base_url: base_url.to_string(),
        }
    }

    /// Message shown on the diagnostic banner: `<message> @ <base_url>`.
    pub fn diagnostic(&self) -> String {
        format!("{} @ {}", self.message, self.base_url)
    }
}

impl AvisionError for FetchError {
    fn error_code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Network => "FETCH_NETWORK_ERROR",
            FetchErrorKind::HttpStatus(_) => "FETCH_HTTP_STATUS_ERROR",
            FetchErrorKind::Parse => "FETCH_PARSE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let error = FetchError::http_status(503, "http://host:5000");
        assert_eq!(error.to_string(), "HTTP 503");
        assert_eq!(error.kind, FetchErrorKind::HttpStatus(503));
        assert_eq!(error.error_code(), "FETCH_HTTP_STATUS_ERROR");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_diagnostic_includes_base_url() {
        let error = FetchError::network("connection refused", "http://host:5000");
        assert_eq!(error.diagnostic(), "connection refused @ http://host:5000");
        assert_eq!(error.error_code(), "FETCH_NETWORK_ERROR");
    }

    #[test]
    fn test_parse_error_code() {
        let error = FetchError::parse("expected value at line 1", "http://h");
        assert_eq!(error.error_code(), "FETCH_PARSE_ERROR");
    }
}

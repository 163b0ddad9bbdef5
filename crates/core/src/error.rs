//! Structured errors for the nutrition API boundary.
//!
//! Callers branch on [`ApiError::kind`] or [`ApiError::status`] instead of
//! searching the rendered message for a status code.

/// Error produced while building, sending or decoding an API call
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Http,
    Transport,
    Decode,
    InvalidRequest,
}

impl ApiError {
    /// Build a status error from a non-2xx response.
    ///
    /// An empty body falls back to the reason phrase so the message is never
    /// just `API error 500: `.
    pub fn from_response(status: u16, body: &str, reason: Option<&str>) -> Self {
        let body = if body.trim().is_empty() {
            reason.unwrap_or_default().to_string()
        } else {
            body.to_string()
        };
        ApiError::Status { status, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { status: 404, .. } => ErrorKind::NotFound,
            ApiError::Status { .. } => ErrorKind::Http,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Message shown when a lookup by food code fails
pub fn code_lookup_message(code: u64, err: &ApiError) -> String {
    if err.is_not_found() {
        format!("No food found with code {code}")
    } else {
        err.to_string()
    }
}

/// Message shown when a listing or filtered search fails
pub fn search_message(err: &ApiError) -> String {
    if err.is_not_found() {
        "No foods match the selected filters. Try adjusting the search criteria.".to_string()
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::from_response(500, "boom", Some("Internal Server Error"));
        assert_eq!(err.to_string(), "API error 500: boom");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn test_empty_body_uses_reason() {
        let err = ApiError::from_response(404, "  ", Some("Not Found"));
        assert_eq!(err.to_string(), "API error 404: Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_found_is_structural() {
        // A body mentioning 404 does not make a 500 a not-found error
        let err = ApiError::from_response(500, "upstream returned 404", None);
        assert!(!err.is_not_found());

        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_code_lookup_message() {
        let not_found = ApiError::from_response(404, "{\"detail\":\"Not found\"}", None);
        assert_eq!(
            code_lookup_message(101001, &not_found),
            "No food found with code 101001"
        );

        let other = ApiError::from_response(502, "bad gateway", None);
        assert_eq!(code_lookup_message(101001, &other), "API error 502: bad gateway");
    }

    #[test]
    fn test_search_message() {
        let not_found = ApiError::from_response(404, "", Some("Not Found"));
        assert!(search_message(&not_found).starts_with("No foods match"));

        let other = ApiError::Decode("expected value".to_string());
        assert_eq!(
            search_message(&other),
            "Failed to decode response: expected value"
        );
    }
}

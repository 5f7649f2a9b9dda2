use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Maximum length of a response-body snippet quoted in error details.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failures surfaced by the client.
///
/// Remote application errors are deliberately absent: a non-2xx response with
/// a valid JSON body is not an error here - it is passed through inside the
/// [`Envelope`](crate::Envelope) for the caller to inspect via `http_status`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The `access/ticket` endpoint returned a non-success status.
    #[error("authentication failed: {code} {reason}")]
    AuthFailed { code: u16, reason: String },

    /// Network-level failure (connection refused, DNS, timeout). Propagated
    /// unmodified and never retried.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("invalid response (status {code}): {detail}")]
    Protocol { code: u16, detail: String },

    /// Connection options were rejected before any request was made.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ApiError {
    /// Build a [`Protocol`](Self::Protocol) error quoting a truncated body
    /// snippet next to the parse failure.
    pub(crate) fn protocol(code: u16, detail: &str, body: &str) -> Self {
        let snippet = truncate_body(body);
        if snippet.is_empty() {
            ApiError::Protocol {
                code,
                detail: detail.to_string(),
            }
        } else {
            ApiError::Protocol {
                code,
                detail: format!("{detail}; body: {snippet}"),
            }
        }
    }
}

/// Truncate a response body so error messages stay readable.
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY_LENGTH {
        trimmed.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &trimmed[..end],
            trimmed.len()
        )
    }
}

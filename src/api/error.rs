use std::error::Error;
use std::fmt;

/// Failures surfaced by the chat API client.
#[derive(Debug)]
pub enum ApiError {
    /// No credential was available; nothing was sent.
    Auth,

    /// The candidate key was rejected during validation.
    InvalidCredential,

    /// The server answered with a non-success status.
    Status {
        status: u16,
        /// Short human-readable summary of the error body, when one was found.
        detail: Option<String>,
    },

    /// The model list decoded to zero entries.
    EmptyResult,

    /// The response body did not have the expected shape.
    MalformedResponse(String),

    /// A chat request was attempted without a model id.
    ModelNotSelected,

    /// The request never produced a response (DNS, connect, timeout, body read).
    Transport(reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth => write!(f, "API key not found"),
            ApiError::InvalidCredential => write!(f, "API key was rejected by the server"),
            ApiError::Status {
                status,
                detail: Some(detail),
            } => write!(f, "API error: {status}: {detail}"),
            ApiError::Status {
                status,
                detail: None,
            } => write!(f, "API error: {status}"),
            ApiError::EmptyResult => write!(f, "No models available"),
            ApiError::MalformedResponse(reason) => {
                write!(f, "Unexpected response from server: {reason}")
            }
            ApiError::ModelNotSelected => write!(f, "Model not selected"),
            ApiError::Transport(err) => write!(f, "API request failed: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("detail")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Pull a one-line summary out of an error body, if it is JSON we recognize.
pub(crate) fn summarize_error_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_openai_style_errors() {
        let body = r#"{"error":{"message":"Invalid   API\nkey","type":"auth"}}"#;
        assert_eq!(summarize_error_body(body).as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn summarizes_open_webui_detail_errors() {
        let body = r#"{"detail":"401 Unauthorized"}"#;
        assert_eq!(
            summarize_error_body(body).as_deref(),
            Some("401 Unauthorized")
        );
    }

    #[test]
    fn non_json_bodies_have_no_summary() {
        assert_eq!(summarize_error_body("<html>bad gateway</html>"), None);
        assert_eq!(summarize_error_body("   "), None);
    }

    #[test]
    fn status_errors_display_code_and_detail() {
        let err = ApiError::Status {
            status: 503,
            detail: Some("overloaded".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 503: overloaded");
        assert_eq!(err.status(), Some(503));
        assert_eq!(ApiError::ModelNotSelected.status(), None);
    }
}

//! Error types and handling for the Reddit toolkit

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Maximum query length accepted by Reddit's search endpoint
pub const MAX_QUERY_LEN: usize = 512;

/// Application error types surfaced by both tools
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        rate_limited: bool,
        retryable: bool,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error payload attached to failed MCP tool results
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl AppError {
    /// Transient upstream failure (transport, timeout, garbled body)
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
            rate_limited: false,
            retryable: true,
        }
    }

    /// Upstream refused the request; repeating it will not help
    pub fn rejected(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
            rate_limited: false,
            retryable: false,
        }
    }

    /// Map a non-success HTTP status from Reddit onto an error kind
    pub fn from_status(status: StatusCode, resource: &str) -> Self {
        match status.as_u16() {
            404 => AppError::NotFound(format!("{} does not exist", resource)),
            429 => AppError::Upstream {
                message: format!("rate limited by Reddit while fetching {}", resource),
                rate_limited: true,
                retryable: true,
            },
            s if (500..600).contains(&s) => {
                AppError::upstream(format!("Reddit returned {} for {}", status, resource))
            }
            _ => AppError::rejected(format!("Reddit refused {} with {}", resource, status)),
        }
    }

    /// Get the error code for MCP responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Upstream { .. } => "upstream_error",
            AppError::Config(_) => "config_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller may reasonably retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Upstream { retryable: true, .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::Upstream { rate_limited: true, .. })
    }

    /// Process exit code used in CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) | AppError::Config(_) => 1,
            AppError::Upstream { .. } => 2,
            AppError::NotFound(_) => 3,
            AppError::Internal(_) => 5,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.error_code(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Convert reqwest::Error to AppError
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::upstream(format!("request timed out: {}", err))
        } else if err.is_decode() {
            AppError::upstream(format!("malformed response: {}", err))
        } else if let Some(status) = err.status() {
            AppError::from_status(status, err.url().map(|u| u.path()).unwrap_or("resource"))
        } else {
            AppError::upstream(err.to_string())
        }
    }
}

/// Convert serde_json::Error to AppError
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::upstream(format!("malformed response: {}", err))
    }
}

pub fn validate_query(query: &str) -> Result<(), AppError> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
    }

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(AppError::InvalidInput(format!(
            "Query too long, maximum {} characters",
            MAX_QUERY_LEN
        )));
    }

    Ok(())
}

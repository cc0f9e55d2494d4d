//! Uniform failure outcome for storage operations

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use serde::Serialize;
use thiserror::Error;

/// Result of every storage operation
pub type Outcome<T> = Result<T, Failure>;

/// Notification class attached to an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Danger,
}

/// A failed storage operation.
///
/// Every provider error maps to the same severity; `code` is the
/// provider's error code when one was reported and is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
    pub severity: Severity,
    pub code: Option<String>,
}

impl Failure {
    /// Failure not attributable to a provider error code
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Danger,
            code: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::generic("operation cancelled")
    }

    /// True when the provider reported the given error code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Translate a provider error for `operation` into a [`Failure`].
///
/// Total: errors without metadata (dispatch, timeout, construction)
/// fall back to the full error chain as message.
pub fn translate<E, R>(operation: &str, error: SdkError<E, R>) -> Failure
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = error.code().map(str::to_string);
    let message = match (&code, error.message()) {
        (Some(code), Some(message)) => format!(
            "An error occurred ({}) when calling the {} operation: {}",
            code, operation, message
        ),
        (Some(code), None) => format!(
            "An error occurred ({}) when calling the {} operation",
            code, operation
        ),
        (None, _) => format!("{} failed: {}", operation, DisplayErrorContext(&error)),
    };

    tracing::warn!("{}", message);

    Failure {
        message,
        severity: Severity::Danger,
        code,
    }
}

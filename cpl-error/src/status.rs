//! Error status for retry classification

use std::fmt;

/// How an error should be handled by the caller.
///
/// - `Permanent`: retrying will not help, fix the cause first
/// - `Temporary`: the same operation may succeed if tried again
/// - `Persistent`: was temporary, but retries have been exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// The error is not recoverable by retrying
    Permanent,
    /// The error may go away on a later attempt
    Temporary,
    /// The error kept occurring across retries
    Persistent,
}

impl ErrorStatus {
    /// Check whether the error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    /// Transition a temporary error to persistent after retries failed
    pub fn persist(self) -> Self {
        match self {
            ErrorStatus::Temporary => ErrorStatus::Persistent,
            other => other,
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
            ErrorStatus::Persistent => "persistent",
        };
        write!(f, "{}", s)
    }
}

//! CPL machine error types
//!
//! Re-exports cpl-error and provides machine-specific conveniences.

// Re-export the core error types
pub use cpl_error::{Error, ErrorKind, ErrorStatus, Result};

// =============================================================================
// Machine-specific error constructors
// =============================================================================

/// Create a CredentialMissing error for the named environment variable
pub fn credential_missing(variable: impl Into<String>) -> Error {
    Error::credential_missing(variable)
}

/// Create a ProviderUnavailable error
pub fn provider_unavailable(reason: impl Into<String>) -> Error {
    Error::provider_unavailable(reason)
}

/// Create an InferenceFailed error
pub fn inference_failed(reason: impl Into<String>) -> Error {
    Error::inference_failed(reason)
}

/// Create an empty-response error for a model that sent no text back
pub fn empty_response(model: impl Into<String>) -> Error {
    let model = model.into();
    Error::inference_failed("model returned no text content")
        .with_context("model", model)
}

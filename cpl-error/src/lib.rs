//! # cpl-error
//!
//! Unified error handling for the CPL runner - following OpenDAL's error
//! handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., CredentialMissing, InferenceFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use cpl_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::InferenceFailed, "model returned empty response")
//!         .with_operation("runner::dispatch")
//!         .with_context("model", "gpt-4o")
//!         .with_context("program", "example1.cpl"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible operations return `Result<T, cpl_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the CPL runner Error
pub type Result<T> = std::result::Result<T, Error>;

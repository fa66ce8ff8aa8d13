//! # CPL Machine
//!
//! The core of the CPL runner: a machine where the remote model is the
//! interpreter. Programs are never parsed or executed locally - each one is
//! combined with the interpreter specification into a single prompt and
//! handed to the model, which performs the entire execution internally.
//!
//! ## Core Concepts
//! - **Spec**: the interpreter specification, loaded once and shared per run
//! - **Prompt**: the composed instructional string (framing + spec + program)
//! - **Provider**: trait-based LLM communication (OpenAI-compatible, Anthropic)
//! - **Runner**: the sequential per-file orchestration loop

pub mod error;
pub mod prompt;
pub mod provider;
pub mod runner;
pub mod spec;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use prompt::{compose_prompt, SYSTEM_PROMPT};
pub use provider::{
    AnthropicProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    LlmProvider, OpenAIProvider, ProviderConfig, ProviderError, ProviderType, Role, Usage,
    UsageTracker,
};
pub use runner::{Runner, USAGE};
pub use spec::InterpreterSpec;

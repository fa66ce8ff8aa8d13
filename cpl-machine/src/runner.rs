//! The run orchestrator.
//!
//! Processes program files strictly in the order given: header line, file
//! read, prompt composition, one remote call, reply printed. Any failure
//! ends the run; there is no continuation to the next input.

use crate::error::{self, Error, ErrorKind, Result};
use crate::prompt::{compose_prompt, SYSTEM_PROMPT};
use crate::provider::{ChatMessage, CompletionRequest, LlmProvider, ProviderError, UsageTracker};
use crate::spec::InterpreterSpec;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Usage line printed when no program paths are given.
pub const USAGE: &str = "Usage: cpl <program1.cpl> [program2.cpl ...]";

/// Sequential runner for CPL programs.
///
/// Holds the provider and the specification text, which is loaded once and
/// shared read-only across every program in the run.
pub struct Runner<P> {
    provider: P,
    spec: InterpreterSpec,
    model: Option<String>,
    verbose: bool,
}

impl<P: LlmProvider> Runner<P> {
    pub fn new(provider: P, spec: InterpreterSpec) -> Self {
        Self {
            provider,
            spec,
            model: None,
            verbose: false,
        }
    }

    /// Override the model identifier sent with every request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Report dispatch targets and a usage summary on the output sink.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Process every path in the literal given order.
    ///
    /// An empty sequence prints the usage line and does nothing else: no
    /// file reads, no remote calls.
    pub async fn run_all<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> Result<()> {
        if paths.is_empty() {
            writeln!(out, "{}", USAGE)?;
            return Ok(());
        }

        let mut usage = UsageTracker::new();
        for path in paths {
            self.run_program(path, &mut usage, out).await?;
        }

        if self.verbose && usage.total_calls > 0 {
            writeln!(out)?;
            writeln!(
                out,
                "--- {} calls, {} prompt + {} completion tokens ---",
                usage.total_calls, usage.total_prompt_tokens, usage.total_completion_tokens
            )?;
        }

        Ok(())
    }

    /// Run one program: header, read, compose, dispatch, print.
    async fn run_program<W: Write>(
        &self,
        path: &Path,
        usage: &mut UsageTracker,
        out: &mut W,
    ) -> Result<()> {
        let title = format!("Running {}", path.display());
        writeln!(out)?;
        writeln!(out, "{}", title)?;
        writeln!(out, "{}", "=".repeat(title.len() + 1))?;

        let program = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("runner::run_program")
                .with_context("program", path.display().to_string())
        })?;

        let prompt = compose_prompt(self.spec.text(), &program);

        let mut request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(0.0);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        if self.verbose {
            let model = self
                .model
                .as_deref()
                .unwrap_or_else(|| self.provider.default_model());
            writeln!(out, "[dispatching to {} ({})]", self.provider.name(), model)?;
        }

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| remote_error(e, path))?;

        usage.track(&response.model, &response.usage);

        let reply = response
            .content
            .ok_or_else(|| error::empty_response(response.model.as_str()))?;
        writeln!(out, "{}", reply.trim())?;

        Ok(())
    }
}

/// Wrap a provider failure, preserving the original cause as the source.
///
/// Setup problems (credential, client) keep their configuration kinds;
/// everything else is a failure of the call itself.
fn remote_error(err: ProviderError, path: &Path) -> Error {
    let base = match &err {
        ProviderError::MissingCredential { variable } => error::credential_missing(variable.clone()),
        ProviderError::ClientUnavailable(reason) => error::provider_unavailable(reason.clone()),
        ProviderError::Network(_) => Error::new(ErrorKind::NetworkFailed, err.to_string()),
        ProviderError::RateLimited { .. } => Error::new(ErrorKind::RateLimited, err.to_string()),
        ProviderError::Parse(_) => Error::new(ErrorKind::ParseFailed, err.to_string()),
        _ => error::inference_failed(err.to_string()),
    };
    base.with_operation("runner::dispatch")
        .with_context("program", path.display().to_string())
        .set_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CompletionResponse, FinishReason, Role, Usage};
    use std::sync::Mutex;

    fn user_prompt(request: &CompletionRequest) -> String {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn ok_response(content: &str) -> CompletionResponse {
        CompletionResponse {
            id: "test".into(),
            model: "echo-1".into(),
            content: Some(content.into()),
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        }
    }

    /// Echoes the composed prompt back, recording every call.
    struct EchoProvider {
        calls: Mutex<Vec<String>>,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-1"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            let prompt = user_prompt(&request);
            self.calls.lock().unwrap().push(prompt.clone());
            Ok(ok_response(&format!("ECHO:{}", prompt)))
        }
    }

    /// Fails every call with the given constructor.
    struct FailingProvider {
        error: fn() -> ProviderError,
    }

    impl LlmProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn default_model(&self) -> &str {
            "failing-1"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            Err((self.error)())
        }
    }

    fn write_program(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_echo_two_programs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "PROGRAM-A");
        let b = write_program(&dir, "b.cpl", "PROGRAM-B");

        let runner = Runner::new(EchoProvider::new(), InterpreterSpec::from_text("SPEC-TEXT"));
        let mut out = Vec::new();
        runner.run_all(&[a, b], &mut out).await.unwrap();
        let output = String::from_utf8(out).unwrap();

        let header_a = output.find("Running").unwrap();
        let echo_a = output.find("ECHO:").unwrap();
        let header_b = output.rfind("Running").unwrap();
        let echo_b = output.rfind("ECHO:").unwrap();
        assert!(header_a < echo_a);
        assert!(echo_a < header_b);
        assert!(header_b < echo_b);

        // Both replies carry the specification and their own program text
        let first_block = &output[echo_a..header_b];
        assert!(first_block.contains("SPEC-TEXT"));
        assert!(first_block.contains("PROGRAM-A"));
        let second_block = &output[echo_b..];
        assert!(second_block.contains("SPEC-TEXT"));
        assert!(second_block.contains("PROGRAM-B"));

        assert_eq!(output.matches("Running").count(), 2);
    }

    #[tokio::test]
    async fn test_one_call_per_path_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "FIRST");
        let b = write_program(&dir, "b.cpl", "SECOND");

        let runner = Runner::new(EchoProvider::new(), InterpreterSpec::from_text("spec"));
        let mut out = Vec::new();
        runner.run_all(&[a, b], &mut out).await.unwrap();

        let calls = runner.provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("FIRST"));
        assert!(calls[1].contains("SECOND"));
    }

    #[tokio::test]
    async fn test_empty_paths_prints_usage_only() {
        let provider = EchoProvider::new();
        let spec = InterpreterSpec::from_text("spec");
        let runner = Runner::new(provider, spec);

        let mut out = Vec::new();
        runner.run_all(&[], &mut out).await.unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(output, format!("{}\n", USAGE));
        assert!(runner.provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_header_ruler_matches_title() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(EchoProvider::new(), InterpreterSpec::from_text("s"));
        let mut out = Vec::new();
        runner.run_all(std::slice::from_ref(&a), &mut out).await.unwrap();
        let output = String::from_utf8(out).unwrap();

        let title = format!("Running {}", a.display());
        let ruler = "=".repeat(title.len() + 1);
        assert!(output.contains(&title));
        assert!(output.contains(&ruler));
    }

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        struct PaddedProvider;
        impl LlmProvider for PaddedProvider {
            fn name(&self) -> &str {
                "padded"
            }
            fn default_model(&self) -> &str {
                "padded-1"
            }
            async fn complete(
                &self,
                _request: CompletionRequest,
            ) -> std::result::Result<CompletionResponse, ProviderError> {
                Ok(ok_response("  \n trace output \n  "))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(PaddedProvider, InterpreterSpec::from_text("s"));
        let mut out = Vec::new();
        runner.run_all(std::slice::from_ref(&a), &mut out).await.unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("\ntrace output\n"));
        assert!(!output.contains(" trace output "));
    }

    #[tokio::test]
    async fn test_failure_wraps_cause_and_prints_no_reply() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(
            FailingProvider {
                error: || ProviderError::Network("connection refused".into()),
            },
            InterpreterSpec::from_text("s"),
        );
        let mut out = Vec::new();
        let err = runner
            .run_all(std::slice::from_ref(&a), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkFailed);
        assert!(err.source_ref().is_some());
        assert!(err.message().contains("connection refused"));

        // Header was printed before the dispatch, reply was not
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Running"));
        assert!(!output.contains("ECHO"));
        assert_eq!(output.trim_end().lines().last().unwrap().chars().next(), Some('='));
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_kind() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(
            FailingProvider {
                error: || ProviderError::MissingCredential {
                    variable: "OPENAI_API_KEY".into(),
                },
            },
            InterpreterSpec::from_text("s"),
        );
        let mut out = Vec::new();
        let err = runner
            .run_all(std::slice::from_ref(&a), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialMissing);
        assert!(err.message().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");
        let missing = dir.path().join("missing.cpl");
        let b = write_program(&dir, "b.cpl", "NEVER-REACHED");

        let runner = Runner::new(EchoProvider::new(), InterpreterSpec::from_text("s"));
        let mut out = Vec::new();
        let err = runner
            .run_all(&[a, missing, b], &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        let output = String::from_utf8(out).unwrap();
        assert!(!output.contains("NEVER-REACHED"));
        assert_eq!(runner.provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verbose_reports_usage_summary() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(EchoProvider::new(), InterpreterSpec::from_text("s"))
            .with_verbose(true);
        let mut out = Vec::new();
        runner.run_all(std::slice::from_ref(&a), &mut out).await.unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("[dispatching to echo (echo-1)]"));
        assert!(output.contains("1 calls, 10 prompt + 5 completion tokens"));
    }

    #[tokio::test]
    async fn test_model_override_reaches_request() {
        struct AssertModelProvider;
        impl LlmProvider for AssertModelProvider {
            fn name(&self) -> &str {
                "assert"
            }
            fn default_model(&self) -> &str {
                "default-model"
            }
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> std::result::Result<CompletionResponse, ProviderError> {
                assert_eq!(request.model.as_deref(), Some("gpt-4o"));
                assert_eq!(request.temperature, Some(0.0));
                Ok(ok_response("ok"))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let a = write_program(&dir, "a.cpl", "X");

        let runner = Runner::new(AssertModelProvider, InterpreterSpec::from_text("s"))
            .with_model("gpt-4o");
        let mut out = Vec::new();
        runner.run_all(std::slice::from_ref(&a), &mut out).await.unwrap();
    }
}

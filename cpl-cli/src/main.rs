//! # CPL CLI
//!
//! Command-line interface for running Cognitive Prompt Language programs.
//! Each program file is combined with the interpreter specification into a
//! single prompt and handed to the remote model, which simulates the whole
//! execution and returns the trace.
//!
//! Usage:
//!   cpl programs/example1.cpl
//!   cpl programs/example1.cpl programs/example2.cpl
//!   cpl --provider anthropic --model claude-sonnet-4-20250514 programs/example1.cpl
//!
//! The credential comes from the environment: OPENAI_API_KEY for the
//! default provider, ANTHROPIC_API_KEY for --provider anthropic.

use clap::{Parser, ValueEnum};
use cpl_machine::{
    AnthropicProvider, InterpreterSpec, LlmProvider, OpenAIProvider, ProviderConfig, Runner,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cpl")]
#[command(version, about = "Run CPL programs on a remote model")]
struct Cli {
    /// Program files to run, in order
    programs: Vec<PathBuf>,

    /// Remote service to dispatch to
    #[arg(long, value_enum, default_value_t = ProviderKind::OpenAI)]
    provider: ProviderKind,

    /// Model identifier (defaults to the provider's fixed model)
    #[arg(short, long)]
    model: Option<String>,

    /// Interpreter specification file
    /// (defaults to interpreter/interpreter.cpl next to the executable)
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Report dispatch targets and token usage
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "anthropic")]
    Anthropic,
}

async fn run_programs<P: LlmProvider>(
    provider: P,
    spec: InterpreterSpec,
    cli: &Cli,
) -> cpl_machine::Result<()> {
    let mut runner = Runner::new(provider, spec).with_verbose(cli.verbose);
    if let Some(model) = &cli.model {
        runner = runner.with_model(model.clone());
    }

    let mut stdout = std::io::stdout();
    runner.run_all(&cli.programs, &mut stdout).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.programs.is_empty() {
        println!("{}", cpl_machine::USAGE);
        return;
    }

    let spec_path = match &cli.interpreter {
        Some(path) => path.clone(),
        None => match InterpreterSpec::default_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };

    let spec = match InterpreterSpec::load(&spec_path) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.provider {
        ProviderKind::OpenAI => {
            run_programs(OpenAIProvider::new(ProviderConfig::openai()), spec, &cli).await
        }
        ProviderKind::Anthropic => {
            run_programs(AnthropicProvider::new(ProviderConfig::anthropic()), spec, &cli).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

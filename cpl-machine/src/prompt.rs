//! Prompt composition for the cognitive prompt machine.
//!
//! The whole execution model rests on one string: framing text, the
//! interpreter specification, more framing, the program, and a closing
//! instruction. The model does the rest.

/// The fixed system-role instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an interpreter for the cognitive prompt language.";

/// Opening line of the composed prompt.
const PREAMBLE: &str = "You are a cognitive prompt machine interpreter.";

/// Framing line introducing the interpreter specification.
const SPEC_HEADER: &str = "Interpreter specification:";

/// Framing line introducing the program text.
const PROGRAM_HEADER: &str = "CPL program:";

/// Closing instruction asking for the full execution trace.
const CLOSING: &str = "Run the program according to the interpreter specification and \
provide the complete execution trace, including any prompts sent, model responses, \
memory updates and final state.";

/// Compose the single instructional prompt for one program.
///
/// Both inputs are accepted verbatim, including empty strings. The
/// specification always precedes the program.
pub fn compose_prompt(spec: &str, program: &str) -> String {
    format!(
        "{}\n\n{}\n{}\n\n{}\n{}\n\n{}",
        PREAMBLE, SPEC_HEADER, spec, PROGRAM_HEADER, program, CLOSING
    )
}

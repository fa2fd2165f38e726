//! End-to-end evaluator tests: each runs a whole program source through a
//! [`Session`] with buffered output and queued input.

mod scope_tests;
mod template_tests;

use crate::errors::{Fatal, FaultKind};
use crate::host::{BufferOutput, InputHandler, OutputHandler, QueueInput};
use crate::session::Session;

/// Run a program with no input; returns everything it printed.
pub(crate) fn run_program(source: &str) -> Fatal<String> {
    run_with_input(source, &[])
}

pub(crate) fn run_with_input(source: &str, lines: &[&str]) -> Fatal<String> {
    let mut session = Session::with_host(
        OutputHandler::Buffer(BufferOutput::new()),
        InputHandler::Queue(QueueInput::new(lines.iter().copied())),
    );
    session.run(source)?;
    Ok(session.output.contents())
}

/// The fault category a program dies with.
pub(crate) fn fatal_kind(source: &str) -> FaultKind {
    run_program(source).unwrap_err().kind
}

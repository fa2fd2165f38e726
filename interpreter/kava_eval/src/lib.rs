//! Tree-walking evaluator for Kava, an S-expression object language with
//! classes, single inheritance, overload dispatch, templates, and string
//! exceptions.
//!
//! The public surface is [`Session`]: feed it a program source and it
//! parses, registers every class, instantiates the `main` class, and runs
//! its `main` method. Host I/O is pluggable through [`OutputHandler`] and
//! [`InputHandler`], so the same evaluator serves the CLI, tests, and
//! embeddings.
//!
//! Two error channels, deliberately separate:
//! - language-level exceptions (`throw`/`try`) travel as [`exec::Signal`]
//!   values and never surface here;
//! - host-fatal faults (bad names, type errors, null dereferences) are
//!   [`FatalError`]s that abort the run.

pub mod class;
pub mod errors;
pub mod exec;
pub mod host;
pub mod method;
pub mod object;
pub mod session;
pub mod types;
pub mod value;

pub use errors::{Fatal, FatalError, FaultKind};
pub use host::{BufferOutput, InputHandler, OutputHandler, QueueInput};
pub use session::Session;
pub use value::Value;

#[cfg(test)]
mod tests;

//! Statement and expression execution.
//!
//! Control flow travels on two explicit channels. Statements produce a
//! [`Signal`]: normal completion, an in-flight `return`, or an in-flight
//! `throw`. Expressions produce an [`Outcome`]: a value, or a raised
//! exception unwinding out of a nested call. Host-fatal faults travel on the
//! `Fatal` error channel and are never caught by either.

mod call;
mod expr;
mod operators;
mod stmt;

use crate::session::Session;
use crate::value::Value;

/// How a statement finished.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// Fell off the end; continue with the next statement.
    Normal,
    /// A `return` is unwinding to the nearest call boundary.
    Returning(Value),
    /// A `throw` is unwinding to the nearest `try`.
    Raised(Value),
}

/// How an expression finished.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Value(Value),
    /// A call inside the expression threw; the exception keeps unwinding.
    Raised(Value),
}

/// Evaluation context: borrows the session for class registries and host
/// handlers. One per program run.
pub(crate) struct Exec<'s> {
    pub session: &'s mut Session,
}

/// Evaluate an expression in a statement context, turning a raised
/// exception into an early `Signal::Raised` return.
macro_rules! try_value {
    ($self:ident, $obj:expr, $ast:expr) => {
        match $self.eval_expr($obj, $ast)? {
            $crate::exec::Outcome::Value(v) => v,
            $crate::exec::Outcome::Raised(p) => {
                return Ok($crate::exec::Signal::Raised(p));
            }
        }
    };
}

/// Evaluate a subexpression, propagating a raised exception outward.
macro_rules! try_outcome {
    ($self:ident, $obj:expr, $ast:expr) => {
        match $self.eval_expr($obj, $ast)? {
            $crate::exec::Outcome::Value(v) => v,
            $crate::exec::Outcome::Raised(p) => {
                return Ok($crate::exec::Outcome::Raised(p));
            }
        }
    };
}

pub(crate) use {try_outcome, try_value};

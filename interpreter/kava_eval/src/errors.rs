//! Fatal fault reporting.
//!
//! Every unrecoverable fault in an interpreted program - undefined names,
//! type mismatches, malformed input, null dereferences - is a [`FatalError`]
//! carrying a category, a message, and where known the source line. These
//! abort the run; they are never caught by `try` (language-level exceptions
//! travel on a separate channel, see `exec::Signal`).
//!
//! Factory functions below are the only way the evaluator builds faults, so
//! every message lives in one place.

use std::fmt;
use thiserror::Error;

/// Category of an unrecoverable fault, mirrored in the CLI's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Undefined or duplicate names: variables, classes, methods, formals.
    Name,
    /// Type mismatches: assignment, operands, arguments, returns.
    Type,
    /// Structurally invalid input: parse failure, malformed statement.
    Syntax,
    /// Runtime faults: null dereference, division by zero, uncaught throw.
    Fault,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Name => write!(f, "name error"),
            FaultKind::Type => write!(f, "type error"),
            FaultKind::Syntax => write!(f, "syntax error"),
            FaultKind::Fault => write!(f, "fault error"),
        }
    }
}

/// An unrecoverable fault. Reported exactly once, by whoever owns the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FatalError {
    pub kind: FaultKind,
    pub message: String,
    /// Source line of the offending form, when one is known.
    pub line: Option<u32>,
}

impl FatalError {
    fn new(kind: FaultKind, message: impl Into<String>, line: u32) -> Self {
        FatalError {
            kind,
            message: message.into(),
            line: Some(line),
        }
    }

    fn no_line(kind: FaultKind, message: impl Into<String>) -> Self {
        FatalError {
            kind,
            message: message.into(),
            line: None,
        }
    }
}

/// Result alias used across the evaluator.
pub type Fatal<T> = Result<T, FatalError>;

// Name errors

pub fn undefined_variable(name: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Name, format!("undefined variable `{name}`"), line)
}

pub fn undefined_exception(line: u32) -> FatalError {
    FatalError::new(FaultKind::Name, "no pending exception", line)
}

pub fn method_undefined(name: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Name, format!("method `{name}` undefined"), line)
}

pub fn duplicate_member(class: &str, name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Name,
        format!("duplicate field or method `{name}` in class `{class}`"),
        line,
    )
}

pub fn duplicate_formal(name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Name,
        format!("duplicate formal parameter `{name}`"),
        line,
    )
}

pub fn duplicate_local(name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Name,
        format!("duplicate let variable `{name}`"),
        line,
    )
}

pub fn base_class_missing(name: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Name, format!("base class `{name}` not found"), line)
}

pub fn entry_class_missing(name: &str) -> FatalError {
    FatalError::no_line(FaultKind::Name, format!("class `{name}` can't be found"))
}

// Type errors

pub fn duplicate_class(name: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, format!("duplicate class name `{name}`"), line)
}

pub fn unknown_type(token: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, format!("type `{token}` does not exist"), line)
}

pub fn undefined_class(name: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, format!("undefined class `{name}`"), line)
}

pub fn no_matching_overload(name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("no overload of `{name}` matches the argument types"),
        line,
    )
}

pub fn incompatible_assignment(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "assigning incompatible type", line)
}

pub fn invalid_field_init(field: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("invalid initializer for field `{field}`"),
        line,
    )
}

pub fn invalid_local_init(name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("invalid initializer for let variable `{name}`"),
        line,
    )
}

pub fn condition_not_boolean(form: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("non-boolean condition in `{form}` statement"),
        line,
    )
}

pub fn operand_type_mismatch(op: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("operand types of `{op}` do not match"),
        line,
    )
}

pub fn unsupported_operator(op: &str, type_name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("operator `{op}` is not defined for {type_name}"),
        line,
    )
}

pub fn incomparable_pointers(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "comparing unrelated object types", line)
}

pub fn passing_invalid_class(param: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("passing invalid class for parameter `{param}`"),
        line,
    )
}

pub fn invalid_return_type(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "invalid return type", line)
}

pub fn returning_invalid_class(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "returning invalid class", line)
}

pub fn throw_requires_string(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "throw requires a string value", line)
}

pub fn template_arity(name: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("wrong number of type arguments for template `{name}`"),
        line,
    )
}

pub fn template_arg_unknown(arg: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("template type argument `{arg}` does not exist"),
        line,
    )
}

pub fn not_an_expression(line: u32) -> FatalError {
    FatalError::new(FaultKind::Type, "not a valid expression", line)
}

pub fn invalid_input_value(expected: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Type,
        format!("input is not a valid {expected}"),
        line,
    )
}

// Syntax errors

pub fn invalid_program() -> FatalError {
    FatalError::no_line(FaultKind::Syntax, "invalid input")
}

pub fn malformed_statement(line: u32) -> FatalError {
    FatalError::new(FaultKind::Syntax, "malformed statement", line)
}

pub fn malformed_class(line: u32) -> FatalError {
    FatalError::new(FaultKind::Syntax, "malformed class declaration", line)
}

pub fn invalid_operator(op: &str, line: u32) -> FatalError {
    FatalError::new(FaultKind::Syntax, format!("invalid operator `{op}`"), line)
}

// Fault errors

pub fn null_reference(line: u32) -> FatalError {
    FatalError::new(FaultKind::Fault, "referenced a null value", line)
}

pub fn illegal_receiver(line: u32) -> FatalError {
    FatalError::new(FaultKind::Fault, "referenced illegal value", line)
}

pub fn division_by_zero(line: u32) -> FatalError {
    FatalError::new(FaultKind::Fault, "division by zero", line)
}

pub fn integer_overflow(op: &str, line: u32) -> FatalError {
    FatalError::new(
        FaultKind::Fault,
        format!("integer overflow in `{op}`"),
        line,
    )
}

pub fn input_exhausted(line: u32) -> FatalError {
    FatalError::new(FaultKind::Fault, "input exhausted", line)
}

pub fn uncaught_exception(payload: &str) -> FatalError {
    FatalError::no_line(
        FaultKind::Fault,
        format!("uncaught exception: {payload}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let err = undefined_variable("x", 3);
        assert_eq!(err.to_string(), "name error: undefined variable `x`");
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn categories_are_distinct() {
        assert_eq!(undefined_variable("x", 1).kind, FaultKind::Name);
        assert_eq!(incompatible_assignment(1).kind, FaultKind::Type);
        assert_eq!(invalid_program().kind, FaultKind::Syntax);
        assert_eq!(null_reference(1).kind, FaultKind::Fault);
    }
}

//! Built-in operators, keyed by the operand type.
//!
//! Both operands of a binary operator must carry the same tag; there are no
//! implicit conversions. Integer arithmetic is checked - overflow and
//! division by zero are host-fatal faults, not catchable exceptions.

use crate::errors::{self, Fatal};
use crate::types::{TypeRegistry, TypeTag};
use crate::value::Value;

const BINARY_OPS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "&", "|",
];

/// True for any token that names an operator, unary or binary.
pub(crate) fn is_operator(token: &str) -> bool {
    token == "!" || BINARY_OPS.contains(&token)
}

pub(crate) fn apply_binary(
    op: &str,
    a: Value,
    b: Value,
    types: &TypeRegistry,
    line: u32,
) -> Fatal<Value> {
    if !BINARY_OPS.contains(&op) {
        return Err(errors::invalid_operator(op, line));
    }
    if a.tag() != b.tag() {
        return Err(errors::operand_type_mismatch(op, line));
    }
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => int_op(op, *x, *y, line),
        (Value::Str(x), Value::Str(y)) => str_op(op, x, y, line),
        (Value::Bool(x), Value::Bool(y)) => bool_op(op, *x, *y, line),
        (
            Value::Pointer { runtime: ra, .. },
            Value::Pointer { runtime: rb, .. },
        ) => {
            // Identity comparison is only defined between related classes.
            if let (Some(ca), Some(cb)) = (ra.as_deref(), rb.as_deref()) {
                if !types.is_subtype(ca, Some(cb)) && !types.is_subtype(cb, Some(ca)) {
                    return Err(errors::incomparable_pointers(line));
                }
            }
            match op {
                "==" => Ok(Value::Bool(a == b)),
                "!=" => Ok(Value::Bool(a != b)),
                _ => Err(errors::unsupported_operator(op, TypeTag::Pointer.name(), line)),
            }
        }
        _ => Err(errors::unsupported_operator(op, a.tag().name(), line)),
    }
}

pub(crate) fn apply_unary(op: &str, a: Value, line: u32) -> Fatal<Value> {
    match (op, a) {
        ("!", Value::Bool(b)) => Ok(Value::Bool(!b)),
        ("!", other) => Err(errors::unsupported_operator(op, other.tag().name(), line)),
        _ => Err(errors::invalid_operator(op, line)),
    }
}

fn int_op(op: &str, x: i64, y: i64, line: u32) -> Fatal<Value> {
    let checked = |r: Option<i64>| r.ok_or_else(|| errors::integer_overflow(op, line));
    Ok(match op {
        "+" => Value::Int(checked(x.checked_add(y))?),
        "-" => Value::Int(checked(x.checked_sub(y))?),
        "*" => Value::Int(checked(x.checked_mul(y))?),
        "/" => {
            if y == 0 {
                return Err(errors::division_by_zero(line));
            }
            Value::Int(checked(x.checked_div(y))?)
        }
        "%" => {
            if y == 0 {
                return Err(errors::division_by_zero(line));
            }
            Value::Int(checked(x.checked_rem(y))?)
        }
        "==" => Value::Bool(x == y),
        "!=" => Value::Bool(x != y),
        "<" => Value::Bool(x < y),
        "<=" => Value::Bool(x <= y),
        ">" => Value::Bool(x > y),
        ">=" => Value::Bool(x >= y),
        _ => return Err(errors::unsupported_operator(op, TypeTag::Int.name(), line)),
    })
}

fn str_op(op: &str, x: &str, y: &str, line: u32) -> Fatal<Value> {
    Ok(match op {
        "+" => Value::Str(format!("{x}{y}")),
        "==" => Value::Bool(x == y),
        "!=" => Value::Bool(x != y),
        "<" => Value::Bool(x < y),
        "<=" => Value::Bool(x <= y),
        ">" => Value::Bool(x > y),
        ">=" => Value::Bool(x >= y),
        _ => return Err(errors::unsupported_operator(op, TypeTag::Str.name(), line)),
    })
}

fn bool_op(op: &str, x: bool, y: bool, line: u32) -> Fatal<Value> {
    Ok(match op {
        "==" => Value::Bool(x == y),
        "!=" => Value::Bool(x != y),
        "&" => Value::Bool(x & y),
        "|" => Value::Bool(x | y),
        _ => return Err(errors::unsupported_operator(op, TypeTag::Bool.name(), line)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaultKind;

    fn types() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn integer_arithmetic_and_comparison() {
        let t = types();
        assert_eq!(
            apply_binary("+", Value::Int(2), Value::Int(3), &t, 1).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            apply_binary("/", Value::Int(7), Value::Int(2), &t, 1).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            apply_binary("%", Value::Int(7), Value::Int(2), &t, 1).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            apply_binary("<", Value::Int(1), Value::Int(2), &t, 1).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let err = apply_binary("/", Value::Int(1), Value::Int(0), &types(), 4).unwrap_err();
        assert_eq!(err.kind, FaultKind::Fault);
        let err = apply_binary("%", Value::Int(1), Value::Int(0), &types(), 4).unwrap_err();
        assert_eq!(err.kind, FaultKind::Fault);
    }

    #[test]
    fn overflow_is_fatal() {
        let err =
            apply_binary("+", Value::Int(i64::MAX), Value::Int(1), &types(), 1).unwrap_err();
        assert_eq!(err.kind, FaultKind::Fault);
    }

    #[test]
    fn string_concat_and_ordering() {
        let t = types();
        assert_eq!(
            apply_binary("+", Value::Str("ab".into()), Value::Str("c".into()), &t, 1).unwrap(),
            Value::Str("abc".into())
        );
        assert_eq!(
            apply_binary("<", Value::Str("abc".into()), Value::Str("abd".into()), &t, 1).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn mixed_tags_are_a_type_error() {
        let err = apply_binary("+", Value::Int(1), Value::Str("x".into()), &types(), 1)
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::Type);
    }

    #[test]
    fn booleans_support_logic_but_not_ordering() {
        let t = types();
        assert_eq!(
            apply_binary("&", Value::Bool(true), Value::Bool(false), &t, 1).unwrap(),
            Value::Bool(false)
        );
        let err = apply_binary("<", Value::Bool(true), Value::Bool(false), &t, 1).unwrap_err();
        assert_eq!(err.kind, FaultKind::Type);
    }

    #[test]
    fn null_pointers_compare_equal() {
        let t = types();
        assert_eq!(
            apply_binary("==", Value::null(None), Value::null(None), &t, 1).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unary_not_requires_boolean() {
        assert_eq!(apply_unary("!", Value::Bool(false), 1).unwrap(), Value::Bool(true));
        let err = apply_unary("!", Value::Int(1), 1).unwrap_err();
        assert_eq!(err.kind, FaultKind::Type);
    }
}

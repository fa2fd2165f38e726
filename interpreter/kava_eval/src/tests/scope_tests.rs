//! Let scoping, shadowing, and activation isolation.

use pretty_assertions::assert_eq;

use super::{fatal_kind, run_program};
use crate::errors::FaultKind;

#[test]
fn locals_shadow_parameters_and_fields() {
    let out = run_program(
        r#"(class main
             (field int x 1)
             (method void show ((int x))
               (begin
                 (print x)
                 (let ((int x 3)) (print x))
                 (print x)))
             (method void main () (call me show 2)))"#,
    )
    .unwrap();
    assert_eq!(out, "2\n3\n2\n");
}

#[test]
fn nested_lets_shadow_and_unshadow() {
    let out = run_program(
        r#"(class main
             (method void main ()
               (let ((int x 1))
                 (begin
                   (print x)
                   (let ((int x 2)) (print x))
                   (print x)))))"#,
    )
    .unwrap();
    assert_eq!(out, "1\n2\n1\n");
}

#[test]
fn locals_vanish_after_the_let_block() {
    let kind = fatal_kind(
        r#"(class main
             (method void main ()
               (begin
                 (let ((int x 5)) (print x))
                 (print x))))"#,
    );
    assert_eq!(kind, FaultKind::Name);
}

#[test]
fn a_callee_cannot_see_caller_locals() {
    let kind = fatal_kind(
        r#"(class main
             (method void outer ()
               (let ((int secret 7)) (call me inner)))
             (method void inner () (print secret))
             (method void main () (call me outer)))"#,
    );
    assert_eq!(kind, FaultKind::Name);
}

#[test]
fn recursive_activations_keep_separate_locals() {
    let out = run_program(
        r#"(class main
             (method void rec ((int n))
               (if (> n 0)
                 (let ((int local n))
                   (begin
                     (call me rec (- n 1))
                     (print local)))))
             (method void main () (call me rec 2)))"#,
    )
    .unwrap();
    assert_eq!(out, "1\n2\n");
}

#[test]
fn early_return_discards_let_scopes() {
    let kind = fatal_kind(
        r#"(class main
             (method void leaky () (let ((int tmp 1)) (return)))
             (method void peek () (print tmp))
             (method void main ()
               (begin (call me leaky) (call me peek))))"#,
    );
    assert_eq!(kind, FaultKind::Name);
}

#[test]
fn duplicate_let_names_are_rejected() {
    let kind = fatal_kind(
        r#"(class main
             (method void main ()
               (let ((int x 1) (int x 2)) (print x))))"#,
    );
    assert_eq!(kind, FaultKind::Name);
}

#[test]
fn set_writes_the_innermost_binding() {
    let out = run_program(
        r#"(class main
             (field int x 10)
             (method void main ()
               (begin
                 (let ((int x 0))
                   (begin (set x 99) (print x)))
                 (print x))))"#,
    )
    .unwrap();
    assert_eq!(out, "99\n10\n");
}

#[test]
fn let_initializers_must_be_literals_of_the_declared_type() {
    let kind = fatal_kind(
        r#"(class main
             (method void main ()
               (let ((int x "five")) (print x))))"#,
    );
    assert_eq!(kind, FaultKind::Type);
}

#[test]
fn uninitialized_locals_get_zero_values() {
    let out = run_program(
        r#"(class main
             (method void main ()
               (let ((int i) (string s) (bool b) (main p))
                 (print i "|" s "|" b "|" p))))"#,
    )
    .unwrap();
    assert_eq!(out, "0||false|null\n");
}

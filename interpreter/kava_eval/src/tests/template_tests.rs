//! Template classes and specialization.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{fatal_kind, run_program};
use crate::class::specialize;
use crate::errors::FaultKind;
use crate::host::{InputHandler, OutputHandler, QueueInput};
use crate::session::Session;

const BOX_TEMPLATE: &str = r#"
(tclass Box (item_type)
  (field item_type value)
  (method void set_value ((item_type v)) (set value v))
  (method item_type get_value () (return value)))
"#;

#[test]
fn specialization_round_trips_a_value() {
    let out = run_program(&format!(
        r#"{BOX_TEMPLATE}
           (class main
             (method void main ()
               (let ((Box@int b))
                 (begin
                   (set b (new Box@int))
                   (call b set_value 5)
                   (print (call b get_value))))))"#
    ))
    .unwrap();
    assert_eq!(out, "5\n");
}

#[test]
fn distinct_type_arguments_make_distinct_classes() {
    let out = run_program(&format!(
        r#"{BOX_TEMPLATE}
           (class main
             (method void main ()
               (let ((Box@int i) (Box@string s))
                 (begin
                   (set i (new Box@int))
                   (set s (new Box@string))
                   (call i set_value 3)
                   (call s set_value "three")
                   (print (call i get_value) " " (call s get_value))))))"#
    ))
    .unwrap();
    assert_eq!(out, "3 three\n");
}

#[test]
fn specialization_is_memoized() {
    let mut session = Session::with_host(
        OutputHandler::Silent,
        InputHandler::Queue(QueueInput::new(Vec::<String>::new())),
    );
    session
        .run(&format!(
            r#"{BOX_TEMPLATE}
               (class main
                 (method void main ()
                   (let ((Box@int b)) (print "ok"))))"#
        ))
        .unwrap();

    let first = specialize(&mut session, "Box@int", 1).unwrap();
    let second = specialize(&mut session, "Box@int", 1).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn wrong_argument_count_is_a_type_error() {
    let kind = fatal_kind(&format!(
        r#"{BOX_TEMPLATE}
           (class main
             (method void main ()
               (let ((Box@int@int b)) (print "no"))))"#
    ));
    assert_eq!(kind, FaultKind::Type);
}

#[test]
fn unknown_type_argument_is_a_type_error() {
    let kind = fatal_kind(&format!(
        r#"{BOX_TEMPLATE}
           (class main
             (method void main ()
               (let ((Box@widget b)) (print "no"))))"#
    ));
    assert_eq!(kind, FaultKind::Type);
}

#[test]
fn new_with_unknown_template_is_a_type_error() {
    let kind = fatal_kind(
        r#"(class main
             (method void main ()
               (print (call (new Box@int) get_value))))"#,
    );
    assert_eq!(kind, FaultKind::Type);
}

#[test]
fn compound_type_tokens_substitute_segment_wise() {
    // `node@field_type` inside the template body becomes `node@int`.
    let out = run_program(
        r#"(tclass node (field_type)
             (field field_type value)
             (field node@field_type next)
             (method void set_val ((field_type v)) (set value v))
             (method field_type get_val () (return value))
             (method void set_next ((node@field_type n)) (set next n))
             (method node@field_type get_next () (return next)))
           (class main
             (method void main ()
               (let ((node@int head) (node@int second))
                 (begin
                   (set head (new node@int))
                   (set second (new node@int))
                   (call head set_val 1)
                   (call second set_val 2)
                   (call head set_next second)
                   (print (call (call head get_next) get_val))))))"#,
    )
    .unwrap();
    assert_eq!(out, "2\n");
}

#[test]
fn specializations_of_different_templates_do_not_collide() {
    let out = run_program(&format!(
        r#"{BOX_TEMPLATE}
           (tclass Pair (a_type b_type)
             (field a_type first)
             (field b_type second)
             (method void fill ((a_type a) (b_type b))
               (begin (set first a) (set second b)))
             (method a_type left () (return first))
             (method b_type right () (return second)))
           (class main
             (method void main ()
               (let ((Pair@int@string p) (Box@int b))
                 (begin
                   (set p (new Pair@int@string))
                   (set b (new Box@int))
                   (call p fill 1 "one")
                   (call b set_value 9)
                   (print (call p left) (call p right) (call b get_value))))))"#
    ))
    .unwrap();
    assert_eq!(out, "1one9\n");
}

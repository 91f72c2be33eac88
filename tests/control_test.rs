mod common;
use common::*;
use lineforth::{ErrorKind, ForthMachine};

#[test]
fn test_if_then() {
    assert!(stack_of("3 4 > if 99 then").is_empty());
    assert_eq!(stack_of("4 3 > if 99 then"), [99]);
    assert_eq!(stack_of("1 if 2 then 3"), [2, 3]);
    assert_eq!(stack_of("0 if 2 then 3"), [3]);
}

#[test]
fn test_if_else() {
    assert_eq!(stack_of("1 if 10 else 20 then"), [10]);
    assert_eq!(stack_of("0 if 10 else 20 then"), [20]);
    assert_eq!(stack_of("1 if 0 if 1 else 2 then 3 else 4 then 5"), [2, 3, 5]);
}

#[test]
fn test_if_missing_then() {
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "1 if 2"), ErrorKind::MissingTerminator);
    assert_eq!(forth.data_stack(), &[1]);
    assert_eq!(
        exec(&mut forth, &["clear 1 if 2"]),
        "<err:-6;msg:Expected \"then\" in input line.>"
    );
    assert_eq!(error_of(&mut forth, "else"), ErrorKind::UnknownWord);
}

#[test]
fn test_do_loop() {
    assert_eq!(output_of("5 0 do i . loop"), "0 1 2 3 4 ");
    assert_eq!(output_of("10 0 do i 2 mod if i . then loop"), "1 3 5 7 9 ");
    assert_eq!(output_of("3 3 do i . loop 1 ."), "1 ");
    assert_eq!(stack_of("0 4 1 do i + loop"), [6]);
    assert_eq!(output_of("-1 -3 do i . loop"), "-3 -2 ");
}

#[test]
fn test_nested_loops() {
    assert_eq!(
        output_of("3 1 do 3 1 do i j * . loop cr loop"),
        "1 2 \n2 4 \n"
    );
}

#[test]
fn test_loop_without_terminator() {
    assert_eq!(stack_of("3 0 do i"), [0, 1, 2]);
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "i"), ErrorKind::StackUnderflow);
    assert_eq!(error_of(&mut forth, "loop"), ErrorKind::UnknownWord);
}

#[test]
fn test_loop_in_definition() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": stars 0 do 42 emit loop ;"]);
    assert_eq!(exec(&mut forth, &["3 stars cr 2 stars"]), "***\n** <ok>");
}

#[test]
fn test_terminators_inside_comments_and_strings() {
    assert_eq!(stack_of("1 if 2 ( then ) 3 then 4"), [2, 3, 4]);
    assert_eq!(stack_of("1 if ( if positive ) 5 then 6"), [5, 6]);
    assert_eq!(stack_of("0 if 1 ( else ) 2 else 3 then"), [3]);
    assert_eq!(output_of("1 if .\" then done\" then"), "then done");
    assert_eq!(output_of("2 0 do s\" loop\" type loop"), "looploop");
}

#[test]
fn test_line_comment_ends_line() {
    assert_eq!(stack_of("3 0 do i \\ no loop here 99"), [0, 1, 2]);
    assert_eq!(stack_of("1 if 2 then \\ then 3"), [2]);
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "1 if 2 \\ then"), ErrorKind::MissingTerminator);
}

#[test]
fn test_loop_iteration_limit() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &["10 allocate"]);
    assert_eq!(error_of(&mut forth, "100000 0 do loop"), ErrorKind::StackOverflow);
    assert_eq!(error_of(&mut forth, ": spin 0 do loop ; 1000 spin"), ErrorKind::StackOverflow);
    assert_eq!(exec(&mut forth, &["clear 5 0 do loop"]), "<ok>");
}

mod common;
use common::*;
use lineforth::{ErrorKind, ForthMachine, Notice};

#[test]
fn test_define_and_call() {
    let mut forth = ForthMachine::new();
    assert_eq!(exec(&mut forth, &[": sq dup * ;"]), "<def:sq> created <ok>");
    assert_eq!(exec(&mut forth, &["7 sq"]), "<ok>");
    assert_eq!(forth.data_stack(), &[49]);
    assert_eq!(exec(&mut forth, &[": SQ dup dup * * ;"]), "<def:sq> modified <ok>");
    assert_eq!(exec(&mut forth, &["clear 2 sq ."]), "8 <ok>");
}

#[test]
fn test_tokens_after_definition() {
    assert_eq!(stack_of(": three 3 ; three three +"), [6]);
    let mut forth = ForthMachine::new();
    let outcome = forth.interpret(": one 1 ; : two 2 ;");
    assert_eq!(
        outcome.notices,
        [Notice::Created("one".to_string()), Notice::Created("two".to_string())]
    );
}

#[test]
fn test_definition_matches_inline() {
    let body = "over over + rot * swap -";
    let inline = stack_of(&format!("3 4 5 {}", body));
    let defined = stack_of(&format!(": f {} ; 3 4 5 f", body));
    assert_eq!(inline, defined);
}

#[test]
fn test_late_binding() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": a 1 ;", ": b a ;", ": a 2 ;", "b"]);
    assert_eq!(forth.data_stack(), &[2]);
}

#[test]
fn test_redefinition_while_running() {
    let mut forth = ForthMachine::new();
    // The running body keeps its tokens, the next call sees the constant.
    exec(&mut forth, &[": f 1 2 constant f 3 ;"]);
    assert_eq!(exec(&mut forth, &["f f"]), "<ok>");
    assert_eq!(forth.data_stack(), &[1, 3, 2]);

    let mut forth = ForthMachine::new();
    // `:` inside a body captures the rest of that body.
    exec(&mut forth, &[": g 1 : g 2"]);
    assert_eq!(exec(&mut forth, &["g g"]), "<def:g> modified <ok>");
    assert_eq!(forth.data_stack(), &[1, 2]);
    exec(&mut forth, &["g"]);
    assert_eq!(forth.data_stack(), &[1, 2, 2]);
}

#[test]
fn test_definition_with_comments_and_strings() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": f 1 ( ; ) 2 ;", ": hi .\" a ; b\" ;"]);
    assert_eq!(exec(&mut forth, &["f hi"]), "a ; b <ok>");
    assert_eq!(forth.data_stack(), &[1, 2]);
    exec(&mut forth, &[": g 3 \\ ; 4"]);
    assert_eq!(exec(&mut forth, &["clear g"]), "<ok>");
    assert_eq!(forth.data_stack(), &[3]);
    assert_eq!(error_of(&mut forth, ": h .\" open"), ErrorKind::MissingTerminator);
}

#[test]
fn test_bad_definition_names() {
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, ": 2x 2 * ;"), ErrorKind::InvalidDefinitionName);
    assert_eq!(error_of(&mut forth, ":"), ErrorKind::InvalidDefinitionName);
    assert_eq!(error_of(&mut forth, ": dup 1 ;"), ErrorKind::InvalidDefinitionName);
    assert_eq!(error_of(&mut forth, "1 constant +"), ErrorKind::InvalidDefinitionName);
    assert_eq!(error_of(&mut forth, "variable 9lives"), ErrorKind::InvalidDefinitionName);
    assert_eq!(error_of(&mut forth, ";"), ErrorKind::UnknownWord);
}

#[test]
fn test_recursion() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": fact dup 1 > if dup 1 - fact * then ;"]);
    assert_eq!(exec(&mut forth, &["5 fact ."]), "120 <ok>");
}

#[test]
fn test_unbounded_recursion() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": ping pong ;", ": pong ping ;"]);
    assert_eq!(
        exec(&mut forth, &["ping"]),
        "<err:-4;msg:Stack Overflow. Max recursion for a line of input is 1000; use allocate to change it.>"
    );
    assert_eq!(exec(&mut forth, &["10 allocate"]), "Stack max reallocated: 10 <ok>");
    exec(&mut forth, &[": deep dup if 1 - deep then ;"]);
    // Each level takes a word frame and a branch frame, the line takes one.
    assert_eq!(error_of(&mut forth, "5 deep"), ErrorKind::StackOverflow);
    assert_eq!(exec(&mut forth, &["clear 4 deep"]), "<ok>");
}

#[test]
fn test_constants() {
    assert_eq!(stack_of("42 constant answer answer Answer"), [42, 42]);
    assert_eq!(stack_of("1 constant x : x 2 ; x"), [2]);
    assert_eq!(stack_of(": x 2 ; 1 constant x x"), [1]);
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "constant c"), ErrorKind::StackUnderflow);
}

#[test]
fn test_words_and_see() {
    let mut forth = ForthMachine::new();
    exec(&mut forth, &[": sq dup * ;", "5 constant five", "variable v"]);
    assert_eq!(forth.interpret("words").output, "five sq v");
    assert_eq!(forth.interpret("see sq").output, ": sq dup * ;");
    assert_eq!(forth.interpret("see five").output, "5 constant five");
    assert_eq!(forth.interpret("see v").output, "variable v ( 1 )");
    assert_eq!(forth.interpret("see dup").output, "dup is built-in");
    assert_eq!(error_of(&mut forth, "see nope"), ErrorKind::UnknownWord);
}

#[test]
fn test_prelude_words() {
    let mut forth = ForthMachine::new();
    forth.load_prelude().unwrap();
    exec(&mut forth, &["4 inc 4 dec 3 square 1 not 0 not"]);
    assert_eq!(forth.data_stack(), &[5, 3, 9, 0, -1]);
    exec(&mut forth, &["clear 1 2 tuck 3 4 ddup ddrop"]);
    assert_eq!(forth.data_stack(), &[2, 1, 2, 3, 4]);
    exec(&mut forth, &["clear 3 cells cell+"]);
    assert_eq!(forth.data_stack(), &[4]);
}

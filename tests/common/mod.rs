#![allow(dead_code)]
use lineforth::{Cell, ErrorKind, ForthMachine};

/// Interpret each line, returning the rendered result of the last one.
pub fn exec(forth: &mut ForthMachine, lines: &[&str]) -> String {
    let mut s = String::new();
    for line in lines {
        s = forth.interpret(line).to_string();
    }
    s
}

/// Interpret `line` on a fresh machine and return its stack.
pub fn stack_of(line: &str) -> Vec<Cell> {
    let mut forth = ForthMachine::new();
    let outcome = forth.interpret(line);
    assert!(outcome.is_ok(), "{}: {}", line, outcome);
    forth.data_stack().to_vec()
}

pub fn output_of(line: &str) -> String {
    let mut forth = ForthMachine::new();
    let outcome = forth.interpret(line);
    assert!(outcome.is_ok(), "{}: {}", line, outcome);
    outcome.output
}

pub fn error_of(forth: &mut ForthMachine, line: &str) -> ErrorKind {
    match forth.interpret(line).error {
        Some(e) => e.kind(),
        None => panic!("{} should fail", line),
    }
}

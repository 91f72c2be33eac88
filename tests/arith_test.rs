mod common;
use common::*;
use lineforth::{Cell, ErrorKind, ForthMachine};

#[test]
fn test_arithmetic() {
    assert_eq!(stack_of("2 3 + 10 4 - 6 7 *"), [5, 6, 42]);
    assert_eq!(stack_of("7 2 / -7 2 / 7 -2 /"), [3, -3, -3]);
    assert_eq!(stack_of("7 2 mod -7 2 mod 7 -2 mod"), [1, -1, 1]);
    assert_eq!(stack_of("7 2 /mod"), [1, 3]);
    assert_eq!(stack_of("2 10 ^ 5 0 ^"), [1024, 1]);
    assert_eq!(stack_of("2 -1 ^ 1 -4 ^ -1 -3 ^"), [0, 1, -1]);
}

#[test]
fn test_arithmetic_wraps() {
    let line = format!("{} 1 +", Cell::MAX);
    assert_eq!(stack_of(&line), [Cell::MIN]);
    let line = format!("{} -1 /", Cell::MIN);
    assert_eq!(stack_of(&line), [Cell::MIN]);
}

#[test]
fn test_division_by_zero() {
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "1 0 /"), ErrorKind::DivisionByZero);
    assert_eq!(forth.data_stack(), &[1, 0]);
    assert_eq!(error_of(&mut forth, "clear 1 0 mod"), ErrorKind::DivisionByZero);
    assert_eq!(error_of(&mut forth, "clear 1 0 /mod"), ErrorKind::DivisionByZero);
    assert_eq!(error_of(&mut forth, "clear 0 -2 ^"), ErrorKind::DivisionByZero);
    assert_eq!(exec(&mut forth, &["clear 5 0 /"]), "<err:-7;msg:Division by zero.>");
}

#[test]
fn test_comparisons() {
    assert_eq!(stack_of("1 2 < 2 1 < 2 2 ="), [-1, 0, -1]);
    assert_eq!(stack_of("2 2 <> 2 3 != 3 3 >= 3 4 <= 4 3 >"), [0, -1, -1, -1, -1]);
}

#[test]
fn test_bit_operations() {
    assert_eq!(stack_of("6 3 and 6 3 or 6 3 xor"), [2, 7, 5]);
    assert_eq!(stack_of("1 4 lshift 256 4 rshift 0 invert"), [16, 16, -1]);
    assert_eq!(stack_of("1 1000 lshift 1 -1 rshift"), [0, 0]);
}

#[test]
fn test_number_bases() {
    assert_eq!(stack_of("hex ff 10 decimal 10"), [255, 16, 10]);
    assert_eq!(stack_of("base @"), [10]);
    assert_eq!(stack_of("2 base ! 101 #7"), [5, 7]);
    assert_eq!(stack_of("$ff %11 'A'"), [255, 3, 65]);
    assert_eq!(output_of("255 hex . -16 . decimal 10 ."), "FF -16 10 ");
}

#[test]
fn test_decimal_point_literals() {
    assert_eq!(stack_of("3.7 -2.5 + .9"), [1, 0]);
    let mut forth = ForthMachine::new();
    assert_eq!(error_of(&mut forth, "1.2.3"), ErrorKind::UnknownWord);
}

use lineforth::{Cell, ErrorKind, ForthMachine};
use proptest::prelude::*;

fn line_of(vals: &[i32], words: &str) -> String {
    let mut line: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
    line.push(words.to_string());
    line.join(" ")
}

fn cells(vals: &[i32]) -> Vec<Cell> {
    vals.iter().map(|&v| v as Cell).collect()
}

const BINARY_WORDS: &[&str] = &[
    "+", "-", "*", "/", "mod", "/mod", "^", "=", "<>", "<", ">", "<=", ">=", "and", "or", "xor",
    "lshift", "rshift", "swap", "over", "nip", "!", "+!", "type", "do",
];

proptest! {
    #[test]
    fn underflow_leaves_stack(a: i32, word in prop::sample::select(BINARY_WORDS)) {
        let mut forth = ForthMachine::new();
        let outcome = forth.interpret(&line_of(&[a], word));
        prop_assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackUnderflow));
        prop_assert_eq!(forth.data_stack(), &[a as Cell][..]);
    }

    #[test]
    fn ternary_underflow_leaves_stack(
        a: i32,
        b: i32,
        word in prop::sample::select(&["rot", "-rot", "fill", "move", "place", "+place"][..]),
    ) {
        let mut forth = ForthMachine::new();
        let outcome = forth.interpret(&line_of(&[a, b], word));
        prop_assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackUnderflow));
        prop_assert_eq!(forth.data_stack(), &cells(&[a, b])[..]);
    }

    #[test]
    fn dup_drop_is_identity(vals in prop::collection::vec(any::<i32>(), 1..16)) {
        let mut forth = ForthMachine::new();
        prop_assert!(forth.interpret(&line_of(&vals, "dup drop")).is_ok());
        prop_assert_eq!(forth.data_stack(), &cells(&vals)[..]);
    }

    #[test]
    fn swap_swap_is_identity(vals in prop::collection::vec(any::<i32>(), 2..16)) {
        let mut forth = ForthMachine::new();
        prop_assert!(forth.interpret(&line_of(&vals, "swap swap")).is_ok());
        prop_assert_eq!(forth.data_stack(), &cells(&vals)[..]);
    }

    #[test]
    fn division_recovers_dividend(a: i32, b in any::<i32>().prop_filter("non-zero", |b| *b != 0)) {
        let mut forth = ForthMachine::new();
        let line = line_of(&[a, b], &format!("/mod {} * +", b));
        prop_assert!(forth.interpret(&line).is_ok());
        prop_assert_eq!(forth.data_stack(), &[a as Cell][..]);
        let mut forth = ForthMachine::new();
        prop_assert!(forth.interpret(&line_of(&[a, b], "/")).is_ok());
        prop_assert_eq!(forth.data_stack(), &[(a as Cell).wrapping_div(b as Cell)][..]);
    }

    #[test]
    fn pick_copies_element(
        (vals, n) in prop::collection::vec(any::<i32>(), 2..12)
            .prop_flat_map(|vals| { let len = vals.len(); (Just(vals), 1..len) })
    ) {
        let mut forth = ForthMachine::new();
        let line = line_of(&vals, &format!("{} pick", n));
        prop_assert!(forth.interpret(&line).is_ok());
        let mut expected = cells(&vals);
        expected.push(vals[vals.len() - 1 - n] as Cell);
        prop_assert_eq!(forth.data_stack(), &expected[..]);
    }

    #[test]
    fn roll_moves_element(
        (vals, n) in prop::collection::vec(any::<i32>(), 2..12)
            .prop_flat_map(|vals| { let len = vals.len(); (Just(vals), 1..len) })
    ) {
        let mut forth = ForthMachine::new();
        let line = line_of(&vals, &format!("{} roll", n));
        prop_assert!(forth.interpret(&line).is_ok());
        let mut expected = cells(&vals);
        let val = expected.remove(vals.len() - 1 - n);
        expected.push(val);
        prop_assert_eq!(forth.data_stack(), &expected[..]);
    }

    #[test]
    fn definition_matches_inline(
        vals in prop::collection::vec(-100i32..100, 0..6),
        words in prop::collection::vec(
            prop::sample::select(&["+", "-", "*", "dup", "drop", "swap", "over", "rot", "1", "7"][..]),
            1..10,
        ),
    ) {
        let body = words.join(" ");
        let mut inline = ForthMachine::new();
        let inline_outcome = inline.interpret(&line_of(&vals, &body));
        let mut defined = ForthMachine::new();
        let define_ok = defined.interpret(&format!(": body {} ;", body)).is_ok();
        prop_assert!(define_ok);
        let defined_outcome = defined.interpret(&line_of(&vals, "body"));
        prop_assert_eq!(inline.data_stack(), defined.data_stack());
        prop_assert_eq!(
            inline_outcome.error.map(|e| e.kind()),
            defined_outcome.error.map(|e| e.kind())
        );
    }
}

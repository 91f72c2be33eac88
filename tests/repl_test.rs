use lineforth::{run_with, Config, ForthMachine};

fn session(forth: &mut ForthMachine, input: &str, styled: bool) -> Vec<String> {
    let mut out = Vec::new();
    run_with(forth, input.as_bytes(), &mut out, styled).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_banner() {
    let mut forth = ForthMachine::with_config(Config {
        memory_cells: 8192,
        ..Config::default()
    });
    let lines = session(&mut forth, "", false);
    assert_eq!(
        lines,
        [
            "Welcome to lineforth",
            "memory = 8,192 cells",
            "data_stack = 65,536 cells",
            "max_depth = 1,000",
            "unused 8,191 cells",
            "Bye!"
        ]
    );
}

#[test]
fn test_session_keeps_state() {
    let mut forth = ForthMachine::new();
    forth.load_prelude().unwrap();
    let lines = session(
        &mut forth,
        ": cube dup square * ;\n3 cube .\nvariable n\n7 n ! n @ cube .s\n",
        false,
    );
    assert_eq!(
        &lines[5..],
        [
            "<def:cube> created <ok>",
            "27 <ok>",
            "<def:n> created <ok>",
            "<1> 343 <ok>",
            "Bye!"
        ]
    );
}

#[test]
fn test_errors_are_styled() {
    let mut forth = ForthMachine::new();
    let lines = session(&mut forth, "1 2 +\nfoo\n", true);
    assert_eq!(lines[5], "<ok>");
    assert!(lines[6].starts_with("\u{1b}["));
    assert!(lines[6].contains("<err:-1;msg:<def:foo> not found>"));
}

#[test]
fn test_bye_stops_session() {
    let mut forth = ForthMachine::new();
    let lines = session(&mut forth, "1\nBYE\n2\n", false);
    assert_eq!(&lines[5..], ["<ok>", "<bye> <ok>", "Bye!"]);
    assert_eq!(forth.data_stack(), &[1]);
}

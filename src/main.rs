fn main() {
    lineforth::init_tracing();
    let mut forth = lineforth::with_cli_args();
    if let Err(e) = lineforth::run(&mut forth) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

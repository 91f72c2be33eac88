use clap::Parser;
use std::convert::TryFrom;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

mod builtins;
pub mod dictionary;
pub mod error;
pub mod input;
pub mod memory;
pub mod stack;

pub use builtins::{Builtin, FORTH_FALSE, FORTH_TRUE};
pub use error::{ErrorKind, ForthError};

use dictionary::{Defined, Dictionary, Entry};
use input::{Cursor, Token};
use memory::Memory;
use stack::Stack;

pub type Cell = isize;

/// Definitions every session starts with, one per line.
pub const PRELUDE: &str = "\
: inc 1 + ;
: dec 1 - ;
: cell 1 ;
: cells 1 * ;
: cell+ 1 + ;
: negate 0 swap - ;
: abs dup 0 < if negate then ;
: not 0 = ;
: max over over < if swap then drop ;
: min over over > if swap then drop ;
: square dup * ;
: tuck swap over ;
: ddup over over ;
: ddrop drop drop ;
: dswap 3 roll 3 roll ;
: dover 3 pick 3 pick ;
-1 constant true
0 constant false";

#[derive(Debug, Clone)]
pub struct Config {
    pub memory_cells: usize,
    pub stack_cells: usize,
    /// Maximum number of invocations per line: the line itself, every word
    /// body and branch entered, and every loop iteration after the first.
    pub max_depth: usize,
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_cells: 4096,
            stack_cells: 65536,
            max_depth: 1000,
            trace: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FrameKind {
    Line,
    Body(Rc<str>),
    Branch,
    Loop { index: Cell, limit: Cell },
}

#[derive(Debug)]
struct Frame {
    cursor: Cursor,
    kind: FrameKind,
}

#[derive(Debug)]
struct Capture {
    name: String,
    body: Vec<Token>,
}

/// While capturing, tokens are stored in the definition instead of run.
#[derive(Debug)]
enum Mode {
    Executing,
    Capturing(Capture),
}

/// Side effects of a line the caller may want to report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Created(String),
    Redefined(String),
    DepthLimit(usize),
    Trace(bool),
    Bye,
}

impl Notice {
    fn defined(name: &str, defined: Defined) -> Self {
        match defined {
            Defined::Created => Notice::Created(name.to_string()),
            Defined::Redefined => Notice::Redefined(name.to_string()),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Notice::Created(name) => write!(f, "<def:{}> created", name),
            Notice::Redefined(name) => write!(f, "<def:{}> modified", name),
            Notice::DepthLimit(n) => write!(f, "Stack max reallocated: {}", n),
            Notice::Trace(on) => write!(f, "console debugging enabled: {}", on),
            Notice::Bye => write!(f, "<bye>"),
        }
    }
}

/// Result of interpreting one line.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub notices: Vec<Notice>,
    pub error: Option<ForthError>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_bye(&self) -> bool {
        self.notices.contains(&Notice::Bye)
    }
}

/// Renders as `output notices <ok>` or `output notices <err:CODE;msg:MESSAGE>`.
impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let output = self.output.trim_end_matches(' ');
        if !output.is_empty() {
            write!(f, "{} ", output)?;
        }
        for notice in &self.notices {
            write!(f, "{} ", notice)?;
        }
        match &self.error {
            None => write!(f, "<ok>"),
            Some(e) => write!(f, "<err:{};msg:{}>", e.kind().code(), e),
        }
    }
}

#[derive(Debug)]
pub struct ForthMachine {
    memory: Memory,
    data_stack: Stack,
    dictionary: Dictionary,
    frames: Vec<Frame>,
    // Frames entered and loop iterations run by the current line.
    invocations: usize,
    mode: Mode,
    max_depth: usize,
    trace: bool,
    output: String,
    notices: Vec<Notice>,
    // Name of the builtin being executed, for error reports.
    curr_word: &'static str,
}

impl ForthMachine {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// # Panics
    ///
    /// Panics if `config.max_depth` or `config.stack_cells` is 0, or if
    /// `config.memory_cells` is less than 2.
    pub fn with_config(config: Config) -> Self {
        assert!(config.max_depth > 0);
        Self {
            memory: Memory::with_size(config.memory_cells),
            data_stack: Stack::with_max_elements(config.stack_cells),
            dictionary: Dictionary::new(),
            frames: Vec::new(),
            invocations: 0,
            mode: Mode::Executing,
            max_depth: config.max_depth,
            trace: config.trace,
            output: String::new(),
            notices: Vec::new(),
            curr_word: "",
        }
    }

    pub fn data_stack(&self) -> &[Cell] {
        self.data_stack.as_slice()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    /// Interpret a single line of input.
    ///
    /// The first error stops the line. Whatever the line changed before
    /// that (stack, memory, definitions) is kept.
    pub fn interpret(&mut self, line: &str) -> Outcome {
        self.output.clear();
        self.notices.clear();
        self.frames.clear();
        self.mode = Mode::Executing;
        self.invocations = 0;
        let tokens = input::tokenize(line);
        let result = self
            .push_frame(Cursor::new(tokens), FrameKind::Line)
            .and_then(|_| self.run());
        if let Err(e) = &result {
            debug!(error = %e, depth = self.frames.len(), "line aborted");
            self.frames.clear();
            self.mode = Mode::Executing;
        }
        Outcome {
            output: std::mem::take(&mut self.output),
            notices: std::mem::take(&mut self.notices),
            error: result.err(),
        }
    }

    /// Interpret `PRELUDE`, stopping at the first failing line.
    pub fn load_prelude(&mut self) -> Result<(), ForthError> {
        for line in PRELUDE.lines() {
            if let Some(e) = self.interpret(line).error {
                return Err(e);
            }
        }
        Ok(())
    }

    fn run(&mut self) -> Result<(), ForthError> {
        while let Some(frame) = self.frames.last_mut() {
            match frame.cursor.next() {
                Some(token) => self.step(token)?,
                None => self.finish_frame()?,
            }
        }
        Ok(())
    }

    fn step(&mut self, token: Token) -> Result<(), ForthError> {
        if let Mode::Capturing(..) = self.mode {
            return self.capture(token);
        }
        if self.trace {
            info!(word = token.raw(), stack = ?self.data_stack.as_slice(), "exec");
        }
        match token.word() {
            // Ends the whole line, not only the innermost frame.
            "\\" => {
                self.frames.clear();
                return Ok(());
            }
            "(" => {
                self.cursor()
                    .take_until(input::is_comment_end)
                    .ok_or_else(|| missing_span_end("("))?;
                return Ok(());
            }
            _ => (),
        }
        if let Some(num) = parse_num(token.raw(), self.memory.base()) {
            return builtins::ds_push(self, num);
        }
        if let Some(val) = self.dictionary.find_constant(token.word()) {
            return builtins::ds_push(self, val);
        }
        match self.dictionary.find_entry(token.word()).cloned() {
            Some(Entry::Builtin(builtin)) => builtin.execute(self),
            Some(Entry::User(body)) => {
                self.push_frame(Cursor::new(body), FrameKind::Body(token.word().into()))
            }
            Some(Entry::Variable(addr)) => builtins::ds_push(self, addr as Cell),
            None => Err(ForthError::UnknownWord(token.raw().to_string())),
        }
    }

    // `;` completes the definition. Comments and string literals are stored
    // whole so their words are never taken for `;`, a `\` comment is dropped.
    fn capture(&mut self, token: Token) -> Result<(), ForthError> {
        match token.word() {
            ";" => return self.finish_definition(),
            "\\" => {
                self.cursor().skip_to_end();
                return Ok(());
            }
            _ => (),
        }
        let span = input::span_terminator(token.word())
            .map(|pred| (pred, missing_span_end(token.word())));
        let mut tokens = vec![token];
        if let Some((pred, missing)) = span {
            let rest = self.cursor().take_until(pred).ok_or(missing)?;
            tokens.extend_from_slice(rest);
        }
        if let Mode::Capturing(capture) = &mut self.mode {
            capture.body.extend(tokens);
        }
        Ok(())
    }

    // An exhausted loop frame starts its next iteration, any other frame
    // is popped.
    fn finish_frame(&mut self) -> Result<(), ForthError> {
        if let Mode::Capturing(..) = self.mode {
            // A definition without `;` ends with the sequence `:` was in.
            return self.finish_definition();
        }
        let repeat = match self.frames.last_mut() {
            Some(Frame {
                kind: FrameKind::Loop { index, limit },
                ..
            }) => {
                *index += 1;
                *index < *limit
            }
            _ => false,
        };
        if repeat {
            self.charge_invocation()?;
            self.cursor().rewind();
        } else if let Some(frame) = self.frames.pop() {
            trace!(depth = self.frames.len(), kind = ?frame.kind, "pop frame");
        }
        Ok(())
    }

    // Entering a frame and every further loop iteration each count as one
    // invocation, at most `max_depth` of them per line.
    fn charge_invocation(&mut self) -> Result<(), ForthError> {
        if self.invocations >= self.max_depth {
            return Err(ForthError::RecursionLimitReached(self.max_depth));
        }
        self.invocations += 1;
        Ok(())
    }

    fn push_frame(&mut self, cursor: Cursor, kind: FrameKind) -> Result<(), ForthError> {
        self.charge_invocation()?;
        trace!(depth = self.frames.len(), kind = ?kind, "push frame");
        self.frames.push(Frame { cursor, kind });
        Ok(())
    }

    fn finish_definition(&mut self) -> Result<(), ForthError> {
        if let Mode::Capturing(capture) = std::mem::replace(&mut self.mode, Mode::Executing) {
            let defined = self
                .dictionary
                .define_word(&capture.name, capture.body.into())?;
            debug!(name = %capture.name, ?defined, "definition");
            self.notices.push(Notice::defined(&capture.name, defined));
        }
        Ok(())
    }

    // Builtins only run while a frame is being interpreted.
    fn cursor(&mut self) -> &mut Cursor {
        &mut self
            .frames
            .last_mut()
            .expect("no frame is being interpreted")
            .cursor
    }
}

impl Default for ForthMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_span_end(word: &str) -> ForthError {
    if word == "(" {
        ForthError::MissingTerminator("closing ')'")
    } else {
        ForthError::MissingTerminator("closing '\"'")
    }
}

fn radix_of(base: Cell) -> u32 {
    match u32::try_from(base) {
        Ok(radix) if (2..=36).contains(&radix) => radix,
        _ => 10,
    }
}

// Decimal literal with a single radix point, truncated toward zero.
fn parse_decimal(src: &str) -> Option<Cell> {
    let (int, frac) = src.split_once('.')?;
    let digits = int.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(int);
    if digits.is_empty() && frac.is_empty() {
        return None;
    }
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(digits) || !is_digits(frac) {
        return None;
    }
    if digits.is_empty() {
        Some(0)
    } else {
        isize::from_str_radix(int, 10).ok()
    }
}

/// Parse a number literal in `base`.
///
/// `#`, `$` and `%` prefixes force decimal, hex and binary. `'c'` is the
/// code point of `c`.
pub fn parse_num(src: &str, base: Cell) -> Option<Cell> {
    let radix = radix_of(base);
    if let Some(src) = src.strip_prefix('#') {
        isize::from_str_radix(src, 10).ok()
    } else if let Some(src) = src.strip_prefix('$') {
        isize::from_str_radix(src, 16).ok()
    } else if let Some(src) = src.strip_prefix('%') {
        isize::from_str_radix(src, 2).ok()
    } else if src.starts_with('\'') && src.ends_with('\'') && src.chars().count() == 3 {
        src.chars().nth(1).map(|c| c as Cell)
    } else if radix == 10 && src.contains('.') {
        parse_decimal(src)
    } else {
        isize::from_str_radix(src, radix).ok()
    }
}

pub fn format_num(val: Cell, base: Cell) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let radix = radix_of(base) as usize;
    let mut n = val.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[n % radix]);
        n /= radix;
        if n == 0 {
            break;
        }
    }
    if val < 0 {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

fn parse_count(val: &str) -> clap::error::Result<usize> {
    let invalid = |msg: String| clap::error::Error::raw(clap::error::ErrorKind::ValueValidation, msg);
    let last_char = val
        .chars()
        .last()
        .ok_or_else(|| invalid("empty value".to_string()))?;
    let (unit, val) = match last_char {
        'k' => (1024, &val[..val.len() - 1]),
        'M' => (1024 * 1024, &val[..val.len() - 1]),
        _ => (1, val),
    };
    let num: usize = val.parse().map_err(|e| invalid(format!("{}", e)))?;
    match num.checked_mul(unit) {
        Some(0) => Err(invalid("value must be positive".to_string())),
        Some(count) => Ok(count),
        None => Err(invalid(format!("{}{} is too large", val, last_char))),
    }
}

fn parse_memory_cells(val: &str) -> clap::error::Result<usize> {
    let cells = parse_count(val)?;
    if cells < 2 {
        Err(clap::error::Error::raw(
            clap::error::ErrorKind::ValueValidation,
            "memory needs at least 2 cells",
        ))
    } else {
        Ok(cells)
    }
}

fn fmt_count(count: usize) -> String {
    let chars = count
        .to_string()
        .chars()
        .rev()
        .enumerate()
        .fold(Vec::new(), |mut res, (i, ch)| {
            res.push(ch);
            if (i + 1) % 3 == 0 {
                res.push(',');
            }
            res
        });
    if chars.last() == Some(&',') {
        chars.iter().rev().skip(1).collect()
    } else {
        chars.iter().rev().collect()
    }
}

#[derive(Parser)]
#[command(name = "lineforth")]
/// Line oriented Forth interpreter
///
/// Every line of input is interpreted on its own and answered with its
/// output followed by `<ok>` or `<err:CODE;msg:MESSAGE>`.
///
///     $ echo '2 3 + .' | lineforth
///
/// Set RUST_LOG to control logging, e.g. RUST_LOG=lineforth=trace.
struct CliArgs {
    /// Number of memory cells, including the base register at address 0.
    ///
    /// You may suffix the number with 'k' or 'M'.
    #[arg(long, default_value = "4k", value_parser = parse_memory_cells)]
    memory_cells: usize,
    /// Maximum number of cells on the data stack.
    #[arg(long, default_value = "64k", value_parser = parse_count)]
    stack_cells: usize,
    /// Maximum number of word calls, branches and loop iterations within a line.
    #[arg(long, default_value = "1000", value_parser = parse_count)]
    max_depth: usize,
    /// Log every executed word.
    #[arg(long)]
    trace: bool,
    /// Start without the prelude definitions.
    #[arg(long)]
    no_prelude: bool,
}

pub fn with_cli_args() -> ForthMachine {
    let cli_args = CliArgs::parse();
    let mut forth = ForthMachine::with_config(Config {
        memory_cells: cli_args.memory_cells,
        stack_cells: cli_args.stack_cells,
        max_depth: cli_args.max_depth,
        trace: cli_args.trace,
    });
    if !cli_args.no_prelude {
        if let Err(e) = forth.load_prelude() {
            warn!(error = %e, "failed to load prelude");
        }
    }
    forth
}

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::filter::{EnvFilter, LevelFilter};
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
    if let Err(e) = installed {
        warn!(error = %e, "tracing subscriber already installed");
    }
}

pub fn run(forth: &mut ForthMachine) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let styled = std::env::var_os("NO_COLOR").is_none();
    run_with(forth, stdin.lock(), stdout.lock(), styled)
}

/// Read lines from `input` until it ends or `bye` is executed.
///
/// With `styled`, failed lines are printed in bold red.
pub fn run_with(
    forth: &mut ForthMachine,
    input: impl BufRead,
    mut out: impl Write,
    styled: bool,
) -> std::io::Result<()> {
    writeln!(out, "Welcome to lineforth")?;
    writeln!(out, "memory = {} cells", fmt_count(forth.memory.size()))?;
    writeln!(
        out,
        "data_stack = {} cells",
        fmt_count(forth.data_stack.max_elements())
    )?;
    writeln!(out, "max_depth = {}", fmt_count(forth.max_depth))?;
    writeln!(out, "unused {} cells", fmt_count(forth.memory.unused()))?;
    for line in input.lines() {
        let outcome = forth.interpret(&line?);
        if styled && !outcome.is_ok() {
            let text = ansi_term::Colour::Red.bold().paint(outcome.to_string());
            writeln!(out, "{}", text)?;
        } else {
            writeln!(out, "{}", outcome)?;
        }
        out.flush()?;
        if outcome.is_bye() {
            break;
        }
    }
    writeln!(out, "Bye!")?;
    Ok(())
}

#[cfg(test)]
fn eval(forth: &mut ForthMachine, line: &str) -> Outcome {
    let outcome = forth.interpret(line);
    assert!(forth.frames.is_empty());
    outcome
}

#[test]
fn test_parse_num() {
    assert_eq!(parse_num("42", 10), Some(42));
    assert_eq!(parse_num("-17", 10), Some(-17));
    assert_eq!(parse_num("ff", 16), Some(255));
    assert_eq!(parse_num("ff", 10), None);
    assert_eq!(parse_num("#10", 16), Some(10));
    assert_eq!(parse_num("$10", 10), Some(16));
    assert_eq!(parse_num("%101", 10), Some(5));
    assert_eq!(parse_num("'a'", 10), Some(97));
    assert_eq!(parse_num("3.7", 10), Some(3));
    assert_eq!(parse_num("-2.", 10), Some(-2));
    assert_eq!(parse_num(".5", 10), Some(0));
    assert_eq!(parse_num(".", 10), None);
    assert_eq!(parse_num("1.2.3", 10), None);
    assert_eq!(parse_num("1.5", 16), None);
    assert_eq!(parse_num("+", 10), None);
    assert_eq!(parse_num("-", 10), None);
    // Out of range bases fall back to decimal.
    assert_eq!(parse_num("19", 99), Some(19));
}

#[test]
fn test_format_num() {
    assert_eq!(format_num(0, 10), "0");
    assert_eq!(format_num(-255, 16), "-FF");
    assert_eq!(format_num(5, 2), "101");
    assert_eq!(format_num(Cell::MIN, 10), Cell::MIN.to_string());
}

#[test]
fn test_fmt_count() {
    assert_eq!(fmt_count(999), "999");
    assert_eq!(fmt_count(4096), "4,096");
    assert_eq!(fmt_count(1_048_576), "1,048,576");
}

#[test]
fn test_parse_count() {
    assert_eq!(parse_count("12").unwrap(), 12);
    assert_eq!(parse_count("4k").unwrap(), 4096);
    assert_eq!(parse_count("1M").unwrap(), 1024 * 1024);
    assert!(parse_count("0").is_err());
    assert!(parse_count("").is_err());
    assert!(parse_count("k").is_err());
    assert!(parse_memory_cells("1").is_err());
}

#[test]
fn test_interpret_arithmetic() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, "2 3 + 4 *");
    assert!(outcome.is_ok());
    assert_eq!(forth.data_stack(), &[20]);
    eval(&mut forth, "clear 7 2 / -7 2 / -7 2 mod");
    assert_eq!(forth.data_stack(), &[3, -3, -1]);
}

#[test]
fn test_interpret_case_insensitive() {
    let mut forth = ForthMachine::new();
    assert!(eval(&mut forth, "1 DUP Dup").is_ok());
    assert_eq!(forth.data_stack(), &[1, 1, 1]);
}

#[test]
fn test_interpret_unknown_word_stops_line() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, "1 Frob 2");
    assert_eq!(
        outcome.error,
        Some(ForthError::UnknownWord("Frob".to_string()))
    );
    assert_eq!(forth.data_stack(), &[1]);
    assert_eq!(outcome.to_string(), "<err:-1;msg:<def:Frob> not found>");
}

#[test]
fn test_interpret_definition() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, ": sq dup * ; 3 sq");
    assert_eq!(outcome.notices, [Notice::Created("sq".to_string())]);
    assert_eq!(forth.data_stack(), &[9]);
    let outcome = eval(&mut forth, ": sq dup dup * * ;");
    assert_eq!(outcome.notices, [Notice::Redefined("sq".to_string())]);
    assert_eq!(outcome.to_string(), "<def:sq> modified <ok>");
}

#[test]
fn test_interpret_definition_without_terminator() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, ": five 5");
    assert!(outcome.is_ok());
    eval(&mut forth, "five five +");
    assert_eq!(forth.data_stack(), &[10]);
}

#[test]
fn test_interpret_recursion_limit() {
    let mut forth = ForthMachine::with_config(Config {
        max_depth: 50,
        ..Config::default()
    });
    eval(&mut forth, ": forever forever ;");
    let outcome = eval(&mut forth, "forever");
    assert_eq!(outcome.error, Some(ForthError::RecursionLimitReached(50)));
    assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackOverflow));
    // The next line starts from an empty frame stack.
    assert!(eval(&mut forth, "1 2 +").is_ok());
    assert_eq!(forth.data_stack(), &[3]);
}

#[test]
fn test_interpret_deep_recursion() {
    let mut forth = ForthMachine::with_config(Config {
        max_depth: 1_000_000,
        ..Config::default()
    });
    eval(&mut forth, ": down dup 0 > if 1 - down then ;");
    assert!(eval(&mut forth, "50000 down").is_ok());
    assert_eq!(forth.data_stack(), &[0]);
}

#[test]
fn test_interpret_loop_iterations_count_toward_limit() {
    let mut forth = ForthMachine::with_config(Config {
        max_depth: 10,
        ..Config::default()
    });
    let outcome = eval(&mut forth, "100000 0 do loop");
    assert_eq!(outcome.error, Some(ForthError::RecursionLimitReached(10)));
    let outcome = eval(&mut forth, "-1 1 rshift 0 do loop");
    assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackOverflow));
    // Line, loop frame and 8 more iterations.
    assert!(eval(&mut forth, "clear 9 0 do i loop").is_ok());
    assert_eq!(forth.data_stack(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    let outcome = eval(&mut forth, "clear 10 0 do i loop");
    assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackOverflow));
    // The count starts over on every line.
    assert!(eval(&mut forth, "clear 9 0 do i loop").is_ok());
}

#[test]
fn test_init_tracing_twice() {
    init_tracing();
    // Already installed, logged instead of failing.
    init_tracing();
}

#[test]
#[should_panic]
fn test_with_config_zero_depth() {
    ForthMachine::with_config(Config {
        max_depth: 0,
        ..Config::default()
    });
}

#[test]
fn test_interpret_loops() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, "5 0 do i . loop");
    assert_eq!(outcome.output, "0 1 2 3 4 ");
    let outcome = eval(&mut forth, "3 1 do 2 0 do j . i . loop loop cr");
    assert_eq!(outcome.output, "1 0 1 1 2 0 2 1 \n");
    let outcome = eval(&mut forth, "0 0 do 1 . loop 7 .");
    assert_eq!(outcome.output, "7 ");
    let outcome = eval(&mut forth, "3 0 do i");
    assert!(outcome.is_ok());
    assert_eq!(forth.data_stack(), &[0, 1, 2]);
    let outcome = eval(&mut forth, "i");
    assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::StackUnderflow));
}

#[test]
fn test_interpret_conditionals() {
    let mut forth = ForthMachine::new();
    eval(&mut forth, "3 4 > if 99 then");
    assert!(forth.data_stack().is_empty());
    eval(&mut forth, "4 3 > if 99 then");
    assert_eq!(forth.data_stack(), &[99]);
    eval(&mut forth, "clear 0 if 1 else 2 then 3");
    assert_eq!(forth.data_stack(), &[2, 3]);
    eval(&mut forth, "clear -1 if 0 if 1 else 2 then else 3 then");
    assert_eq!(forth.data_stack(), &[2]);
    let outcome = eval(&mut forth, "clear 1 if 2");
    assert_eq!(
        outcome.error,
        Some(ForthError::MissingTerminator("\"then\""))
    );
    // The flag stays on the stack.
    assert_eq!(forth.data_stack(), &[1]);
    let outcome = eval(&mut forth, "then");
    assert_eq!(outcome.error.map(|e| e.kind()), Some(ErrorKind::UnknownWord));
}

#[test]
fn test_interpret_comments() {
    let mut forth = ForthMachine::new();
    assert!(eval(&mut forth, "1 ( one ) 2 \\ 3 4").is_ok());
    assert_eq!(forth.data_stack(), &[1, 2]);
    // A line comment inside a branch ends the whole line.
    assert!(eval(&mut forth, "clear 1 ( if ) 2 3 0 do i \\ loop 99").is_ok());
    assert_eq!(forth.data_stack(), &[1, 2, 0, 1, 2]);
    let outcome = eval(&mut forth, "( unterminated");
    assert_eq!(
        outcome.error.map(|e| e.kind()),
        Some(ErrorKind::MissingTerminator)
    );
}

#[test]
fn test_interpret_session_words() {
    let mut forth = ForthMachine::new();
    let outcome = eval(&mut forth, "20 allocate debug");
    assert_eq!(outcome.notices, [Notice::DepthLimit(20), Notice::Trace(true)]);
    assert_eq!(forth.max_depth(), 20);
    assert!(forth.is_tracing());
    let outcome = eval(&mut forth, "0 allocate");
    assert_eq!(outcome.error, Some(ForthError::DepthLimitTooSmall(0)));
    assert!(eval(&mut forth, "bye").is_bye());
}

#[test]
fn test_prelude() {
    let mut forth = ForthMachine::new();
    assert_eq!(forth.load_prelude(), Ok(()));
    eval(&mut forth, "-5 abs 3 negate 2 7 max 2 7 min true false");
    assert_eq!(forth.data_stack(), &[5, -3, 7, 2, -1, 0]);
    eval(&mut forth, "clear 1 2 3 4 dswap");
    assert_eq!(forth.data_stack(), &[3, 4, 1, 2]);
    eval(&mut forth, "clear 1 2 3 4 dover");
    assert_eq!(forth.data_stack(), &[1, 2, 3, 4, 1, 2]);
}

#[test]
fn test_run_with() {
    let mut forth = ForthMachine::new();
    let input = "1 2 + .\n: x 2 ;\nnope\nbye\n3 .\n";
    let mut out = Vec::new();
    run_with(&mut forth, input.as_bytes(), &mut out, false).unwrap();
    let out = String::from_utf8(out).unwrap();
    let lines: Vec<_> = out.lines().skip(5).collect();
    assert_eq!(
        lines,
        [
            "3 <ok>",
            "<def:x> created <ok>",
            "<err:-1;msg:<def:nope> not found>",
            "<bye> <ok>",
            "Bye!"
        ]
    );
}

use crate::Cell;

/// Error kinds, numbered the way the interpreter reports them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownWord = -1,
    StackUnderflow = -2,
    PickOutOfBounds = -3,
    StackOverflow = -4,
    InvalidDefinitionName = -5,
    MissingTerminator = -6,
    DivisionByZero = -7,
    InvalidAddress = -8,
    InvalidArgument = -9,
}

impl ErrorKind {
    pub fn code(self) -> isize {
        self as isize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForthError {
    UnknownWord(String),
    // Word name and the depth it needs.
    DataStackEmpty(&'static str, usize),
    NoLoopIndex(&'static str),
    PickOutOfBounds(Cell),
    RecursionLimitReached(usize),
    DataStackLimitReached(usize),
    BadDefinitionName(String),
    MissingDefinitionName,
    BuiltinRedefinition(String),
    MissingTerminator(&'static str),
    DivByZero,
    InvalidAddress(Cell),
    AllocFailed(Cell),
    NegativeCount(&'static str, Cell),
    DepthLimitTooSmall(Cell),
}

impl ForthError {
    pub fn kind(&self) -> ErrorKind {
        use ForthError::*;
        match self {
            UnknownWord(..) => ErrorKind::UnknownWord,
            DataStackEmpty(..) | NoLoopIndex(..) => ErrorKind::StackUnderflow,
            PickOutOfBounds(..) => ErrorKind::PickOutOfBounds,
            RecursionLimitReached(..) | DataStackLimitReached(..) => ErrorKind::StackOverflow,
            BadDefinitionName(..) | MissingDefinitionName | BuiltinRedefinition(..) => {
                ErrorKind::InvalidDefinitionName
            }
            MissingTerminator(..) => ErrorKind::MissingTerminator,
            DivByZero => ErrorKind::DivisionByZero,
            InvalidAddress(..) | AllocFailed(..) => ErrorKind::InvalidAddress,
            NegativeCount(..) | DepthLimitTooSmall(..) => ErrorKind::InvalidArgument,
        }
    }
}

impl std::fmt::Display for ForthError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ForthError::*;
        match self {
            UnknownWord(word) => write!(f, "<def:{}> not found", word),
            DataStackEmpty(word, depth) => {
                write!(f, "Too few arguments: \"{}\" needs {}.", word, depth)
            }
            NoLoopIndex(word) => write!(f, "\"{}\" used outside of a do ... loop.", word),
            PickOutOfBounds(n) => write!(f, "Pick out of bounds: {}.", n),
            RecursionLimitReached(limit) => write!(
                f,
                "Stack Overflow. Max recursion for a line of input is {}; use allocate to change it.",
                limit
            ),
            DataStackLimitReached(cells) => {
                write!(f, "Stack Overflow. Data stack is full ({} cells).", cells)
            }
            BadDefinitionName(name) => {
                write!(f, "Definition must begin with a letter: \"{}\".", name)
            }
            MissingDefinitionName => write!(f, "Definition is missing a name."),
            BuiltinRedefinition(name) => write!(f, "\"{}\" is a built-in word.", name),
            MissingTerminator(what) => write!(f, "Expected {} in input line.", what),
            DivByZero => write!(f, "Division by zero."),
            InvalidAddress(addr) => write!(f, "Invalid memory address: {}.", addr),
            AllocFailed(cells) => write!(f, "Cannot allot {} cells.", cells),
            NegativeCount(word, n) => write!(f, "\"{}\" got a negative count: {}.", word, n),
            DepthLimitTooSmall(n) => write!(f, "Max recursion must be at least 1, got {}.", n),
        }
    }
}

impl std::error::Error for ForthError {}

#[test]
fn test_error_kinds() {
    assert_eq!(ForthError::DivByZero.kind(), ErrorKind::DivisionByZero);
    assert_eq!(
        ForthError::RecursionLimitReached(10).kind(),
        ErrorKind::StackOverflow
    );
    assert_eq!(
        ForthError::DataStackLimitReached(10).kind(),
        ErrorKind::StackOverflow
    );
    assert_eq!(
        ForthError::BuiltinRedefinition("dup".to_string()).kind(),
        ErrorKind::InvalidDefinitionName
    );
    assert_eq!(ErrorKind::UnknownWord.code(), -1);
    assert_eq!(ErrorKind::MissingTerminator.code(), -6);
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ForthError::UnknownWord("foo".to_string()).to_string(),
        "<def:foo> not found"
    );
    assert_eq!(
        ForthError::DataStackEmpty("+", 2).to_string(),
        "Too few arguments: \"+\" needs 2."
    );
    assert_eq!(
        ForthError::MissingTerminator("\"then\"").to_string(),
        "Expected \"then\" in input line."
    );
}

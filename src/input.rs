use std::ops::Range;
use std::rc::Rc;

/// A whitespace delimited piece of input.
///
/// `raw` keeps the text as typed (string literals need it), `word` is the
/// lowercase form every lookup goes through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    raw: Rc<str>,
    word: Rc<str>,
}

impl Token {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.into(),
            word: raw.to_lowercase().into(),
        }
    }
    pub fn raw(&self) -> &str {
        &self.raw
    }
    pub fn word(&self) -> &str {
        &self.word
    }
}

pub fn tokenize(line: &str) -> Rc<[Token]> {
    line.split_whitespace().map(Token::new).collect()
}

/// Position inside a shared token sequence, limited to `start..end`.
///
/// Conditionals, loops and word bodies don't copy tokens around, they get a
/// `sub` cursor over a range of the same sequence.
#[derive(Clone, Debug)]
pub struct Cursor {
    tokens: Rc<[Token]>,
    start: usize,
    pos: usize,
    end: usize,
}

impl Cursor {
    pub fn new(tokens: Rc<[Token]>) -> Self {
        let end = tokens.len();
        Self {
            tokens,
            start: 0,
            pos: 0,
            end,
        }
    }

    pub fn sub(&self, range: Range<usize>) -> Self {
        assert!(range.start <= range.end && range.end <= self.end);
        Self {
            tokens: self.tokens.clone(),
            start: range.start,
            pos: range.start,
            end: range.end,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.end
    }

    pub fn rewind(&mut self) {
        self.pos = self.start;
    }

    pub fn jump(&mut self, pos: usize) {
        assert!(pos <= self.end);
        self.pos = pos;
    }

    pub fn skip_to_end(&mut self) {
        self.pos = self.end;
    }

    pub fn next(&mut self) -> Option<Token> {
        if self.is_done() {
            None
        } else {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        }
    }

    /// Consume tokens up to and including the first one matching `pred`.
    ///
    /// On success return the consumed tokens. If no token matches, the cursor
    /// is left at the end and `None` is returned.
    pub fn take_until(&mut self, pred: impl Fn(&Token) -> bool) -> Option<&[Token]> {
        let from = self.pos;
        match self.tokens[from..self.end].iter().position(pred) {
            None => {
                self.pos = self.end;
                None
            }
            Some(offset) => {
                self.pos = from + offset + 1;
                Some(&self.tokens[from..self.pos])
            }
        }
    }

    /// Find the `close` word matching an already consumed `open` word.
    ///
    /// Nested `open`/`close` pairs are skipped, and so are comments and
    /// string literals. Returns the position of the first `middle` word at
    /// the outer nesting level (if any) and of `close`. The cursor is not
    /// moved.
    pub fn find_matching(
        &self,
        open: &str,
        close: &str,
        middle: Option<&str>,
    ) -> Option<(Option<usize>, usize)> {
        let mut nesting = 0;
        let mut middle_pos = None;
        let end = self.code_end();
        let mut ix = self.pos;
        while ix < end {
            let word = self.tokens[ix].word();
            if let Some(pred) = span_terminator(word) {
                ix = self.find_from(ix + 1, pred)?;
            } else if word == open {
                nesting += 1;
            } else if word == close {
                if nesting == 0 {
                    return Some((middle_pos, ix));
                }
                nesting -= 1;
            } else if nesting == 0 && middle_pos.is_none() && middle == Some(word) {
                middle_pos = Some(ix);
            }
            ix += 1;
        }
        None
    }

    /// Position of the first `\` line comment after the cursor, outside of
    /// comments and string literals, or the end.
    pub fn code_end(&self) -> usize {
        let mut ix = self.pos;
        while ix < self.end {
            let word = self.tokens[ix].word();
            if word == "\\" {
                return ix;
            }
            match span_terminator(word) {
                Some(pred) => match self.find_from(ix + 1, pred) {
                    Some(close) => ix = close + 1,
                    None => return self.end,
                },
                None => ix += 1,
            }
        }
        self.end
    }

    fn find_from(&self, from: usize, pred: fn(&Token) -> bool) -> Option<usize> {
        (from..self.end).find(|&ix| pred(&self.tokens[ix]))
    }
}

pub fn is_comment_end(token: &Token) -> bool {
    token.raw().ends_with(')')
}

pub fn is_string_end(token: &Token) -> bool {
    token.raw().ends_with('"')
}

/// Words opening a span of tokens that is not interpreted, with the
/// predicate for the token closing it.
pub fn span_terminator(word: &str) -> Option<fn(&Token) -> bool> {
    match word {
        "(" => Some(is_comment_end),
        ".\"" | "s\"" => Some(is_string_end),
        _ => None,
    }
}

#[test]
fn test_tokenize() {
    let tokens = tokenize("  1 2\tDUP  s\" Hello World\"\n");
    let words: Vec<_> = tokens.iter().map(|t| t.word()).collect();
    assert_eq!(words, ["1", "2", "dup", "s\"", "hello", "world\""]);
    assert_eq!(tokens[4].raw(), "Hello");
    assert!(tokenize("   ").is_empty());
}

#[test]
fn test_cursor_take_until() {
    let mut cursor = Cursor::new(tokenize("( a comment ) 1 ( open"));
    assert_eq!(cursor.next().unwrap().word(), "(");
    let taken = cursor.take_until(|t| t.word().ends_with(')')).unwrap();
    assert_eq!(taken.len(), 3);
    assert_eq!(cursor.next().unwrap().word(), "1");
    assert_eq!(cursor.next().unwrap().word(), "(");
    assert!(cursor.take_until(|t| t.word().ends_with(')')).is_none());
    assert!(cursor.is_done());
}

#[test]
fn test_cursor_find_matching() {
    let mut cursor = Cursor::new(tokenize("if a if b else c then else d then e"));
    cursor.next();
    assert_eq!(cursor.find_matching("if", "then", Some("else")), Some((Some(7), 9)));
    let cursor = Cursor::new(tokenize("do i do j loop"));
    let mut inner = cursor.sub(1..5);
    assert_eq!(inner.find_matching("do", "loop", None), None);
    inner.jump(3);
    assert_eq!(inner.find_matching("do", "loop", None), Some((None, 4)));
}

#[test]
fn test_cursor_find_matching_skips_spans() {
    let mut cursor = Cursor::new(tokenize("if ( then ) .\" else then\" s\" loop\" then 4"));
    cursor.next();
    assert_eq!(cursor.find_matching("if", "then", Some("else")), Some((None, 9)));
    let mut cursor = Cursor::new(tokenize("if 2 \\ then"));
    cursor.next();
    assert_eq!(cursor.find_matching("if", "then", None), None);
    let mut cursor = Cursor::new(tokenize("do ( loop"));
    cursor.next();
    assert_eq!(cursor.find_matching("do", "loop", None), None);
}

#[test]
fn test_cursor_code_end() {
    let cursor = Cursor::new(tokenize("1 .\" a \\ b\" 2 \\ 3 4"));
    assert_eq!(cursor.code_end(), 6);
    let mut cursor = Cursor::new(tokenize("1 ( \\ ) 2"));
    assert_eq!(cursor.code_end(), 5);
    cursor.jump(4);
    assert_eq!(cursor.code_end(), 5);
    let cursor = Cursor::new(tokenize("1 ( \\ 2"));
    assert_eq!(cursor.code_end(), 4);
}

#[test]
fn test_cursor_sub_rewind() {
    let cursor = Cursor::new(tokenize("a b c d"));
    let mut sub = cursor.sub(1..3);
    assert_eq!(sub.next().unwrap().word(), "b");
    assert_eq!(sub.next().unwrap().word(), "c");
    assert!(sub.next().is_none());
    sub.rewind();
    assert_eq!(sub.pos(), 1);
    assert_eq!(sub.end(), 3);
}

use crate::builtins::{Builtin, BUILTIN_WORDS};
use crate::error::ForthError;
use crate::input::Token;
use crate::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// What a dictionary name stands for.
#[derive(Clone, Debug)]
pub enum Entry {
    Builtin(Builtin),
    /// Body tokens captured verbatim by `:`, resolved again on every call.
    User(Rc<[Token]>),
    /// Pushes the address of its cell.
    Variable(usize),
}

/// Whether a definition introduced a new name or replaced an old one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Defined {
    Created,
    Redefined,
}

/// Name to word mapping plus the separate constant table.
///
/// Constants and words share one namespace where the latest definition
/// wins. Built-in names can't be defined.
#[derive(Debug)]
pub struct Dictionary {
    words: HashMap<String, Entry>,
    constants: HashMap<String, Cell>,
}

// A definition name must start with a letter.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
}

impl Dictionary {
    pub fn new() -> Self {
        let words = BUILTIN_WORDS
            .iter()
            .map(|(name, builtin)| (name.to_string(), Entry::Builtin(*builtin)))
            .collect();
        Self {
            words,
            constants: HashMap::new(),
        }
    }

    pub fn find_constant(&self, name: &str) -> Option<Cell> {
        self.constants.get(name).copied()
    }

    pub fn find_entry(&self, name: &str) -> Option<&Entry> {
        self.words.get(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        matches!(self.words.get(name), Some(Entry::Builtin(..)))
    }

    pub fn check_name(&self, name: &str) -> Result<(), ForthError> {
        if !is_valid_name(name) {
            Err(ForthError::BadDefinitionName(name.to_string()))
        } else if self.is_builtin(name) {
            Err(ForthError::BuiltinRedefinition(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn insert_entry(&mut self, name: &str, entry: Entry) -> Result<Defined, ForthError> {
        self.check_name(name)?;
        let had_constant = self.constants.remove(name).is_some();
        let had_word = self.words.insert(name.to_string(), entry).is_some();
        Ok(if had_constant || had_word {
            Defined::Redefined
        } else {
            Defined::Created
        })
    }

    pub fn define_word(&mut self, name: &str, body: Rc<[Token]>) -> Result<Defined, ForthError> {
        self.insert_entry(name, Entry::User(body))
    }

    pub fn define_variable(&mut self, name: &str, addr: usize) -> Result<Defined, ForthError> {
        self.insert_entry(name, Entry::Variable(addr))
    }

    pub fn define_constant(&mut self, name: &str, val: Cell) -> Result<Defined, ForthError> {
        self.check_name(name)?;
        let had_word = self.words.remove(name).is_some();
        let had_constant = self.constants.insert(name.to_string(), val).is_some();
        Ok(if had_constant || had_word {
            Defined::Redefined
        } else {
            Defined::Created
        })
    }

    /// Names of everything defined after startup, sorted.
    pub fn user_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .words
            .iter()
            .filter(|(_, entry)| !matches!(entry, Entry::Builtin(..)))
            .map(|(name, _)| name.as_str())
            .chain(self.constants.keys().map(|name| name.as_str()))
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn body(src: &str) -> Rc<[Token]> {
    crate::input::tokenize(src)
}

#[test]
fn test_dictionary_define_word() {
    let mut dict = Dictionary::new();
    assert!(dict.find_entry("square").is_none());
    assert_eq!(dict.define_word("square", body("dup *")), Ok(Defined::Created));
    match dict.find_entry("square") {
        Some(Entry::User(tokens)) => assert_eq!(tokens.len(), 2),
        e => panic!("unexpected entry {:?}", e),
    }
    assert_eq!(dict.define_word("square", body("dup dup * *")), Ok(Defined::Redefined));
    match dict.find_entry("square") {
        Some(Entry::User(tokens)) => assert_eq!(tokens.len(), 4),
        e => panic!("unexpected entry {:?}", e),
    }
}

#[test]
fn test_dictionary_bad_names() {
    let mut dict = Dictionary::new();
    assert_eq!(
        dict.define_word("2dup", body("over over")),
        Err(ForthError::BadDefinitionName("2dup".to_string()))
    );
    assert_eq!(
        dict.define_word("dup", body("1")),
        Err(ForthError::BuiltinRedefinition("dup".to_string()))
    );
    assert_eq!(
        dict.define_constant("swap", 1),
        Err(ForthError::BuiltinRedefinition("swap".to_string()))
    );
    assert!(dict.is_builtin("dup"));
}

#[test]
fn test_dictionary_constants_share_namespace() {
    let mut dict = Dictionary::new();
    assert_eq!(dict.define_constant("ten", 10), Ok(Defined::Created));
    assert_eq!(dict.find_constant("ten"), Some(10));
    assert_eq!(dict.define_word("ten", body("5 5 +")), Ok(Defined::Redefined));
    assert_eq!(dict.find_constant("ten"), None);
    assert!(dict.find_entry("ten").is_some());
    assert_eq!(dict.define_constant("ten", 11), Ok(Defined::Redefined));
    assert!(dict.find_entry("ten").is_none());
    assert_eq!(dict.define_variable("counter", 3), Ok(Defined::Created));
    assert_eq!(dict.user_names(), ["counter", "ten"]);
}

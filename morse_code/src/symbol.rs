//! Dots, dashes and the in-progress code.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// Long blink → dash, short blink → dot.
    pub fn from_blink(is_long: bool) -> Self {
        if is_long { Symbol::Dash } else { Symbol::Dot }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::Dot  => '.',
            Symbol::Dash => '-',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Symbol::Dot),
            '-' => Some(Symbol::Dash),
            _   => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The code being entered, capped at the longest code in the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolBuffer {
    code:    String,
    max_len: usize,
}

impl SymbolBuffer {
    pub fn new(max_len: usize) -> Self {
        SymbolBuffer { code: String::with_capacity(max_len), max_len }
    }

    /// Append a symbol.  Returns `false` (and drops it) when full.
    pub fn push(&mut self, sym: Symbol) -> bool {
        if self.code.len() >= self.max_len {
            return false;
        }
        self.code.push(sym.as_char());
        true
    }

    pub fn pop(&mut self) -> Option<Symbol> {
        self.code.pop().and_then(Symbol::from_char)
    }

    pub fn clear(&mut self) {
        self.code.clear();
    }

    /// The buffered code; the buffer is left empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.code)
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.code.len() >= self.max_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl fmt::Display for SymbolBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

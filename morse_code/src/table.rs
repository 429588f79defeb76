//! The Morse table: code ↔ character / command.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Non-character codes used for hands-free text entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Enter,
    Space,
    Backspace,
    Caps,
    Clear,
    Sos,
    TtsToggle,
    /// Pick suggestion 1–3.
    Select(u8),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Enter     => write!(f, "ENTER"),
            Command::Space     => write!(f, "SPACE"),
            Command::Backspace => write!(f, "BACKSPACE"),
            Command::Caps      => write!(f, "CAPS"),
            Command::Clear     => write!(f, "CLEAR"),
            Command::Sos       => write!(f, "SOS"),
            Command::TtsToggle => write!(f, "TTS_TOGGLE"),
            Command::Select(n) => write!(f, "SELECT{}", n),
        }
    }
}

/// What a code stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entry {
    Char(char),
    Command(Command),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("code {0:?} is assigned twice")]
    DuplicateCode(String),
    #[error("character {0:?} is assigned twice")]
    DuplicateChar(char),
    #[error("code {0:?} must be a non-empty string of '.' and '-'")]
    InvalidCode(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Standard table
// ════════════════════════════════════════════════════════════════════════════

const LETTERS: [(char, &str); 26] = [
    ('A', ".-"),   ('B', "-..."), ('C', "-.-."), ('D', "-.."),  ('E', "."),
    ('F', "..-."), ('G', "--."),  ('H', "...."), ('I', ".."),   ('J', ".---"),
    ('K', "-.-"),  ('L', ".-.."), ('M', "--"),   ('N', "-."),   ('O', "---"),
    ('P', ".--."), ('Q', "--.-"), ('R', ".-."),  ('S', "..."),  ('T', "-"),
    ('U', "..-"),  ('V', "...-"), ('W', ".--"),  ('X', "-..-"), ('Y', "-.--"),
    ('Z', "--.."),
];

const DIGITS: [(char, &str); 10] = [
    ('0', "-----"), ('1', ".----"), ('2', "..---"), ('3', "...--"), ('4', "....-"),
    ('5', "....."), ('6', "-...."), ('7', "--..."), ('8', "---.."), ('9', "----."),
];

const COMMANDS: [(Command, &str); 10] = [
    (Command::Enter,     ".-.-"),
    (Command::Space,     "..--"),
    (Command::Backspace, "----"),
    (Command::Caps,      ".--.-"),
    (Command::Clear,     "..-.."),
    (Command::Sos,       "......"),
    (Command::TtsToggle, "-.-.-"),
    (Command::Select(1), ".---."),
    (Command::Select(2), "..--."),
    (Command::Select(3), ".--.."),
];

fn standard_entries() -> impl Iterator<Item = (Entry, &'static str)> {
    LETTERS
        .iter()
        .chain(DIGITS.iter())
        .map(|&(c, code)| (Entry::Char(c), code))
        .chain(COMMANDS.iter().map(|&(cmd, code)| (Entry::Command(cmd), code)))
}

/// Bidirectional code table.
#[derive(Clone, Debug)]
pub struct MorseTable {
    decode:  HashMap<String, Entry>,
    encode:  HashMap<Entry, String>,
    /// Characters in insertion order, for menus and target selection.
    chars:   Vec<(char, String)>,
    max_len: usize,
}

impl MorseTable {
    /// Letters A–Z, digits 0–9 and the command codes.  Built once.
    pub fn standard() -> &'static MorseTable {
        static TABLE: OnceLock<MorseTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table = MorseTable::empty();
            for (entry, code) in standard_entries() {
                table.insert(entry, code);
            }
            table
        })
    }

    fn empty() -> MorseTable {
        MorseTable {
            decode:  HashMap::new(),
            encode:  HashMap::new(),
            chars:   Vec::new(),
            max_len: 0,
        }
    }

    fn insert(&mut self, entry: Entry, code: &str) {
        if let Entry::Char(c) = entry {
            self.chars.push((c, code.to_string()));
        }
        self.decode.insert(code.to_string(), entry);
        self.encode.insert(entry, code.to_string());
        self.max_len = self.max_len.max(code.len());
    }

    /// Build a custom table, rejecting malformed or ambiguous entries.
    pub fn new<'a, I>(entries: I) -> Result<MorseTable, TableError>
    where
        I: IntoIterator<Item = (Entry, &'a str)>,
    {
        let mut table = MorseTable::empty();
        for (entry, code) in entries {
            if code.is_empty() || !code.chars().all(|c| c == '.' || c == '-') {
                return Err(TableError::InvalidCode(code.to_string()));
            }
            if table.decode.contains_key(code) {
                return Err(TableError::DuplicateCode(code.to_string()));
            }
            let entry = match entry {
                Entry::Char(c) => Entry::Char(c.to_ascii_uppercase()),
                other => other,
            };
            if table.encode.contains_key(&entry) {
                return Err(match entry {
                    Entry::Char(c) => TableError::DuplicateChar(c),
                    Entry::Command(_) => TableError::DuplicateCode(code.to_string()),
                });
            }
            table.insert(entry, code);
        }
        Ok(table)
    }

    pub fn decode(&self, code: &str) -> Option<Entry> {
        self.decode.get(code).copied()
    }

    /// The character for `code`, or `None` for commands and unknown codes.
    pub fn letter_for(&self, code: &str) -> Option<char> {
        match self.decode(code)? {
            Entry::Char(c) => Some(c),
            Entry::Command(_) => None,
        }
    }

    /// Code for a character (case-insensitive).
    pub fn encode(&self, c: char) -> Option<&str> {
        self.encode.get(&Entry::Char(c.to_ascii_uppercase())).map(String::as_str)
    }

    pub fn command_code(&self, cmd: Command) -> Option<&str> {
        self.encode.get(&Entry::Command(cmd)).map(String::as_str)
    }

    /// Alphabetic characters in table order.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().map(|(c, _)| *c).filter(|c| c.is_ascii_alphabetic())
    }

    /// Every character with its code, in table order.
    pub fn chars_with_codes(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.chars.iter().map(|(c, code)| (*c, code.as_str()))
    }

    /// Length of the longest code; symbol buffers are capped at this.
    pub fn max_code_len(&self) -> usize {
        self.max_len
    }

    /// Encode a whole message, separating letters with spaces and words
    /// with ` / `.  Characters without a code are skipped.
    pub fn encode_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                word.chars()
                    .filter_map(|c| self.encode(c))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Inverse of [`encode_text`](Self::encode_text).  Unknown codes become `?`.
    pub fn decode_text(&self, morse: &str) -> String {
        morse
            .split('/')
            .map(|word| {
                word.split_whitespace()
                    .map(|code| self.letter_for(code).unwrap_or('?'))
                    .collect::<String>()
            })
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_entries_are_unambiguous() {
        assert!(MorseTable::new(standard_entries()).is_ok());
    }

    #[test]
    fn standard_table_is_complete() {
        let t = MorseTable::standard();
        assert_eq!(t.letters().count(), 26);
        assert_eq!(t.chars_with_codes().count(), 36);
        assert_eq!(t.max_code_len(), 6);
    }

    #[test]
    fn letters_and_digits_both_ways() {
        let t = MorseTable::standard();
        assert_eq!(t.letter_for(".-"), Some('A'));
        assert_eq!(t.letter_for("--.."), Some('Z'));
        assert_eq!(t.letter_for("-----"), Some('0'));
        assert_eq!(t.encode('e'), Some("."));
        assert_eq!(t.encode('E'), Some("."));
        assert_eq!(t.encode('#'), None);
        for (c, code) in t.chars_with_codes() {
            assert_eq!(t.decode(code), Some(Entry::Char(c)));
        }
    }

    #[test]
    fn commands_decode_but_are_not_letters() {
        let t = MorseTable::standard();
        assert_eq!(t.decode(".-.-"), Some(Entry::Command(Command::Enter)));
        assert_eq!(t.decode("----"), Some(Entry::Command(Command::Backspace)));
        assert_eq!(t.decode("..-.."), Some(Entry::Command(Command::Clear)));
        assert_eq!(t.decode(".--.."), Some(Entry::Command(Command::Select(3))));
        assert_eq!(t.letter_for("......"), None);
        assert_eq!(t.command_code(Command::Sos), Some("......"));
    }

    #[test]
    fn unknown_codes() {
        let t = MorseTable::standard();
        assert_eq!(t.decode(""), None);
        assert_eq!(t.decode("-------"), None);
        assert_eq!(t.letter_for("-.-.--"), None);
    }

    #[test]
    fn rejects_duplicates_and_garbage() {
        let dup = [(Entry::Char('A'), ".-"), (Entry::Char('B'), ".-")];
        assert_eq!(MorseTable::new(dup).unwrap_err(), TableError::DuplicateCode(".-".into()));

        let dup_char = [(Entry::Char('a'), ".-"), (Entry::Char('A'), "-.")];
        assert_eq!(MorseTable::new(dup_char).unwrap_err(), TableError::DuplicateChar('A'));

        let bad = [(Entry::Char('A'), ".x")];
        assert!(matches!(MorseTable::new(bad), Err(TableError::InvalidCode(_))));
        let empty = [(Entry::Char('A'), "")];
        assert!(matches!(MorseTable::new(empty), Err(TableError::InvalidCode(_))));
    }

    #[test]
    fn message_round_trip() {
        let t = MorseTable::standard();
        let morse = t.encode_text("sos help");
        assert_eq!(morse, "... --- ... / .... . .-.. .--.");
        assert_eq!(t.decode_text(&morse), "SOS HELP");
        assert_eq!(t.decode_text(".- ......"), "A?");
    }

    #[test]
    fn command_names() {
        assert_eq!(Command::TtsToggle.to_string(), "TTS_TOGGLE");
        assert_eq!(Command::Select(2).to_string(), "SELECT2");
    }
}

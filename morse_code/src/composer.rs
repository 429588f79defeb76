//! Hands-free text entry.
//!
//! Letters and digits append to the current line; command codes edit it.
//! Speech and phone integrations live outside this crate and react to the
//! events returned from [`Composer::apply`].

use serde::Serialize;
use tracing::{debug, info};

use crate::table::{Command, Entry, MorseTable};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ComposerEvent {
    /// A character was appended.
    Typed(char),
    /// The text changed by a command (space, backspace, clear).
    Edited(Command),
    /// ENTER: the finished line.  The composer is empty afterwards.
    Line(String),
    CapsChanged(bool),
    SpeechChanged(bool),
    Sos,
    Select(u8),
    /// No table entry for this code.
    Unknown(String),
}

/// Entered lines kept for display; older ones are dropped.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Clone, Debug, Default)]
pub struct Composer {
    text:   String,
    caps:   bool,
    speech: bool,
    lines:  Vec<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, table: &MorseTable, code: &str) -> ComposerEvent {
        let Some(entry) = table.decode(code) else {
            debug!(code, "unknown code");
            return ComposerEvent::Unknown(code.to_string());
        };
        match entry {
            Entry::Char(c) => {
                let c = if self.caps { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
                self.text.push(c);
                ComposerEvent::Typed(c)
            }
            Entry::Command(cmd) => self.command(cmd),
        }
    }

    fn command(&mut self, cmd: Command) -> ComposerEvent {
        match cmd {
            Command::Space => {
                self.text.push(' ');
                ComposerEvent::Edited(cmd)
            }
            Command::Backspace => {
                self.text.pop();
                ComposerEvent::Edited(cmd)
            }
            Command::Clear => {
                self.text.clear();
                ComposerEvent::Edited(cmd)
            }
            Command::Enter => {
                let line = std::mem::take(&mut self.text);
                info!(chars = line.chars().count(), "line entered");
                if self.lines.len() == HISTORY_LIMIT {
                    self.lines.remove(0);
                }
                self.lines.push(line.clone());
                ComposerEvent::Line(line)
            }
            Command::Caps => {
                self.caps = !self.caps;
                ComposerEvent::CapsChanged(self.caps)
            }
            Command::TtsToggle => {
                self.speech = !self.speech;
                ComposerEvent::SpeechChanged(self.speech)
            }
            Command::Sos => {
                info!("SOS entered");
                ComposerEvent::Sos
            }
            Command::Select(n) => ComposerEvent::Select(n),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caps(&self) -> bool {
        self.caps
    }

    pub fn speech(&self) -> bool {
        self.speech
    }

    /// The last [`HISTORY_LIMIT`] lines entered, oldest first.
    pub fn history(&self) -> &[String] {
        &self.lines
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(codes: &[&str]) -> (Composer, Vec<ComposerEvent>) {
        let mut c = Composer::new();
        let events = codes.iter().map(|code| c.apply(MorseTable::standard(), code)).collect();
        (c, events)
    }

    #[test]
    fn letters_are_lower_case_until_caps() {
        let (c, _) = typed(&["....", "..", ".--.-", "....", ".."]);
        assert_eq!(c.text(), "hiHI");
        assert!(c.caps());
    }

    #[test]
    fn space_backspace_clear() {
        let (c, _) = typed(&[".-", "..--", "-...", "----"]);
        assert_eq!(c.text(), "a ");
        let (c, _) = typed(&[".-", "-...", "..-.."]);
        assert_eq!(c.text(), "");
    }

    #[test]
    fn enter_emits_line_and_clears() {
        let (c, events) = typed(&["...", "---", "...", ".-.-"]);
        assert_eq!(events.last(), Some(&ComposerEvent::Line("sos".into())));
        assert_eq!(c.text(), "");
        assert_eq!(c.history(), ["sos".to_string()]);
    }

    #[test]
    fn special_commands() {
        let (c, events) = typed(&["......", "-.-.-", ".---.", "..--.", ".--..", "-.-.--"]);
        assert_eq!(
            events,
            vec![
                ComposerEvent::Sos,
                ComposerEvent::SpeechChanged(true),
                ComposerEvent::Select(1),
                ComposerEvent::Select(2),
                ComposerEvent::Select(3),
                ComposerEvent::Unknown("-.-.--".into()),
            ]
        );
        assert!(c.speech());
        assert_eq!(c.text(), "");
    }

    #[test]
    fn backspace_on_empty_is_harmless() {
        let (c, events) = typed(&["----"]);
        assert_eq!(events, vec![ComposerEvent::Edited(Command::Backspace)]);
        assert_eq!(c.text(), "");
    }

    #[test]
    fn history_keeps_only_the_latest_lines() {
        let mut c = Composer::new();
        let table = MorseTable::standard();
        for n in 0..HISTORY_LIMIT + 5 {
            // One digit per line: 0-9 cycling.
            let digit = char::from_digit((n % 10) as u32, 10).unwrap();
            let code = table.encode(digit).unwrap().to_string();
            c.apply(table, &code);
            c.apply(table, ".-.-");
        }
        assert_eq!(c.history().len(), HISTORY_LIMIT);
        assert_eq!(c.history().first().map(String::as_str), Some("5"));
        assert_eq!(c.history().last().map(String::as_str), Some("4"));
    }
}

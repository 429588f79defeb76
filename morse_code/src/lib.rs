//! # morse_code
//!
//! Everything between "a dot or dash arrived" and "this code means X".
//!
//! | Module | Role |
//! |---|---|
//! | [`table`] | fixed letter / digit / command table, both directions |
//! | [`symbol`] | [`Symbol`] and the capped [`SymbolBuffer`] |
//! | [`input`] | [`SymbolInput`]: debounce plus a single auto-submit deadline |
//! | [`composer`] | free-text entry driven by resolved codes |
//!
//! Nothing here reads a clock.  Callers pass a monotonic `now` in
//! milliseconds, which keeps every timed rule testable.
//!
//! ```rust
//! use morse_code::{Entry, MorseTable};
//!
//! let table = MorseTable::standard();
//! assert_eq!(table.decode("...---..."), None);
//! assert_eq!(table.decode("......"), Some(Entry::Command(morse_code::Command::Sos)));
//! assert_eq!(table.letter_for(".-"), Some('A'));
//! assert_eq!(table.encode('s'), Some("..."));
//! ```

pub mod composer;
pub mod input;
pub mod symbol;
pub mod table;

pub use composer::{Composer, ComposerEvent};
pub use input::{Accept, InputConfig, SymbolInput};
pub use symbol::{Symbol, SymbolBuffer};
pub use table::{Command, Entry, MorseTable, TableError};

//! Keyboard input.
//!
//! The window's event loop only knows which keys went down; it forwards
//! [`KeyPress`]es over a channel to a [`KeyboardSource`] thread, which turns
//! them into [`InputEvent`]s for the app.  Anything else that produces
//! `InputEvent`s (a switch interface, a test script) implements
//! [`InputSource`] and plugs in the same way.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use morse_code::Symbol;

// ════════════════════════════════════════════════════════════════════════════
// InputEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A manually entered dot or dash.
    Symbol(Symbol),
    /// Resolve the current code now.
    Submit,
    Backspace,
    Clear,
    /// Learn a new open-eye baseline.
    Recalibrate,
    /// Start, continue to the next level, or play again.
    Next,
    /// Back to the title screen.
    Menu,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// InputSource trait
// ════════════════════════════════════════════════════════════════════════════

pub trait InputSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<InputEvent>);
}

/// Spawn an input source on its own thread and return the receiving end.
pub fn spawn_input_source<S: InputSource>(source: S) -> Receiver<InputEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardSource
// ════════════════════════════════════════════════════════════════════════════

/// Keys the window reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    Space,      // dot
    ShiftSpace, // dash
    Enter,
    Backspace,
    Delete,
    R,
    N,
    Escape,
    Q,
}

pub struct KeyboardSource {
    pub rx: Receiver<KeyPress>,
}

impl KeyboardSource {
    pub fn translate(key: KeyPress) -> InputEvent {
        match key {
            KeyPress::Space      => InputEvent::Symbol(Symbol::Dot),
            KeyPress::ShiftSpace => InputEvent::Symbol(Symbol::Dash),
            KeyPress::Enter      => InputEvent::Submit,
            KeyPress::Backspace  => InputEvent::Backspace,
            KeyPress::Delete     => InputEvent::Clear,
            KeyPress::R          => InputEvent::Recalibrate,
            KeyPress::N          => InputEvent::Next,
            KeyPress::Escape     => InputEvent::Menu,
            KeyPress::Q          => InputEvent::Quit,
        }
    }
}

impl InputSource for KeyboardSource {
    fn run(self: Box<Self>, tx: Sender<InputEvent>) {
        for key in self.rx {
            let event = Self::translate(key);
            if tx.send(event).is_err() || event == InputEvent::Quit {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

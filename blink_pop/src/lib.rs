//! # blink_pop
//!
//! Hands-free Morse bubble-pop.  Short blinks type dots, long blinks type
//! dashes, and a finished code pops the bubble carrying its letter.  A
//! compose mode turns the same input into free text.
//!
//! ## Input
//!
//! Blinks come from a [`blink_detect::DetectionSession`] polled every frame.
//! Without a camera (or with a recorded landmark trace) the keyboard drives
//! everything:
//!
//! | Key | Action |
//! |---|---|
//! | `Space` | Dot |
//! | `Shift+Space` | Dash |
//! | `Enter` | Submit the current code |
//! | `Backspace` | Remove the last symbol |
//! | `Delete` | Clear the code |
//! | `R` | Recalibrate blink detection |
//! | `N` | Start / next level / play again |
//! | `Escape` | Back to the title screen |
//! | `Q` | Quit |
//!
//! ## Settings
//!
//! Read from the environment (a `.env` file is honoured) and overridden by
//! `--compose`, `--trace <path>` and `--mute`.  See [`settings`].

pub mod error;
pub mod logging;
pub mod settings;
pub mod input;
pub mod sound;
pub mod visualizer;
pub mod app;

pub use error::AppError;
pub use settings::{Mode, Settings, Tuning};

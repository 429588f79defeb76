//! # bubble_game
//!
//! Letters fall as bubbles; type (or blink) a letter's Morse code to pop it.
//!
//! | Piece | Where |
//! |---|---|
//! | tuning | [`GameConfig`] |
//! | bubbles and their spawning | [`target`] |
//! | phases, scoring, lives, levels, tick loop | [`engine`] |
//!
//! The engine is a plain state machine driven by the caller's clock: feed it
//! symbols and submissions as they arrive and call
//! [`GameEngine::update`] every frame.
//!
//! ```rust
//! use bubble_game::{GameConfig, GameEngine, MatchResult, Phase};
//! use morse_code::InputConfig;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut game = GameEngine::with_rng(GameConfig::default(), InputConfig::default(), StdRng::seed_from_u64(7));
//! game.start(0);
//! game.insert_target('E');
//! assert!(matches!(game.submit_code(".", 10), MatchResult::Popped { letter: 'E', .. }));
//! assert_eq!(game.stats().score, 10);
//! assert_eq!(game.phase(), Phase::Playing);
//! ```

pub mod config;
pub mod engine;
pub mod target;

pub use config::GameConfig;
pub use engine::{GameEngine, GameEvent, GameStats, MatchResult, Phase, SymbolSource};
pub use target::{Spawner, Target, PALETTE};

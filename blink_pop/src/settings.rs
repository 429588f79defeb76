//! App settings from the environment, command-line overrides and the
//! optional JSON tuning file.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `RUST_LOG` | `info` | log filter |
//! | `ENABLE_FILE_LOGS` | `false` | daily JSON logs under `LOG_DIR` |
//! | `LOG_DIR` | `./logs` | |
//! | `BLINK_POP_TUNING` | unset | JSON with optional `detector`, `input`, `game` sections |
//! | `BLINK_POP_TRACE` | unset | recorded landmark trace used as the camera |
//! | `BLINK_POP_SOUND` | `true` | audio cues |
//! | `BLINK_POP_MODE` | `game` | `game` or `compose` |

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use blink_detect::DetectorConfig;
use bubble_game::GameConfig;
use morse_code::InputConfig;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::logging::LogConfig;

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Pop bubbles.
    #[default]
    Game,
    /// Type free text.
    Compose,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game"    => Ok(Mode::Game),
            "compose" => Ok(Mode::Compose),
            other     => Err(format!("unknown mode {:?}", other)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Settings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub log:    LogConfig,
    pub tuning: Option<PathBuf>,
    pub trace:  Option<PathBuf>,
    pub sound:  bool,
    pub mode:   Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log:    LogConfig::default(),
            tuning: None,
            trace:  None,
            sound:  true,
            mode:   Mode::Game,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            log: LogConfig {
                log_level:        env_or("RUST_LOG", "info"),
                enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
                log_dir:          env_or("LOG_DIR", "./logs"),
            },
            tuning: env_path("BLINK_POP_TUNING"),
            trace:  env_path("BLINK_POP_TRACE"),
            sound:  env_or_bool("BLINK_POP_SOUND", true),
            mode:   env_or_parse("BLINK_POP_MODE", Mode::Game),
        }
    }

    /// Apply `--compose`, `--trace <path>` and `--mute`.  Anything else is
    /// reported and ignored.
    pub fn apply_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--compose" => self.mode = Mode::Compose,
                "--mute"    => self.sound = false,
                "--trace"   => match args.next() {
                    Some(path) => self.trace = Some(PathBuf::from(path)),
                    None       => tracing::warn!("--trace needs a path"),
                },
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }
        self
    }

    /// Tuning from the configured file, or defaults when none is set.
    pub fn load_tuning(&self) -> Result<Tuning, AppError> {
        match &self.tuning {
            Some(path) => Tuning::load(path),
            None => Ok(Tuning::default()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tuning
// ════════════════════════════════════════════════════════════════════════════

/// Every rule and threshold, each section optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub detector: DetectorConfig,
    pub input:    InputConfig,
    pub game:     GameConfig,
}

impl Tuning {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AppError::Tuning {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Environment helpers
// ════════════════════════════════════════════════════════════════════════════

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Unset and empty both mean "no path".
fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "RUST_LOG",
            "ENABLE_FILE_LOGS",
            "LOG_DIR",
            "BLINK_POP_TUNING",
            "BLINK_POP_TRACE",
            "BLINK_POP_SOUND",
            "BLINK_POP_MODE",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let s = Settings::from_env();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn reads_paths_flags_and_mode() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("BLINK_POP_TRACE", "blinks.jsonl");
        env::set_var("BLINK_POP_TUNING", "  ");
        env::set_var("BLINK_POP_SOUND", "off");
        env::set_var("BLINK_POP_MODE", "Compose");
        env::set_var("ENABLE_FILE_LOGS", "yes");

        let s = Settings::from_env();
        assert_eq!(s.trace, Some(PathBuf::from("blinks.jsonl")));
        assert_eq!(s.tuning, None);
        assert!(!s.sound);
        assert_eq!(s.mode, Mode::Compose);
        assert!(s.log.enable_file_logs);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("BLINK_POP_SOUND", "loud");
        env::set_var("BLINK_POP_MODE", "arcade");

        let s = Settings::from_env();
        assert!(s.sound);
        assert_eq!(s.mode, Mode::Game);
        assert_eq!(env_or_parse("BLINK_POP_MODE", 7_u32), 7);
        assert_eq!(env_or_parse("BLINK_POP_SOUND", Mode::Compose), Mode::Compose);
        clear_keys(managed_keys());
    }

    #[test]
    fn args_override_environment() {
        let s = Settings::default().apply_args(args(&["--mute", "--trace", "t.jsonl", "--compose", "--bogus"]));
        assert!(!s.sound);
        assert_eq!(s.trace, Some(PathBuf::from("t.jsonl")));
        assert_eq!(s.mode, Mode::Compose);
    }

    #[test]
    fn trailing_trace_flag_is_ignored() {
        let s = Settings::default().apply_args(args(&["--trace"]));
        assert_eq!(s.trace, None);
    }

    #[test]
    fn partial_tuning_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"game": {{"lives": 5}}, "input": {{"debounce_ms": 250}}}}"#).unwrap();

        let s = Settings { tuning: Some(file.path().to_path_buf()), ..Settings::default() };
        let t = s.load_tuning().unwrap();
        assert_eq!(t.game.lives, 5);
        assert_eq!(t.game.points_per_pop, 10);
        assert_eq!(t.input.debounce_ms, 250);
        assert_eq!(t.input.auto_submit_ms, 2_000);
        assert_eq!(t.detector, DetectorConfig::default());
    }

    #[test]
    fn tuning_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        match Tuning::load(file.path()) {
            Err(AppError::Tuning { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected tuning error, got {:?}", other),
        }
        match Tuning::load(Path::new("/nonexistent/tuning.json")) {
            Err(AppError::Io { .. }) => {}
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn no_tuning_file_means_defaults() {
        assert_eq!(Settings::default().load_tuning().unwrap(), Tuning::default());
    }
}

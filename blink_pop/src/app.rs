//! Top-level application state machine.
//!
//! `AppState` owns the game engine, the composer, the blink detection
//! session and the sound player.  Every input is an [`AppEvent`] handled
//! one at a time on the main thread; the render loop in [`run`] feeds it
//! keys from the window and ticks from the clock.

use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use blink_detect::trace::{load_trace, TraceCamera};
use blink_detect::{BlinkEvent, DetectionSession, DetectorConfig, SessionStatus, TimedBlink};
use bubble_game::{GameEngine, GameEvent, MatchResult, Phase, SymbolSource};
use morse_code::{Accept, Composer, ComposerEvent, MorseTable, Symbol, SymbolInput};
use tracing::{info, warn};

use crate::error::AppError;
use crate::input::{spawn_input_source, InputEvent, KeyPress, KeyboardSource};
use crate::settings::{Mode, Settings, Tuning};
use crate::sound::{Cue, SoundPlayer};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(InputEvent),
    Blink(BlinkEvent),
    /// Advance timers to the given time: blink polling, auto-submit, game ticks.
    Tick,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    mode:       Mode,
    engine:     GameEngine,

    // ── compose mode ─────────────────────────────────────────────────────
    composer:   Composer,
    compose:    SymbolInput,

    // ── blink detection ──────────────────────────────────────────────────
    session:    Option<DetectionSession>,
    calibrated: bool,

    sound:      SoundPlayer,

    pub status: String,
}

impl AppState {
    pub fn new(mode: Mode, tuning: &Tuning, session: Option<DetectionSession>, sound: SoundPlayer) -> Self {
        let status = match mode {
            Mode::Game    => "press n to start".to_string(),
            Mode::Compose => "blink letters, ENTER .-.- sends the line".to_string(),
        };
        AppState {
            mode,
            engine:     GameEngine::new(tuning.game.clone(), tuning.input.clone()),
            composer:   Composer::new(),
            compose:    SymbolInput::for_table(tuning.input.clone(), MorseTable::standard()),
            session,
            calibrated: false,
            sound,
            status,
        }
    }

    /// Process one event.  Returns `false` when the app should exit.
    pub fn handle(&mut self, event: AppEvent, now_ms: u64) -> bool {
        match event {
            AppEvent::Quit | AppEvent::Key(InputEvent::Quit) => return false,

            AppEvent::Key(InputEvent::Symbol(sym)) => self.symbol(sym, SymbolSource::Keyboard, now_ms),
            AppEvent::Blink(blink) => {
                self.symbol(Symbol::from_blink(blink.is_long), SymbolSource::Blink, now_ms)
            }

            AppEvent::Key(InputEvent::Submit) => self.submit(now_ms),
            AppEvent::Key(InputEvent::Backspace) => match self.mode {
                Mode::Game    => { self.engine.backspace(); }
                Mode::Compose => { self.compose.backspace(); }
            },
            AppEvent::Key(InputEvent::Clear) => match self.mode {
                Mode::Game    => self.engine.clear(),
                Mode::Compose => self.compose.clear(),
            },
            AppEvent::Key(InputEvent::Recalibrate) => self.recalibrate(),
            AppEvent::Key(InputEvent::Next)        => self.next(now_ms),
            AppEvent::Key(InputEvent::Menu)        => self.menu(),

            AppEvent::Tick => self.update(now_ms),
        }
        self.flush_game_events();
        true
    }

    /// Poll the camera, then run auto-submit and any due game ticks.
    ///
    /// Each blink is handled at the frame time that completed it, so a
    /// batch drained after a stall still debounces by real spacing.
    pub fn update(&mut self, now_ms: u64) {
        let blinks = self.session.as_mut().map(|s| s.poll(now_ms)).unwrap_or_default();
        for TimedBlink { at_ms, blink } in blinks {
            self.handle(AppEvent::Blink(blink), at_ms);
        }
        self.check_detection();

        match self.mode {
            Mode::Game => {
                if let Some(result) = self.engine.update(now_ms) {
                    self.report(result);
                }
            }
            Mode::Compose => {
                if let Some(code) = self.compose.poll(now_ms) {
                    self.compose_code(&code);
                }
            }
        }
    }

    /// Release the camera, drop pending deadlines and stop the sound thread.
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.release();
        }
        self.engine.reset();
        self.compose.reset();
        self.sound.shutdown();
    }

    // ── Event handlers ──────────────────────────────────────────────────────

    fn symbol(&mut self, sym: Symbol, source: SymbolSource, now_ms: u64) {
        let accept = match self.mode {
            Mode::Game    => self.engine.on_symbol(sym, source, now_ms),
            Mode::Compose => self.compose.on_symbol(sym, now_ms),
        };
        if accept == Accept::Accepted {
            self.sound.play(match sym {
                Symbol::Dot  => Cue::Dot,
                Symbol::Dash => Cue::Dash,
            });
        }
    }

    fn submit(&mut self, now_ms: u64) {
        match self.mode {
            Mode::Game => {
                let result = self.engine.submit(now_ms);
                self.report(result);
            }
            Mode::Compose => {
                let code = self.compose.take_for_submit();
                if !code.is_empty() {
                    self.compose_code(&code);
                }
            }
        }
    }

    fn next(&mut self, now_ms: u64) {
        if self.mode != Mode::Game {
            return;
        }
        match self.engine.phase() {
            Phase::Idle | Phase::GameOver | Phase::Won => self.engine.start(now_ms),
            Phase::LevelComplete => {
                self.engine.advance_level(now_ms);
            }
            Phase::Playing => {}
        }
    }

    fn menu(&mut self) {
        match self.mode {
            Mode::Game => {
                self.engine.reset();
                self.status = "press n to start".to_string();
            }
            Mode::Compose => {
                self.composer.reset();
                self.compose.reset();
                self.status = "cleared".to_string();
            }
        }
    }

    fn recalibrate(&mut self) {
        match self.session.as_mut() {
            Some(session) if session.status() != SessionStatus::Released => {
                session.recalibrate();
                self.calibrated = false;
                self.status = "calibrating - keep your eyes open".to_string();
            }
            _ => self.status = "no camera - keyboard only".to_string(),
        }
    }

    fn check_detection(&mut self) {
        if let Some(SessionStatus::Unavailable(reason)) = self.session.as_ref().map(|s| s.status()) {
            warn!(%reason, "blink detection lost, keyboard only");
            self.session = None;
            self.calibrated = false;
            self.status = "blink detection unavailable - keyboard only".to_string();
            return;
        }
        if self.calibrated {
            return;
        }
        if let Some(baseline) = self.session.as_ref().and_then(|s| s.baseline()) {
            self.calibrated = true;
            info!(baseline, "blink detection ready");
            self.status = format!("calibrated: baseline {:.2}", baseline);
        }
    }

    // ── Outcomes ────────────────────────────────────────────────────────────

    fn report(&mut self, result: MatchResult) {
        match result {
            MatchResult::Popped { letter, points, .. } => {
                self.status = format!("popped {} +{}", letter, points);
            }
            MatchResult::NoTarget { letter } => {
                self.status = format!("no bubble for {}", letter);
            }
            MatchResult::Invalid { code } => {
                self.status = format!("{} is not a letter", code);
            }
            MatchResult::Empty | MatchResult::Ignored => {}
        }
    }

    fn flush_game_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                GameEvent::Started { level } => {
                    self.status = format!("level {}", level);
                }
                GameEvent::Popped { .. } => self.sound.play(Cue::Pop),
                GameEvent::Missed { .. } => self.sound.play(Cue::Miss),
                GameEvent::Escaped { count } => {
                    self.sound.play(Cue::Miss);
                    self.status = if count == 1 {
                        "a bubble escaped".to_string()
                    } else {
                        format!("{} bubbles escaped", count)
                    };
                }
                GameEvent::LevelComplete { level } => {
                    self.sound.play(Cue::Level);
                    self.status = format!("level {} complete - n for the next one", level);
                }
                GameEvent::Won => {
                    self.sound.play(Cue::Won);
                    self.status = "all levels cleared - n to play again".to_string();
                }
                GameEvent::GameOver => {
                    self.sound.play(Cue::GameOver);
                    self.status = "game over - n to play again".to_string();
                }
                GameEvent::Spawned { .. } => {}
            }
        }
    }

    fn compose_code(&mut self, code: &str) {
        match self.composer.apply(MorseTable::standard(), code) {
            ComposerEvent::Line(line) => {
                self.sound.play(Cue::Level);
                self.status = format!("sent: {}", line);
            }
            ComposerEvent::Sos => {
                self.sound.play(Cue::GameOver);
                self.status = "SOS".to_string();
            }
            ComposerEvent::Select(n) => self.status = format!("suggestion {}", n),
            ComposerEvent::CapsChanged(on) => {
                self.status = format!("caps {}", if on { "on" } else { "off" });
            }
            ComposerEvent::SpeechChanged(on) => {
                self.status = format!("speech {}", if on { "on" } else { "off" });
            }
            ComposerEvent::Unknown(code) => {
                self.sound.play(Cue::Miss);
                self.status = format!("no entry for {}", code);
            }
            ComposerEvent::Typed(_) | ComposerEvent::Edited(_) => {}
        }
    }

    // ── Accessors for the render loop ───────────────────────────────────────

    pub fn mode(&self)     -> Mode                      { self.mode }
    pub fn engine(&self)   -> &GameEngine               { &self.engine }
    pub fn composer(&self) -> &Composer                 { &self.composer }
    pub fn session(&self)  -> Option<&DetectionSession> { self.session.as_ref() }
    pub fn status(&self)   -> &str                      { &self.status }

    /// The code being entered in the current mode.
    pub fn code(&self) -> &str {
        match self.mode {
            Mode::Game    => self.engine.code(),
            Mode::Compose => self.compose.code(),
        }
    }

    /// When the current code submits itself, if it will.
    pub fn submit_deadline(&self) -> Option<u64> {
        match self.mode {
            Mode::Game    => self.engine.submit_deadline(),
            Mode::Compose => self.compose.deadline(),
        }
    }

    pub fn auto_submit_ms(&self) -> u64 {
        self.compose.config().auto_submit_ms
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Detection setup
// ════════════════════════════════════════════════════════════════════════════

/// A session over the recorded trace at `trace`, or `None` without one.
/// No live camera binding is built in.
pub fn open_detection(trace: Option<&Path>, cfg: &DetectorConfig) -> Result<Option<DetectionSession>, AppError> {
    let Some(path) = trace else {
        return Ok(None);
    };
    let records = load_trace(path)?;
    info!(path = %path.display(), frames = records.len(), "replaying landmark trace");
    let camera = TraceCamera::new(records);
    let session = DetectionSession::acquire(&camera, Box::new(camera.landmarks()), cfg)?;
    Ok(Some(session))
}

/// The session to play with and the status line to open on.  Any failure
/// to start detection leaves keyboard-only play and says why.
pub fn detection_or_keyboard(
    opened: Result<Option<DetectionSession>, AppError>,
) -> (Option<DetectionSession>, String) {
    match opened {
        Ok(Some(session)) => (Some(session), "calibrating - keep your eyes open".to_string()),
        Ok(None) => (None, "no camera - keyboard only".to_string()),
        Err(e) => {
            warn!("blink detection unavailable: {}", e);
            (None, format!("{} - keyboard only", e))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run: main event loop
// ════════════════════════════════════════════════════════════════════════════

/// Launch the window and run until it closes or the user quits.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let tuning = settings.load_tuning()?;

    // ── Blink detection, falling back to keyboard only ───────────────────
    let (session, status) = detection_or_keyboard(open_detection(settings.trace.as_deref(), &tuning.detector));

    let sound = if settings.sound { SoundPlayer::spawn() } else { SoundPlayer::muted() };

    // ── Keyboard channel ─────────────────────────────────────────────────
    let (key_tx, key_rx) = mpsc::channel::<KeyPress>();
    let input_rx = spawn_input_source(KeyboardSource { rx: key_rx });

    let mut vis = Visualizer::new(key_tx)?;
    let mut app = AppState::new(settings.mode, &tuning, session, sound);
    app.status = status;

    let clock = Instant::now();
    let now = || clock.elapsed().as_millis() as u64;

    // ── Main loop ────────────────────────────────────────────────────────
    'main: while vis.is_open() {
        if !vis.poll_input() {
            app.handle(AppEvent::Quit, now());
            break;
        }

        loop {
            match input_rx.try_recv() {
                Ok(event) => {
                    if !app.handle(AppEvent::Key(event), now()) {
                        break 'main;
                    }
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => break 'main,
            }
        }

        app.handle(AppEvent::Tick, now());
        vis.render(&app, now());
    }

    app.shutdown();
    info!("session ended");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

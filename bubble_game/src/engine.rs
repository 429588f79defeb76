//! The game state machine.
//!
//! ```text
//!   Idle ──start──▶ Playing ──score ≥ level×50──▶ LevelComplete ──advance_level──▶ Playing
//!                     │                    └──(final level)──▶ Won
//!                     └──lives = 0──▶ GameOver
//! ```
//!
//! Input (symbols, submit, clear, backspace) is only taken while `Playing`.
//! Leaving `Playing` stops the tick loop, cancels the auto-submit deadline
//! and any pending spawn.

use morse_code::{Accept, InputConfig, MorseTable, Symbol, SymbolInput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::target::{Spawner, Target};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Playing,
    /// Level target reached; waiting for [`GameEngine::advance_level`].
    LevelComplete,
    GameOver,
    Won,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Won)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub score:          u32,
    pub lives:          u32,
    pub level:          u32,
    pub bubbles_popped: u32,
    /// Bubbles spawned so far.
    pub total_bubbles:  u32,
    /// `round(popped / max(total, 1) × 100)`.
    pub accuracy:       u32,
}

impl GameStats {
    fn fresh(cfg: &GameConfig) -> Self {
        GameStats {
            score:          0,
            lives:          cfg.lives,
            level:          1,
            bubbles_popped: 0,
            total_bubbles:  0,
            accuracy:       100,
        }
    }

    fn recompute_accuracy(&mut self) {
        let total = self.total_bubbles.max(1) as f64;
        self.accuracy = (self.bubbles_popped as f64 / total * 100.0).round() as u32;
    }
}

/// Where a symbol came from.  Both paths are treated identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SymbolSource {
    Blink,
    Keyboard,
}

/// Outcome of resolving one code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    Popped { letter: char, target_id: u64, points: u32 },
    /// A valid letter, but no bubble carries it.
    NoTarget { letter: char },
    /// Not a letter in the table.
    Invalid { code: String },
    /// Nothing was buffered.
    Empty,
    /// Not playing.
    Ignored,
}

/// Notifications for the presentation layer (sound, animations).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GameEvent {
    Started { level: u32 },
    Spawned { id: u64, letter: char },
    Popped { id: u64, letter: char },
    Missed { code: String },
    /// Bubbles fell off the bottom this tick.
    Escaped { count: usize },
    LevelComplete { level: u32 },
    Won,
    GameOver,
}

// ════════════════════════════════════════════════════════════════════════════
// GameEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct GameEngine<R = StdRng> {
    cfg:       GameConfig,
    table:     MorseTable,
    rng:       R,
    phase:     Phase,
    stats:     GameStats,
    targets:   Vec<Target>,
    input:     SymbolInput,
    spawner:   Spawner,
    /// Earliest time the empty field may be refilled.
    spawn_at:  Option<u64>,
    next_tick: Option<u64>,
    events:    Vec<GameEvent>,
}

impl GameEngine<StdRng> {
    pub fn new(cfg: GameConfig, input: InputConfig) -> Self {
        Self::with_rng(cfg, input, StdRng::from_entropy())
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(cfg: GameConfig, input: InputConfig, rng: R) -> Self {
        let table = MorseTable::standard().clone();
        GameEngine {
            stats:     GameStats::fresh(&cfg),
            input:     SymbolInput::for_table(input, &table),
            cfg,
            table,
            rng,
            phase:     Phase::Idle,
            targets:   Vec::new(),
            spawner:   Spawner::new(),
            spawn_at:  None,
            next_tick: None,
            events:    Vec::new(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// New game at level 1, from any phase.
    pub fn start(&mut self, now_ms: u64) {
        self.clear_field();
        self.spawner.reset(true);
        self.input.reset();
        self.stats = GameStats::fresh(&self.cfg);
        self.begin_level(now_ms);
    }

    /// Next level after `LevelComplete`.  Ignored in any other phase.
    pub fn advance_level(&mut self, now_ms: u64) -> bool {
        if self.phase != Phase::LevelComplete {
            return false;
        }
        self.clear_field();
        self.spawner.reset(false);
        self.stats.level += 1;
        self.stats.score = 0;
        self.stats.lives = self.cfg.lives;
        self.begin_level(now_ms);
        true
    }

    /// Back to `Idle` with fresh stats.
    pub fn reset(&mut self) {
        self.clear_field();
        self.spawner.reset(true);
        self.input.reset();
        self.stats = GameStats::fresh(&self.cfg);
        self.phase = Phase::Idle;
        self.spawn_at = None;
        self.next_tick = None;
        debug!("game reset");
    }

    fn begin_level(&mut self, now_ms: u64) {
        self.phase = Phase::Playing;
        self.spawn_at = Some(now_ms + self.cfg.first_spawn_ms);
        self.next_tick = Some(now_ms + self.cfg.tick_ms);
        self.events.push(GameEvent::Started { level: self.stats.level });
        info!(level = self.stats.level, lives = self.stats.lives, "level started");
    }

    fn clear_field(&mut self) {
        self.targets.clear();
        self.input.clear();
    }

    /// Leave `Playing`: stop ticking, drop deadlines and pending spawns.
    fn halt(&mut self, phase: Phase) {
        self.phase = phase;
        self.next_tick = None;
        self.spawn_at = None;
        self.input.clear();
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn on_symbol(&mut self, sym: Symbol, source: SymbolSource, now_ms: u64) -> Accept {
        if self.phase != Phase::Playing {
            return Accept::Ignored;
        }
        let accept = self.input.on_symbol(sym, now_ms);
        debug!(symbol = %sym, ?source, ?accept, code = self.input.code(), "symbol");
        accept
    }

    /// Resolve the buffered code now.
    pub fn submit(&mut self, now_ms: u64) -> MatchResult {
        if self.phase != Phase::Playing {
            return MatchResult::Ignored;
        }
        let code = self.input.take_for_submit();
        self.resolve(&code, now_ms)
    }

    /// Resolve `code` directly, discarding whatever was buffered.
    pub fn submit_code(&mut self, code: &str, now_ms: u64) -> MatchResult {
        if self.phase != Phase::Playing {
            return MatchResult::Ignored;
        }
        self.input.clear();
        self.resolve(code, now_ms)
    }

    pub fn clear(&mut self) {
        if self.phase == Phase::Playing {
            self.input.clear();
        }
    }

    pub fn backspace(&mut self) -> Option<Symbol> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.input.backspace()
    }

    fn resolve(&mut self, code: &str, now_ms: u64) -> MatchResult {
        if code.is_empty() {
            return MatchResult::Empty;
        }
        let Some(letter) = self.table.letter_for(code) else {
            info!(code, "invalid code");
            self.miss(code);
            return MatchResult::Invalid { code: code.to_string() };
        };
        let Some(idx) = self.targets.iter().position(|t| t.letter == letter) else {
            info!(code, %letter, "no bubble for letter");
            self.miss(code);
            return MatchResult::NoTarget { letter };
        };

        let target = self.targets.remove(idx);
        let points = self.cfg.points_per_pop;
        self.stats.score += points;
        self.stats.bubbles_popped += 1;
        self.stats.recompute_accuracy();
        self.spawn_at = Some(now_ms + self.cfg.respawn_ms);
        self.events.push(GameEvent::Popped { id: target.id, letter });
        info!(%letter, score = self.stats.score, "popped");

        self.check_level();
        MatchResult::Popped { letter, target_id: target.id, points }
    }

    fn miss(&mut self, code: &str) {
        self.events.push(GameEvent::Missed { code: code.to_string() });
        self.lose_life();
    }

    fn lose_life(&mut self) {
        self.stats.lives = self.stats.lives.saturating_sub(1);
        self.stats.recompute_accuracy();
        if self.stats.lives == 0 {
            self.halt(Phase::GameOver);
            self.events.push(GameEvent::GameOver);
            info!(score = self.stats.score, level = self.stats.level, "game over");
        }
    }

    fn check_level(&mut self) {
        let level = self.stats.level;
        if self.stats.score == 0 || self.stats.score < self.cfg.level_threshold(level) {
            return;
        }
        if level >= self.cfg.final_level {
            self.halt(Phase::Won);
            self.events.push(GameEvent::Won);
            info!(level, "game won");
        } else {
            self.halt(Phase::LevelComplete);
            self.events.push(GameEvent::LevelComplete { level });
            info!(level, "level complete");
        }
    }

    // ── Time ─────────────────────────────────────────────────────────────────

    /// Auto-submit once the idle deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<MatchResult> {
        if self.phase != Phase::Playing {
            return None;
        }
        let code = self.input.poll(now_ms)?;
        Some(self.resolve(&code, now_ms))
    }

    /// Auto-submit, then run every tick that has come due.
    pub fn update(&mut self, now_ms: u64) -> Option<MatchResult> {
        let result = self.poll(now_ms);
        while self.phase == Phase::Playing {
            match self.next_tick {
                Some(t) if now_ms >= t => {
                    self.next_tick = Some(t + self.cfg.tick_ms);
                    self.tick(t);
                }
                _ => break,
            }
        }
        result
    }

    /// One step of the fall loop.
    pub fn tick(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }

        for t in &mut self.targets {
            t.step();
        }
        let before = self.targets.len();
        let bottom = self.cfg.bottom_y;
        self.targets.retain(|t| !t.is_lost(bottom));
        let escaped = before - self.targets.len();
        if escaped > 0 {
            self.events.push(GameEvent::Escaped { count: escaped });
            info!(escaped, lives = self.stats.lives.saturating_sub(1), "bubbles reached the bottom");
            // One life per tick however many fell.
            self.lose_life();
            if self.phase != Phase::Playing {
                return;
            }
        }

        if self.targets.is_empty() {
            if self.spawn_at.map_or(true, |at| now_ms >= at) {
                self.spawn_at = None;
                self.spawn();
            }
        } else if (self.targets.len() as u32) < self.stats.level
            && self.rng.gen_bool(self.cfg.extra_spawn_chance.clamp(0.0, 1.0))
        {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let level = self.stats.level;
        if let Some(t) = self.spawner.spawn(&mut self.rng, &self.table, level, &self.cfg) {
            self.push_target(t);
        }
    }

    fn push_target(&mut self, t: Target) {
        debug!(id = t.id, letter = %t.letter, speed = t.fall_speed, "spawned");
        self.events.push(GameEvent::Spawned { id: t.id, letter: t.letter });
        self.stats.total_bubbles += 1;
        self.targets.push(t);
    }

    /// Place a bubble for `letter` right away, bypassing the spawn rules.
    /// Returns its id, or `None` if not playing or the letter has no code.
    pub fn insert_target(&mut self, letter: char) -> Option<u64> {
        if self.phase != Phase::Playing {
            return None;
        }
        let level = self.stats.level;
        let t = self.spawner.spawn_letter(&mut self.rng, &self.table, letter, level, &self.cfg)?;
        let id = t.id;
        self.push_target(t);
        Some(id)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The code typed so far.
    pub fn code(&self) -> &str {
        self.input.code()
    }

    pub fn submit_deadline(&self) -> Option<u64> {
        self.input.deadline()
    }

    pub fn next_tick(&self) -> Option<u64> {
        self.next_tick
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn table(&self) -> &MorseTable {
        &self.table
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Falling bubbles and how new ones are chosen.

use std::collections::HashSet;

use morse_code::MorseTable;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;

/// Bubble colours, `0x00RRGGBB`.  Spawning cycles through all of them
/// before repeating.
pub const PALETTE: [u32; 10] = [
    0x3B82F6, // blue
    0x22C55E, // green
    0xEF4444, // red
    0xEAB308, // yellow
    0xA855F7, // purple
    0xEC4899, // pink
    0x6366F1, // indigo
    0x14B8A6, // teal
    0xF97316, // orange
    0x06B6D4, // cyan
];

/// One bubble on the play field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Target {
    pub id:         u64,
    pub letter:     char,
    pub code:       String,
    /// Horizontal centre, percent of field width.
    pub x:          f32,
    /// Vertical centre, percent of field height.  Starts above the field.
    pub y:          f32,
    /// Percent per tick.
    pub fall_speed: f32,
    /// Diameter in pixels at the reference field size.
    pub size:       f32,
    pub color:      u32,
}

impl Target {
    pub fn step(&mut self) {
        self.y += self.fall_speed;
    }

    pub fn is_lost(&self, bottom_y: f32) -> bool {
        self.y > bottom_y
    }
}

/// Picks letters and colours not used since the last reset.
#[derive(Clone, Debug, Default)]
pub struct Spawner {
    used_letters: HashSet<char>,
    used_colors:  HashSet<usize>,
    next_id:      u64,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bubble with a fresh letter.  `None` only when the table has no
    /// letters at all.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng:   &mut R,
        table: &MorseTable,
        level: u32,
        cfg:   &GameConfig,
    ) -> Option<Target> {
        let letters: Vec<char> = table.letters().collect();
        let fresh: Vec<char> = letters
            .iter()
            .copied()
            .filter(|c| !self.used_letters.contains(c))
            .collect();
        let letter = if fresh.is_empty() {
            tracing::debug!("all letters used, recycling");
            self.used_letters.clear();
            self.used_colors.clear();
            *letters.choose(rng)?
        } else {
            *fresh.choose(rng)?
        };
        self.spawn_letter(rng, table, letter, level, cfg)
    }

    /// A bubble for `letter`, with a fresh colour and random placement.
    pub fn spawn_letter<R: Rng + ?Sized>(
        &mut self,
        rng:    &mut R,
        table:  &MorseTable,
        letter: char,
        level:  u32,
        cfg:    &GameConfig,
    ) -> Option<Target> {
        let letter = letter.to_ascii_uppercase();
        let code = table.encode(letter)?.to_string();

        let fresh: Vec<usize> = (0..PALETTE.len()).filter(|i| !self.used_colors.contains(i)).collect();
        let color_idx = match fresh.choose(rng) {
            Some(&i) => i,
            None => {
                self.used_colors.clear();
                rng.gen_range(0..PALETTE.len())
            }
        };

        self.used_letters.insert(letter);
        self.used_colors.insert(color_idx);
        let id = self.next_id;
        self.next_id += 1;

        Some(Target {
            id,
            letter,
            code,
            x:          cfg.x_min + rng.gen::<f32>() * cfg.x_span,
            y:          cfg.spawn_y,
            fall_speed: cfg.base_speed + rng.gen::<f32>() * cfg.speed_jitter + level as f32 * cfg.level_speed,
            size:       cfg.size_min + rng.gen::<f32>() * cfg.size_span,
            color:      PALETTE[color_idx],
        })
    }

    /// Forget used letters and colours.  Ids keep counting unless `ids`.
    pub fn reset(&mut self, ids: bool) {
        self.used_letters.clear();
        self.used_colors.clear();
        if ids {
            self.next_id = 0;
        }
    }

    pub fn used_letters(&self) -> usize {
        self.used_letters.len()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

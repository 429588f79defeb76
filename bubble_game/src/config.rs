//! Game tuning.

use serde::{Deserialize, Serialize};

/// Every rule constant of the game.  Positions are percentages of the play
/// field (0 = top / left, 100 = bottom / right).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lives:              u32,
    pub points_per_pop:     u32,
    /// Level `n` completes at `n × points_per_level`.
    pub points_per_level:   u32,
    /// Completing this level wins the game.
    pub final_level:        u32,

    pub tick_ms:            u64,
    /// Delay before the first bubble of a level (ms).
    pub first_spawn_ms:     u64,
    /// Delay before a replacement bubble after a pop (ms).
    pub respawn_ms:         u64,
    /// Per-tick chance of an extra bubble while fewer than `level` are live.
    pub extra_spawn_chance: f64,

    pub spawn_y:            f32,
    /// Bubbles with `y` past this are lost.
    pub bottom_y:           f32,
    pub x_min:              f32,
    pub x_span:             f32,
    pub size_min:           f32,
    pub size_span:          f32,

    /// Fall speed = `base_speed + rand(0..speed_jitter) + level × level_speed`
    /// (percent per tick).
    pub base_speed:         f32,
    pub speed_jitter:       f32,
    pub level_speed:        f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            lives:              3,
            points_per_pop:     10,
            points_per_level:   50,
            final_level:        2,
            tick_ms:            150,
            first_spawn_ms:     1_000,
            respawn_ms:         500,
            extra_spawn_chance: 0.02,
            spawn_y:            -15.0,
            bottom_y:           100.0,
            x_min:              10.0,
            x_span:             80.0,
            size_min:           40.0,
            size_span:          30.0,
            base_speed:         0.3,
            speed_jitter:       0.5,
            level_speed:        0.4,
        }
    }
}

impl GameConfig {
    /// Score that completes `level`.
    pub fn level_threshold(&self, level: u32) -> u32 {
        level * self.points_per_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.level_threshold(1), 50);
        assert_eq!(cfg.level_threshold(2), 100);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: GameConfig = serde_json::from_str(r#"{ "lives": 5, "final_level": 3 }"#).unwrap();
        assert_eq!(cfg.lives, 5);
        assert_eq!(cfg.final_level, 3);
        assert_eq!(cfg.tick_ms, 150);
    }
}

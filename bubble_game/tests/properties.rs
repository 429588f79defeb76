use proptest::prelude::*;

use bubble_game::{GameConfig, GameEngine, MatchResult, Phase};
use morse_code::InputConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[.-]{1,6}",
        "[a-z]{1,3}",
    ]
}

proptest! {
    #[test]
    fn pt_stats_stay_consistent(
        seed in any::<u64>(),
        steps in proptest::collection::vec((0_u64..400, code()), 1..60),
    ) {
        let mut g = GameEngine::with_rng(GameConfig::default(), InputConfig::default(), StdRng::seed_from_u64(seed));
        g.start(0);
        let mut now = 0;
        for (gap, code) in steps {
            now += gap;
            g.update(now);
            let before = g.stats();
            let result = g.submit_code(&code, now);
            let after = g.stats();

            prop_assert!(after.lives <= before.lives);
            prop_assert!(after.bubbles_popped <= after.total_bubbles);
            prop_assert!(after.accuracy <= 100);
            match result {
                MatchResult::Popped { points, .. } => prop_assert_eq!(after.score, before.score + points),
                MatchResult::NoTarget { .. } | MatchResult::Invalid { .. } => {
                    prop_assert_eq!(after.lives + 1, before.lives)
                }
                MatchResult::Empty => prop_assert_eq!(after, before),
                MatchResult::Ignored => prop_assert!(g.phase() != Phase::Playing),
            }
            if after.lives == 0 {
                prop_assert_eq!(g.phase(), Phase::GameOver);
            }
        }
    }

    #[test]
    fn pt_no_spawns_outside_playing(seed in any::<u64>(), later in 1_u64..100_000) {
        let mut g = GameEngine::with_rng(GameConfig::default(), InputConfig::default(), StdRng::seed_from_u64(seed));
        g.start(0);
        for _ in 0..3 {
            g.submit_code("zzz", 0);
        }
        prop_assert_eq!(g.phase(), Phase::GameOver);
        let spawned = g.stats().total_bubbles;
        g.update(later);
        prop_assert_eq!(g.stats().total_bubbles, spawned);
        prop_assert!(g.targets().is_empty());
    }
}

//! Whole-game scenarios driven through the public API.

use blink_detect::trace::{replay, TraceRecord};
use blink_detect::{DetectionSession, DetectorConfig};
use bubble_game::{GameConfig, GameEngine, GameEvent, MatchResult, Phase, SymbolSource};
use morse_code::{Accept, InputConfig, Symbol};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn game() -> GameEngine<StdRng> {
    let mut g = GameEngine::with_rng(GameConfig::default(), InputConfig::default(), StdRng::seed_from_u64(99));
    g.start(0);
    g
}

fn type_code(g: &mut GameEngine<StdRng>, code: &str, start: u64) -> u64 {
    let mut now = start;
    for c in code.chars() {
        let sym = Symbol::from_char(c).unwrap();
        assert_eq!(g.on_symbol(sym, SymbolSource::Keyboard, now), Accept::Accepted);
        now += 350;
    }
    now
}

#[test]
fn matching_code_pops_target() {
    let mut g = game();
    let id = g.insert_target('A').unwrap();
    type_code(&mut g, ".-", 100);
    let before = g.stats();

    let result = g.submit(900);
    assert_eq!(result, MatchResult::Popped { letter: 'A', target_id: id, points: 10 });
    assert!(g.targets().iter().all(|t| t.id != id));
    assert_eq!(g.stats().score, before.score + 10);
    assert_eq!(g.stats().bubbles_popped, before.bubbles_popped + 1);
    assert_eq!(g.code(), "");
}

#[test]
fn letter_without_target_costs_a_life() {
    let mut g = game();
    g.insert_target('B');
    type_code(&mut g, ".-", 100);

    assert_eq!(g.submit(900), MatchResult::NoTarget { letter: 'A' });
    assert_eq!(g.stats().lives, 2);
    assert_eq!(g.stats().score, 0);
    assert_eq!(g.code(), "");
    assert_eq!(g.targets().len(), 1);
}

#[test]
fn unknown_code_costs_a_life() {
    let mut g = game();
    assert_eq!(g.submit_code("zzz", 100), MatchResult::Invalid { code: "zzz".into() });
    assert_eq!(g.stats().lives, 2);
    assert_eq!(g.code(), "");
}

#[test]
fn game_over_stops_the_tick_loop() {
    let mut g = game();
    g.update(1_200);
    assert_eq!(g.targets().len(), 1);

    for _ in 0..3 {
        g.submit_code("........", 1_300);
    }
    assert_eq!(g.phase(), Phase::GameOver);
    assert_eq!(g.next_tick(), None);
    assert_eq!(g.submit_deadline(), None);

    let frozen: Vec<f32> = g.targets().iter().map(|t| t.y).collect();
    let spawned = g.stats().total_bubbles;
    g.update(60_000);
    g.tick(60_000);
    let after: Vec<f32> = g.targets().iter().map(|t| t.y).collect();
    assert_eq!(frozen, after);
    assert_eq!(g.stats().total_bubbles, spawned);
}

#[test]
fn game_over_from_falling_bubbles() {
    let mut g = game();
    // Nobody answers: every bubble eventually falls out.
    let mut now = 0;
    while g.phase() == Phase::Playing && now < 600_000 {
        now += 50;
        g.update(now);
    }
    assert_eq!(g.phase(), Phase::GameOver);
    assert_eq!(g.stats().lives, 0);
    let events = g.drain_events();
    assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::Escaped { .. })).count(), 3);
    assert_eq!(events.last(), Some(&GameEvent::GameOver));
}

#[test]
fn level_transition_waits_for_advance() {
    let mut g = game();
    g.submit_code("........", 0); // lose a life first
    for c in ['K', 'L', 'M', 'N', 'O'] {
        g.insert_target(c);
    }
    for code in ["-.-", ".-..", "--", "-.", "---"] {
        assert!(matches!(g.submit_code(code, 500), MatchResult::Popped { .. }));
    }
    assert_eq!(g.phase(), Phase::LevelComplete);
    assert_eq!(g.stats().level, 1);

    assert!(g.advance_level(1_000));
    let s = g.stats();
    assert_eq!((s.level, s.score, s.lives), (2, 0, 3));
    assert_eq!(g.phase(), Phase::Playing);

    // Level 2 bubbles fall faster: 0.3 + [0, 0.5) + 0.8
    g.update(2_100);
    assert!(!g.targets().is_empty());
    assert!(g.targets().iter().all(|t| t.fall_speed >= 1.1));
}

#[test]
fn backspace_and_clear_cancel_auto_submit() {
    let mut g = game();
    g.insert_target('E');
    type_code(&mut g, ".-", 100);
    assert_eq!(g.backspace(), Some(Symbol::Dash));
    assert_eq!(g.submit_deadline(), None);
    assert_eq!(g.update(10_000), None);
    assert_eq!(g.code(), ".");

    g.clear();
    assert_eq!(g.code(), "");
}

#[test]
fn recorded_blinks_pop_a_bubble() {
    // Calibrate on open eyes, then blink "-." (N) and go idle.
    let mut records: Vec<TraceRecord> = (0..30).map(|i| TraceRecord::with_ear(i * 66, 0.30)).collect();
    records.push(TraceRecord::with_ear(3_000, 0.05));
    records.push(TraceRecord::with_ear(3_600, 0.30)); // 600 ms → dash
    records.push(TraceRecord::with_ear(4_200, 0.05));
    records.push(TraceRecord::with_ear(4_350, 0.30)); // 150 ms → dot
    records.push(TraceRecord::no_face(8_000));

    let cfg = DetectorConfig::default();
    let (source, provider) = replay(records, &cfg);
    let mut session = DetectionSession::open(Box::new(source), Box::new(provider), &cfg);

    let mut g = game();
    let id = g.insert_target('N').unwrap();

    let mut popped = None;
    for now in (0..=8_000).step_by(50) {
        for event in session.poll(now) {
            g.on_symbol(Symbol::from_blink(event.blink.is_long), SymbolSource::Blink, event.at_ms);
        }
        if let Some(result) = g.update(now) {
            popped = Some(result);
        }
    }
    assert_eq!(popped, Some(MatchResult::Popped { letter: 'N', target_id: id, points: 10 }));
}

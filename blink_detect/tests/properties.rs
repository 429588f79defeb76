use proptest::prelude::*;

use blink_detect::calibrate::robust_baseline;
use blink_detect::{compute_ear, BlinkClassifier, DetectorConfig, EyeLandmarks, Point2};

fn point() -> impl Strategy<Value = Point2> {
    (-500.0_f32..500.0, -500.0_f32..500.0).prop_map(|(x, y)| Point2::new(x, y))
}

proptest! {
    #[test]
    fn pt_ear_is_finite_and_non_negative(pts in proptest::array::uniform6(point())) {
        let ear = compute_ear(&EyeLandmarks(pts));
        prop_assert!(ear.is_finite());
        prop_assert!(ear >= 0.0);
    }

    #[test]
    fn pt_ear_is_translation_invariant(
        ear in 0.0_f32..0.6,
        dx in -200.0_f32..200.0,
        dy in -200.0_f32..200.0,
    ) {
        let eye = EyeLandmarks::with_ear(ear, 30.0);
        let moved = eye.offset(dx, dy);
        prop_assert!((compute_ear(&eye) - compute_ear(&moved)).abs() < 1e-3);
    }

    #[test]
    fn pt_baseline_within_sample_range(samples in proptest::collection::vec(0.05_f32..0.5, 1..80)) {
        let b = robust_baseline(&samples, 5, 0.3);
        let lo = samples.iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = samples.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(b >= lo - 1e-6 && b <= hi + 1e-6);
    }

    #[test]
    fn pt_duration_decides_dot_or_dash(duration in 1_u64..2_000) {
        let mut c = BlinkClassifier::new(&DetectorConfig::default());
        prop_assert!(c.update(0.02, 0.3, 10_000).is_none());
        let event = c.update(0.3, 0.3, 10_000 + duration).unwrap();
        prop_assert_eq!(event.duration_ms, duration);
        prop_assert_eq!(event.is_long, duration >= 400);
    }

    #[test]
    fn pt_one_event_per_closure(closures in proptest::collection::vec((50_u64..900, 50_u64..900), 1..20)) {
        let mut c = BlinkClassifier::new(&DetectorConfig::default());
        let mut now = 0;
        let mut events = 0;
        for (open_for, closed_for) in &closures {
            now += open_for;
            events += c.update(0.30, 0.30, now).into_iter().count();
            now += closed_for;
            events += c.update(0.05, 0.30, now).into_iter().count();
        }
        now += 100;
        events += c.update(0.30, 0.30, now).into_iter().count();
        prop_assert_eq!(events, closures.len());
    }
}

//! Replay a recorded landmark trace and print what the detector sees.
//!
//! ```text
//! ear_replay recording.jsonl [tuning.json]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use blink_detect::{trace, DetectionSession, DetectorConfig, SessionStatus};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: ear_replay <trace.jsonl> [detector.json]");
        return ExitCode::from(2);
    };

    let cfg = match args.next() {
        Some(p) => match std::fs::read_to_string(&p).map(|s| serde_json::from_str::<DetectorConfig>(&s)) {
            Ok(Ok(cfg)) => cfg,
            Ok(Err(e)) => { eprintln!("  ⚠  {}: {}", p, e); return ExitCode::FAILURE; }
            Err(e)     => { eprintln!("  ⚠  {}: {}", p, e); return ExitCode::FAILURE; }
        },
        None => DetectorConfig::default(),
    };

    let records = match trace::load_trace(&path) {
        Ok(r)  => r,
        Err(e) => { eprintln!("  ⚠  {}: {}", path.display(), e); return ExitCode::FAILURE; }
    };
    let times: Vec<u64> = records.iter().map(|r| r.t).collect();
    let t0 = times.first().copied().unwrap_or(0);

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║                 EAR Trace Replay                     ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!("  {} frames from {}", records.len(), path.display());
    println!();

    let (source, provider) = trace::replay(records, &cfg);
    let mut session = DetectionSession::open(Box::new(source), Box::new(provider), &cfg);

    let mut calibrated = false;
    let mut morse = String::new();
    for t in times {
        let now = t.saturating_sub(t0);
        for event in session.poll(now) {
            let sym = if event.blink.is_long { '-' } else { '.' };
            morse.push(sym);
            println!("  {:>7} ms  {}  ({} ms closed)", event.at_ms, sym, event.blink.duration_ms);
        }
        if let SessionStatus::Unavailable(reason) = session.status() {
            eprintln!("  ⚠  landmark provider unavailable: {}", reason);
            return ExitCode::FAILURE;
        }
        if !calibrated {
            if let SessionStatus::Detecting { baseline } = session.status() {
                calibrated = true;
                println!("  {:>7} ms  baseline EAR = {:.3}", now, baseline);
            }
        }
    }

    println!();
    println!("  blinks : {}", session.blink_count());
    println!("  morse  : {}", if morse.is_empty() { "(none)" } else { morse.as_str() });
    println!();
    ExitCode::SUCCESS
}

//! Interactive entry point.

use blink_pop::app::run;
use blink_pop::logging::init_tracing;
use blink_pop::{Mode, Settings};

fn main() {
    dotenvy::dotenv().ok();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           Blink Pop: Hands-free Morse Bubble Game            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let settings = Settings::from_env();
    if let Err(e) = init_tracing(&settings.log) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    let settings = settings.apply_args(std::env::args().skip(1));

    match settings.mode {
        Mode::Game    => println!("  Mode: game"),
        Mode::Compose => println!("  Mode: compose"),
    }
    match &settings.trace {
        Some(path) => println!("  Blinks: replaying {}", path.display()),
        None       => println!("  Blinks: keyboard only  (use --trace <file> to replay a recording)"),
    }
    println!("  Sound: {}", if settings.sound { "on" } else { "off" });
    println!();
    println!("  Opening window…");
    println!();

    if let Err(e) = run(settings) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

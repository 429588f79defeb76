//! Interactive menu for exploring the Morse table and practising entry.

use morse_code::{Composer, ComposerEvent, MorseTable, Symbol};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              Morse Table Explorer                    ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let table = MorseTable::standard();

    loop {
        print_menu();
        let raw = read_line("Command: ");
        if raw.is_empty() {
            break; // EOF
        }
        let choice = raw.trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => print_table(table),
            "2" => {
                let text = read_line("  Text to encode: ");
                println!("  {}", table.encode_text(&text));
            }
            "3" => {
                let morse = read_line("  Morse (letters split by spaces, words by /): ");
                println!("  {}", table.decode_text(&morse));
            }
            "4" => compose(table),
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

/// Each input line is one code typed with `.` and `-`.
fn compose(table: &MorseTable) {
    println!("  One code per line.  Empty line returns to the menu.");
    let mut composer = Composer::new();
    loop {
        let code = read_line("  > ");
        let code = code.trim();
        if code.is_empty() {
            break;
        }
        if code.chars().any(|c| Symbol::from_char(c).is_none()) {
            println!("  ⚠  Use only '.' and '-'.");
            continue;
        }
        match composer.apply(table, code) {
            ComposerEvent::Line(line)        => println!("  ⏎  \"{}\"", line),
            ComposerEvent::Sos               => println!("  🆘 SOS"),
            ComposerEvent::Select(n)         => println!("  ✓  suggestion {}", n),
            ComposerEvent::CapsChanged(on)   => println!("  caps {}", if on { "on" } else { "off" }),
            ComposerEvent::SpeechChanged(on) => println!("  speech {}", if on { "on" } else { "off" }),
            ComposerEvent::Unknown(code)     => println!("  ⚠  no entry for {}", code),
            ComposerEvent::Typed(_) | ComposerEvent::Edited(_) => {}
        }
        println!("  │ {}▏", composer.text());
    }
}

fn print_table(table: &MorseTable) {
    let entries: Vec<(char, &str)> = table.chars_with_codes().collect();
    for row in entries.chunks(4) {
        print!("  ");
        for (c, code) in row {
            print!("{}  {:<8}", c, code);
        }
        println!();
    }
}

fn print_menu() {
    println!("  ┌──────────────────────────────────────────────┐");
    println!("  │  1. Show table        3. Decode Morse        │");
    println!("  │  2. Encode text       4. Compose by code     │");
    println!("  │                       q. Quit                │");
    println!("  └──────────────────────────────────────────────┘");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    let _ = io::stdin().read_line(&mut s);
    s
}

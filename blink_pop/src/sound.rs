//! Audio cues on a MIDI playback thread.
//!
//! Each [`Cue`] is a short phrase of notes.  The app sends cues over a
//! channel and never waits for them; with no MIDI port available, or when
//! muted, cues are dropped silently.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// Cue
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Dot,
    Dash,
    Pop,
    Miss,
    Level,
    GameOver,
    Won,
}

impl Cue {
    /// `(MIDI note, milliseconds)` pairs, played in order.
    pub fn notes(self) -> &'static [(u8, u64)] {
        match self {
            Cue::Dot      => &[(84, 60)],
            Cue::Dash     => &[(84, 180)],
            Cue::Pop      => &[(76, 50), (83, 70)],
            Cue::Miss     => &[(45, 220)],
            Cue::Level    => &[(60, 90), (64, 90), (67, 90), (72, 200)],
            Cue::GameOver => &[(67, 200), (63, 200), (60, 400)],
            Cue::Won      => &[(60, 90), (64, 90), (67, 90), (72, 90), (76, 90), (79, 300)],
        }
    }

    /// GM program the cue is voiced with.
    fn program(self) -> u8 {
        match self {
            Cue::Dot | Cue::Dash => 80,  // square lead
            Cue::Pop             => 13,  // xylophone
            _                    => 11,  // vibraphone
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut: midir or null output
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program & 0x7F]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note & 0x7F, 0]);
    }
}

struct NullOut;

impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)  {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8)        {}
}

/// First available output port, preferring a software synth.  Falls back to
/// a null output.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("blink_pop") {
        Ok(m) => m,
        Err(e) => {
            warn!("MIDI init failed, cues disabled: {}", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    let synth = ports.iter().position(|p| {
        midi_out.port_name(p).map_or(false, |n| {
            let n = n.to_lowercase();
            n.contains("fluid") || n.contains("timidity") || n.contains("microsoft") || n.contains("synth")
        })
    });
    let index = synth.or_else(|| (!ports.is_empty()).then_some(0));
    let Some(port) = index.and_then(|i| ports.get(i)) else {
        warn!("no MIDI output ports, cues disabled");
        return Box::new(NullOut);
    };

    let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());
    match midi_out.connect(port, "blink-pop-cues") {
        Ok(conn) => {
            info!(port = %name, "MIDI cues enabled");
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!(port = %name, "MIDI connect failed, cues disabled: {}", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SoundPlayer
// ════════════════════════════════════════════════════════════════════════════

enum SoundCommand {
    Play(Cue),
    Quit,
}

const CHANNEL:  u8 = 0;
const VELOCITY: u8 = 96;

/// Handle to the cue thread.  Dropping it stops the thread.
pub struct SoundPlayer {
    cmd_tx: Option<Sender<SoundCommand>>,
    thread: Option<JoinHandle<()>>,
}

impl SoundPlayer {
    /// Open a MIDI port on a new thread.
    pub fn spawn() -> Self {
        Self::spawn_with(open_midi_output)
    }

    /// Play through the output `open` returns.  `open` runs on the cue
    /// thread, so slow port enumeration never stalls the caller.
    pub fn spawn_with<F>(open: F) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let thread = thread::spawn(move || player_thread(open(), cmd_rx));
        SoundPlayer { cmd_tx: Some(cmd_tx), thread: Some(thread) }
    }

    /// A player that drops every cue.
    pub fn muted() -> Self {
        SoundPlayer { cmd_tx: None, thread: None }
    }

    pub fn is_muted(&self) -> bool {
        self.cmd_tx.is_none()
    }

    pub fn play(&self, cue: Cue) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(SoundCommand::Play(cue));
        }
    }

    /// Finish queued cues, then stop the thread.  Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(SoundCommand::Quit);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("sound thread panicked");
            }
        }
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn player_thread(mut midi: Box<dyn MidiOut>, cmd_rx: Receiver<SoundCommand>) {
    for cmd in cmd_rx {
        match cmd {
            SoundCommand::Play(cue) => {
                debug!(?cue, "cue");
                midi.program_change(CHANNEL, cue.program());
                for &(note, ms) in cue.notes() {
                    midi.note_on(CHANNEL, note, VELOCITY);
                    thread::sleep(Duration::from_millis(ms));
                    midi.note_off(CHANNEL, note);
                }
            }
            SoundCommand::Quit => return,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    enum Msg {
        Program(u8),
        On(u8),
        Off(u8),
    }

    struct Recorder(Arc<Mutex<Vec<Msg>>>);

    impl MidiOut for Recorder {
        fn program_change(&mut self, _ch: u8, p: u8) { self.0.lock().unwrap().push(Msg::Program(p)); }
        fn note_on(&mut self, _ch: u8, n: u8, _v: u8) { self.0.lock().unwrap().push(Msg::On(n)); }
        fn note_off(&mut self, _ch: u8, n: u8)        { self.0.lock().unwrap().push(Msg::Off(n)); }
    }

    #[test]
    fn cues_are_valid_midi() {
        let all = [Cue::Dot, Cue::Dash, Cue::Pop, Cue::Miss, Cue::Level, Cue::GameOver, Cue::Won];
        for cue in all {
            assert!(!cue.notes().is_empty());
            assert!(cue.notes().iter().all(|&(n, ms)| n < 128 && ms > 0));
            assert!(cue.program() < 128);
        }
        let dot: u64 = Cue::Dot.notes().iter().map(|n| n.1).sum();
        let dash: u64 = Cue::Dash.notes().iter().map(|n| n.1).sum();
        assert!(dash > dot);
    }

    #[test]
    fn shutdown_plays_queued_cues_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut player = SoundPlayer::spawn_with(move || Box::new(Recorder(sink)) as Box<dyn MidiOut>);
        player.play(Cue::Dot);
        player.play(Cue::Pop);
        player.shutdown();

        let got = log.lock().unwrap().clone();
        assert_eq!(
            got,
            vec![
                Msg::Program(80), Msg::On(84), Msg::Off(84),
                Msg::Program(13), Msg::On(76), Msg::Off(76), Msg::On(83), Msg::Off(83),
            ]
        );
    }

    #[test]
    fn muted_player_ignores_everything() {
        let mut player = SoundPlayer::muted();
        assert!(player.is_muted());
        player.play(Cue::Won);
        player.shutdown();
        player.shutdown();
    }

    #[test]
    fn null_output_accepts_cues() {
        let mut player = SoundPlayer::spawn_with(|| Box::new(NullOut) as Box<dyn MidiOut>);
        assert!(!player.is_muted());
        player.play(Cue::Miss);
        player.shutdown();
        assert!(player.is_muted());
    }
}

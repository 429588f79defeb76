//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┬──────────────┐
//! │                                             │  SCORE       │
//! │      ( E )          ( K )                   │  LIVES       │
//! │                                             │  LEVEL       │
//! │               ( S )                         │  ACCURACY    │
//! │   play field (or composer text)             │  [ code ]    │
//! │                                             │  EAR meter   │
//! ├─────────────────────────────────────────────┴──────────────┤
//! │  status bar                                                │
//! │  key legend                                                │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use blink_detect::SessionStatus;
use bubble_game::{Phase, Target};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::app::AppState;
use crate::error::AppError;
use crate::input::KeyPress;
use crate::settings::Mode;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:    usize = 1000;
pub const WIN_H:    usize = 640;
const PANEL_W:      usize = 240;
const FIELD_W:      usize = WIN_W - PANEL_W;
const STATUS_Y:     usize = WIN_H - 36;
const FIELD_H:      usize = STATUS_Y;
const PANEL_X:      usize = FIELD_W;
/// EAR at the right end of the meter.
const EAR_SCALE:    f32   = 0.5;

const BG_COLOR:     u32   = 0xFF1A1A2E;
const PANEL_BG:     u32   = 0xFF16213E;
const TEXT_BG:      u32   = 0xFF0F3460;
const GOLD:         u32   = 0xFFFFD700;
const TEXT:         u32   = 0xFFEEEEEE;
const DIM:          u32   = 0xFF888888;
const DANGER:       u32   = 0xFFEF4444;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    key_tx: Sender<KeyPress>,
}

impl Visualizer {
    pub fn new(key_tx: Sender<KeyPress>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Blink Pop",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            key_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Forward key presses to the input thread.  Returns false on quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let shift = self.window.is_key_down(Key::LeftShift)
                 || self.window.is_key_down(Key::RightShift);
        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) {
            let _ = self.key_tx.send(KeyPress::Q);
            return false;
        }

        let keys = [
            (Key::Space,     if shift { KeyPress::ShiftSpace } else { KeyPress::Space }),
            (Key::Enter,     KeyPress::Enter),
            (Key::Backspace, KeyPress::Backspace),
            (Key::Delete,    KeyPress::Delete),
            (Key::R,         KeyPress::R),
            (Key::N,         KeyPress::N),
            (Key::Escape,    KeyPress::Escape),
        ];
        for (key, press) in keys {
            if pressed(key) {
                let _ = self.key_tx.send(press);
            }
        }
        true
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState, now_ms: u64) {
        self.buf.fill(BG_COLOR);

        match app.mode() {
            Mode::Game    => self.draw_field(app),
            Mode::Compose => self.draw_composer(app),
        }

        self.fill_rect(PANEL_X, 0, PANEL_W, STATUS_Y, PANEL_BG);
        self.draw_panel(app, now_ms);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(app.status(), 10, STATUS_Y + 8, 1, TEXT);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "space=dot  shift+space=dash  enter=submit  bksp=undo  del=clear  r=recalibrate  n=next  esc=menu  q=quit",
            10, WIN_H - 14, 1, DIM,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Play field ────────────────────────────────────────────────────────

    fn draw_field(&mut self, app: &AppState) {
        let engine = app.engine();
        let code = app.code();
        for target in engine.targets() {
            self.draw_bubble(target, code);
        }

        let stats = engine.stats();
        let lines: Option<(String, String)> = match engine.phase() {
            Phase::Playing       => None,
            Phase::Idle          => Some(("blink pop".into(), "press n to start".into())),
            Phase::LevelComplete => Some((format!("level {} complete", stats.level), "press n for the next level".into())),
            Phase::GameOver      => Some(("game over".into(), format!("score {}  -  press n to play again", stats.score))),
            Phase::Won           => Some(("you win".into(), "press n to play again".into())),
        };
        if let Some((title, hint)) = lines {
            let (w, h) = (FIELD_W * 2 / 3, 110);
            let (x, y) = ((FIELD_W - w) / 2, (FIELD_H - h) / 2);
            self.fill_rect(x, y, w, h, TEXT_BG);
            self.draw_border(x, y, w, h, GOLD);
            self.draw_centered(&title, FIELD_W / 2, y + 24, 5, GOLD);
            self.draw_centered(&hint, FIELD_W / 2, y + 70, 2, TEXT);
        }
    }

    fn draw_bubble(&mut self, target: &Target, code: &str) {
        let (cx, cy) = field_px(target.x, target.y);
        let r = (target.size / 2.0) as isize;
        let color = 0xFF000000 | target.color;

        self.fill_circle(cx, cy, r, color);
        self.fill_circle(cx - r / 3, cy - r / 3, r / 5, blend(color, 0xFFFFFFFF, 0.5));
        // Gold ring while the typed code could still become this letter.
        if !code.is_empty() && target.code.starts_with(code) {
            self.draw_ring(cx, cy, r + 2, GOLD);
            self.draw_ring(cx, cy, r + 3, GOLD);
        }

        let letter = target.letter.to_string();
        if cy - 8 >= 0 {
            self.draw_centered(&letter, cx.max(0) as usize, (cy - 8) as usize, 3, 0xFFFFFFFF);
        }
        if cy + r + 6 >= 0 {
            self.draw_centered(&target.code, cx.max(0) as usize, (cy + r + 6) as usize, 2, blend(color, 0xFFFFFFFF, 0.6));
        }
    }

    // ── Composer ──────────────────────────────────────────────────────────

    fn draw_composer(&mut self, app: &AppState) {
        let composer = app.composer();
        let flags = format!(
            "caps {}   speech {}",
            if composer.caps() { "on" } else { "off" },
            if composer.speech() { "on" } else { "off" },
        );
        self.draw_label(&flags, 20, 20, 2, DIM);

        let text = format!("{}_", composer.text());
        self.fill_rect(16, 60, FIELD_W - 32, 60, TEXT_BG);
        self.draw_label(&text, 28, 78, 4, TEXT);

        let mut y = 150;
        for line in composer.history().iter().rev().take(12) {
            self.draw_label(line, 28, y, 2, DIM);
            y += 30;
        }
    }

    // ── Side panel ────────────────────────────────────────────────────────

    fn draw_panel(&mut self, app: &AppState, now_ms: u64) {
        let x = PANEL_X + 16;

        if app.mode() == Mode::Game {
            let stats = app.engine().stats();
            let rows = [
                format!("score {}", stats.score),
                format!("lives {}", stats.lives),
                format!("level {}", stats.level),
                format!("accuracy {}%", stats.accuracy),
                format!("popped {}/{}", stats.bubbles_popped, stats.total_bubbles),
            ];
            for (i, row) in rows.iter().enumerate() {
                let color = if i == 1 && stats.lives <= 1 { DANGER } else { TEXT };
                self.draw_label(row, x, 20 + i * 24, 2, color);
            }
        } else {
            self.draw_label("compose", x, 20, 2, TEXT);
        }

        // ── Code buffer and auto-submit countdown ─────────────────────────
        let code_y = 160;
        self.fill_rect(x, code_y, PANEL_W - 32, 56, TEXT_BG);
        self.draw_border(x, code_y, PANEL_W - 32, 56, GOLD);
        self.draw_label(app.code(), x + 10, code_y + 14, 5, GOLD);
        if let Some(deadline) = app.submit_deadline() {
            let left = deadline.saturating_sub(now_ms) as f32 / app.auto_submit_ms().max(1) as f32;
            let w = ((PANEL_W - 32) as f32 * left.clamp(0.0, 1.0)) as usize;
            self.fill_rect(x, code_y + 60, w, 4, GOLD);
        }

        // ── Blink detection ───────────────────────────────────────────────
        let meter_y = 260;
        let meter_w = PANEL_W - 32;
        let Some(session) = app.session() else {
            self.draw_label("no camera", x, meter_y, 2, DIM);
            self.draw_label("keyboard only", x, meter_y + 22, 1, DIM);
            return;
        };

        match session.status() {
            SessionStatus::Calibrating { progress } => {
                self.draw_label("calibrating", x, meter_y, 2, TEXT);
                self.fill_rect(x, meter_y + 24, meter_w, 8, TEXT_BG);
                self.fill_rect(x, meter_y + 24, (meter_w as f32 * progress.clamp(0.0, 1.0)) as usize, 8, GOLD);
            }
            SessionStatus::Detecting { baseline } => {
                self.draw_label(&format!("baseline {:.2}", baseline), x, meter_y, 2, TEXT);
                let mark = x + meter_fill(baseline, meter_w);
                self.fill_rect(mark, meter_y + 22, 2, 12, GOLD);
            }
            SessionStatus::Released => {
                self.draw_label("camera off", x, meter_y, 2, DIM);
                return;
            }
            SessionStatus::Unavailable(_) => {
                self.draw_label("detection off", x, meter_y, 2, DIM);
                self.draw_label("keyboard only", x, meter_y + 22, 1, DIM);
                return;
            }
        }

        let ear = session.last_ear().unwrap_or(0.0);
        self.fill_rect(x, meter_y + 40, meter_w, 10, TEXT_BG);
        self.fill_rect(x, meter_y + 40, meter_fill(ear, meter_w), 10, 0xFF22C55E);
        self.draw_label(&format!("ear {:.3}", ear), x, meter_y + 56, 1, DIM);
        self.draw_label(&format!("blinks {}", session.blink_count()), x, meter_y + 68, 1, DIM);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    /// Clipped to the play field, so bubbles never paint over the panel.
    fn set_field_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < FIELD_W && (y as usize) < FIELD_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn fill_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx*dx + dy*dy <= r*r {
                    self.set_field_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn draw_ring(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        let inner = (r - 1) * (r - 1);
        for dy in -r..=r {
            for dx in -r..=r {
                let d = dx*dx + dy*dy;
                if d <= r*r && d > inner {
                    self.set_field_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 3×5 bitmap font, each pixel drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }

    fn draw_centered(&mut self, text: &str, cx: usize, y: usize, scale: usize, color: u32) {
        let x = cx.saturating_sub(text_width(text, scale) / 2);
        self.draw_label(text, x, y, scale, color);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Play-field percentages to pixels.  `y` may be negative above the field.
fn field_px(x_pct: f32, y_pct: f32) -> (isize, isize) {
    (
        (x_pct / 100.0 * FIELD_W as f32).round() as isize,
        (y_pct / 100.0 * FIELD_H as f32).round() as isize,
    )
}

fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { (n * 4 - 1) * scale.max(1) }
}

fn meter_fill(ear: f32, width: usize) -> usize {
    ((ear / EAR_SCALE).clamp(0.0, 1.0) * width as f32) as usize
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Timed symbol input: debounce and auto-submit.
//!
//! ```text
//!   on_symbol ──▶ debounce ──▶ buffer ──▶ arm deadline (now + auto_submit)
//!                    │                          │
//!                 rejected               poll(now ≥ deadline)
//!                                               │
//!                                        code handed out once
//! ```
//!
//! There is exactly one deadline.  Every accepted symbol replaces it, and
//! submit, clear and backspace cancel it, so a stale timer can never submit
//! a buffer the user has since edited.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::symbol::{Symbol, SymbolBuffer};
use crate::table::MorseTable;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Symbols closer than this to the previous accepted one are dropped (ms).
    pub debounce_ms:    u64,
    /// Idle time after the last symbol before the code submits itself (ms).
    pub auto_submit_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig { debounce_ms: 300, auto_submit_ms: 2_000 }
    }
}

/// Outcome of offering one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accept {
    Accepted,
    /// Too soon after the previous accepted symbol.
    Debounced,
    /// Buffer already holds the longest possible code.
    BufferFull,
    /// The consumer is not taking input right now.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct SymbolInput {
    cfg:           InputConfig,
    buffer:        SymbolBuffer,
    last_accepted: Option<u64>,
    deadline:      Option<u64>,
}

impl SymbolInput {
    pub fn new(cfg: InputConfig, max_len: usize) -> Self {
        SymbolInput {
            cfg,
            buffer:        SymbolBuffer::new(max_len),
            last_accepted: None,
            deadline:      None,
        }
    }

    /// Buffer capped at the table's longest code.
    pub fn for_table(cfg: InputConfig, table: &MorseTable) -> Self {
        Self::new(cfg, table.max_code_len())
    }

    pub fn on_symbol(&mut self, sym: Symbol, now_ms: u64) -> Accept {
        if let Some(last) = self.last_accepted {
            if now_ms.saturating_sub(last) < self.cfg.debounce_ms {
                debug!(symbol = %sym, since_last = now_ms.saturating_sub(last), "debounced");
                return Accept::Debounced;
            }
        }
        if !self.buffer.push(sym) {
            debug!(symbol = %sym, code = self.buffer.as_str(), "buffer full");
            return Accept::BufferFull;
        }
        self.last_accepted = Some(now_ms);
        self.deadline = Some(now_ms + self.cfg.auto_submit_ms);
        Accept::Accepted
    }

    /// Hand out the code once the deadline has passed.  Fires at most once
    /// per arming; an empty buffer yields nothing.
    pub fn poll(&mut self, now_ms: u64) -> Option<String> {
        match self.deadline {
            Some(d) if now_ms >= d => {
                self.deadline = None;
                if self.buffer.is_empty() {
                    None
                } else {
                    debug!(code = self.buffer.as_str(), "auto-submit");
                    Some(self.buffer.take())
                }
            }
            _ => None,
        }
    }

    /// Cancel the deadline and take the code (possibly empty).
    pub fn take_for_submit(&mut self) -> String {
        self.deadline = None;
        self.buffer.take()
    }

    pub fn clear(&mut self) {
        self.deadline = None;
        self.buffer.clear();
    }

    /// Remove the last symbol.  The deadline is cancelled either way.
    pub fn backspace(&mut self) -> Option<Symbol> {
        self.deadline = None;
        self.buffer.pop()
    }

    /// Clear everything, including debounce history.
    pub fn reset(&mut self) {
        self.clear();
        self.last_accepted = None;
    }

    pub fn code(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn config(&self) -> &InputConfig {
        &self.cfg
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

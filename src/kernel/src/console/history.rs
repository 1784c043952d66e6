//! Recall ring of committed lines.

use crate::config::{INPUT_BUF, MAX_HISTORY};

/// One saved line, terminator excluded.
#[derive(Clone, Copy)]
pub struct HistoryEntry {
    bytes: [u8; INPUT_BUF],
    len: usize,
}

impl HistoryEntry {
    const EMPTY: HistoryEntry = HistoryEntry {
        bytes: [0; INPUT_BUF],
        len: 0,
    };

    /// Saved line contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Fixed-depth history, most recent first.
///
/// Entries live in a ring with a rotating head, so a push never moves the
/// older snapshots. `nav` is the recall position: `None` while the user is
/// editing a fresh line, `Some(age)` while entry `age` is on screen.
pub struct HistoryRing {
    entries: [HistoryEntry; MAX_HISTORY],
    /// Slot of the most recent entry.
    head: usize,
    count: usize,
    nav: Option<usize>,
}

impl HistoryRing {
    /// Creates an empty history.
    pub const fn new() -> Self {
        Self {
            entries: [HistoryEntry::EMPTY; MAX_HISTORY],
            head: 0,
            count: 0,
            nav: None,
        }
    }

    /// Number of saved lines.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing has been saved yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Saves a line as the most recent entry, evicting the oldest when full.
    ///
    /// Returns `true` if an entry was evicted.
    pub fn push(&mut self, line: &[u8]) -> bool {
        let evicted = self.count == MAX_HISTORY;
        self.head = (self.head + 1) % MAX_HISTORY;
        let entry = &mut self.entries[self.head];
        entry.len = line.len().min(INPUT_BUF);
        entry.bytes[..entry.len].copy_from_slice(&line[..entry.len]);
        if !evicted {
            self.count += 1;
        }
        evicted
    }

    /// The entry `age` commits ago (0 is the most recent).
    pub fn get(&self, age: usize) -> Option<&HistoryEntry> {
        if age >= self.count {
            return None;
        }
        Some(&self.entries[(self.head + MAX_HISTORY - age) % MAX_HISTORY])
    }

    /// Current recall position.
    pub fn position(&self) -> Option<usize> {
        self.nav
    }

    /// Steps one entry further into the past.
    ///
    /// Returns the newly selected entry, or `None` if already at the oldest.
    pub fn older(&mut self) -> Option<&HistoryEntry> {
        let next = self.nav.map_or(0, |age| age + 1);
        if next >= self.count {
            return None;
        }
        self.nav = Some(next);
        self.get(next)
    }

    /// Steps one entry towards the present.
    ///
    /// Stops at the most recent entry; the live line is not restored.
    pub fn newer(&mut self) -> Option<&HistoryEntry> {
        match self.nav {
            Some(age) if age > 0 => {
                self.nav = Some(age - 1);
                self.get(age - 1)
            }
            _ => None,
        }
    }

    /// Leaves recall mode.
    pub fn reset_position(&mut self) {
        self.nav = None;
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}

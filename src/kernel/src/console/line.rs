//! The console input ring.
//!
//! One fixed array, four ever-increasing offsets:
//!
//! ```text
//!   read        commit        cursor        edit
//!    |  committed  |    live line  |  tail      |
//! ```
//!
//! `[read, commit)` holds terminated lines waiting for a reader,
//! `[commit, edit)` is the line being typed and `cursor` is the insertion
//! point inside it. Offsets only wrap when indexing the array.

use core::ops::Range;

use crate::config::INPUT_BUF;

/// Bounded line-editing buffer shared by the input engine and readers.
pub struct LineBuffer {
    buf: [u8; INPUT_BUF],
    read: usize,
    commit: usize,
    cursor: usize,
    edit: usize,
}

impl LineBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0; INPUT_BUF],
            read: 0,
            commit: 0,
            cursor: 0,
            edit: 0,
        }
    }

    #[inline]
    fn slot(offset: usize) -> usize {
        offset % INPUT_BUF
    }

    /// Offset of the next byte a reader will take.
    pub fn read_offset(&self) -> usize {
        self.read
    }

    /// End of the committed region.
    pub fn commit_offset(&self) -> usize {
        self.commit
    }

    /// Insertion point inside the live line.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// End of the live line.
    pub fn edit(&self) -> usize {
        self.edit
    }

    /// The byte stored at `offset`.
    pub fn byte_at(&self, offset: usize) -> u8 {
        self.buf[Self::slot(offset)]
    }

    /// Whether no more bytes fit until a reader drains some.
    pub fn is_full(&self) -> bool {
        self.edit - self.read == INPUT_BUF
    }

    /// Free cells left.
    pub fn free(&self) -> usize {
        INPUT_BUF - (self.edit - self.read)
    }

    /// Whether a reader has something to take.
    pub fn has_committed(&self) -> bool {
        self.read != self.commit
    }

    /// Length of the live line.
    pub fn live_len(&self) -> usize {
        self.edit - self.commit
    }

    /// Number of bytes after the cursor.
    pub fn tail_len(&self) -> usize {
        self.edit - self.cursor
    }

    /// Inserts `ch` at the cursor, shifting the tail right.
    ///
    /// Returns `false` without touching anything when the buffer is full.
    pub fn insert(&mut self, ch: u8) -> bool {
        if self.is_full() {
            return false;
        }
        let mut i = self.edit;
        while i != self.cursor {
            self.buf[Self::slot(i)] = self.buf[Self::slot(i - 1)];
            i -= 1;
        }
        self.buf[Self::slot(self.cursor)] = ch;
        self.cursor += 1;
        self.edit += 1;
        true
    }

    /// Removes the byte before the cursor, shifting the tail left.
    ///
    /// Returns `false` when the cursor is already at the start of the line.
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor == self.commit {
            return false;
        }
        for i in self.cursor..self.edit {
            self.buf[Self::slot(i - 1)] = self.buf[Self::slot(i)];
        }
        self.cursor -= 1;
        self.edit -= 1;
        true
    }

    /// Moves the cursor one byte left, stopping at the line start.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == self.commit {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves the cursor one byte right, stopping at the line end.
    pub fn move_right(&mut self) -> bool {
        if self.cursor == self.edit {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Writes a terminator at `edit` without moving the cursor.
    pub fn append_terminator(&mut self, ch: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[Self::slot(self.edit)] = ch;
        self.edit += 1;
        true
    }

    /// Deletes the last byte of the line if it belongs to the current line.
    ///
    /// Stops at `commit` and at a line terminator. Expects the cursor to sit
    /// at `edit`.
    pub fn kill_step(&mut self) -> bool {
        debug_assert_eq!(self.cursor, self.edit);
        if self.edit == self.commit || self.byte_at(self.edit - 1) == b'\n' {
            return false;
        }
        self.edit -= 1;
        self.cursor = self.edit;
        true
    }

    /// Erases from the end of the line back to its start.
    ///
    /// Returns the number of bytes removed.
    pub fn kill_to_line_start(&mut self) -> usize {
        self.cursor = self.edit;
        let mut killed = 0;
        while self.kill_step() {
            killed += 1;
        }
        killed
    }

    /// Makes the live line visible to readers.
    ///
    /// Returns the offsets of the newly committed bytes.
    pub fn commit_line(&mut self) -> Range<usize> {
        let start = self.commit;
        self.commit = self.edit;
        self.cursor = self.edit;
        start..self.edit
    }

    /// Replaces the live line with `bytes`, leaving the cursor at its end.
    ///
    /// Truncates to the free capacity. Returns the number of bytes stored.
    pub fn replace_live(&mut self, bytes: &[u8]) -> usize {
        self.edit = self.commit;
        self.cursor = self.commit;
        let len = bytes.len().min(self.free());
        for &b in &bytes[..len] {
            self.buf[Self::slot(self.edit)] = b;
            self.edit += 1;
        }
        self.cursor = self.edit;
        len
    }

    /// Copies the bytes in `range` into `out`, returning how many fit.
    pub fn copy_range(&self, range: Range<usize>, out: &mut [u8]) -> usize {
        let mut n = 0;
        for (offset, dst) in range.zip(out.iter_mut()) {
            *dst = self.byte_at(offset);
            n += 1;
        }
        n
    }

    /// Takes the next committed byte.
    pub fn pop_committed(&mut self) -> Option<u8> {
        if !self.has_committed() {
            return None;
        }
        let b = self.byte_at(self.read);
        self.read += 1;
        Some(b)
    }

    /// Puts the last taken byte back so the next reader sees it again.
    pub fn unread(&mut self) {
        debug_assert!(self.read > 0);
        self.read -= 1;
    }

    /// Checks the offset ordering and capacity invariants.
    pub fn invariants_hold(&self) -> bool {
        self.read <= self.commit
            && self.commit <= self.cursor
            && self.cursor <= self.edit
            && self.edit - self.read <= INPUT_BUF
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

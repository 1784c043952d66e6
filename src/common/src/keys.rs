//! Console input symbol codes.
//!
//! The keyboard and serial drivers hand the console one `i32` per symbol:
//! a byte value, one of the control codes below, or a negative value meaning
//! "nothing more right now".

/// Control-`x` code for an ASCII letter.
pub const fn ctrl(x: u8) -> i32 {
    (x - b'@') as i32
}

/// End of input (Ctrl-D).
pub const EOF: i32 = ctrl(b'D');
/// Replay the marked region (Ctrl-F).
pub const MARK_END: i32 = ctrl(b'F');
/// Backspace (Ctrl-H).
pub const BACKSPACE: i32 = ctrl(b'H');
/// Print the process list (Ctrl-P).
pub const PROC_DUMP: i32 = ctrl(b'P');
/// Start a copy mark at the cursor (Ctrl-S).
pub const MARK_BEGIN: i32 = ctrl(b'S');
/// Kill the current line (Ctrl-U).
pub const KILL_LINE: i32 = ctrl(b'U');
/// Delete key, treated as backspace.
pub const DELETE: i32 = 0x7f;

/// Arrow keys, as produced by the keyboard decoder.
pub const UP_ARROW: i32 = 226;
/// Down arrow.
pub const DOWN_ARROW: i32 = 227;
/// Left arrow.
pub const LEFT_ARROW: i32 = 228;
/// Right arrow.
pub const RIGHT_ARROW: i32 = 229;

/// The end-of-input byte as stored in the line buffer.
pub const EOF_BYTE: u8 = EOF as u8;

/// A decoded console input symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputSymbol {
    /// A byte to insert at the cursor.
    Char(u8),
    /// Line terminator (`\n`, or `\r` normalized).
    Newline,
    /// End of input.
    Eof,
    /// Delete the byte before the cursor.
    Backspace,
    /// Move the cursor left.
    Left,
    /// Move the cursor right.
    Right,
    /// Recall an older history entry.
    Up,
    /// Recall a newer history entry.
    Down,
    /// Erase the line being edited.
    KillLine,
    /// Start a copy mark.
    MarkBegin,
    /// Replay the marked text at the cursor.
    MarkEnd,
    /// Dump the process table.
    ProcDump,
}

impl InputSymbol {
    /// Decodes a producer code.
    ///
    /// Returns `None` for negative codes, NUL, and anything above a byte
    /// that is not an arrow key.
    pub fn from_code(code: i32) -> Option<Self> {
        let symbol = match code {
            EOF => InputSymbol::Eof,
            MARK_END => InputSymbol::MarkEnd,
            BACKSPACE | DELETE => InputSymbol::Backspace,
            PROC_DUMP => InputSymbol::ProcDump,
            MARK_BEGIN => InputSymbol::MarkBegin,
            KILL_LINE => InputSymbol::KillLine,
            UP_ARROW => InputSymbol::Up,
            DOWN_ARROW => InputSymbol::Down,
            LEFT_ARROW => InputSymbol::Left,
            RIGHT_ARROW => InputSymbol::Right,
            0x0a | 0x0d => InputSymbol::Newline,
            1..=255 => InputSymbol::Char(code as u8),
            _ => return None,
        };
        Some(symbol)
    }
}

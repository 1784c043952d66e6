//! Interrupt-time line editing.
//!
//! [`ConsoleState`] is everything behind the console lock. The input engine
//! takes one [`InputSymbol`] at a time, mutates the line buffer, history and
//! copy mark, and renders each step so the screen tracks the buffer exactly.

use core::fmt;

use kiln_common::keys::EOF_BYTE;
use kiln_common::InputSymbol;
use kiln_hal::{Serial, TextDisplay};
use log::{debug, trace};

use super::calc::{self, Literal};
use super::clipboard::ClipboardMark;
use super::display::{DisplayCursorManager, RenderEvent};
use super::history::{HistoryEntry, HistoryRing};
use super::line::LineBuffer;
use super::sink::OutputSink;
use crate::config::{CalcSplice, ConsoleConfig, INPUT_BUF};

/// Work left for the caller once the lock is released.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    /// A line was committed; wake blocked readers.
    pub wake: bool,
    /// The process listing was requested.
    pub dump: bool,
}

/// Console state guarded by the console lock.
pub struct ConsoleState<D, S> {
    line: LineBuffer,
    history: HistoryRing,
    mark: ClipboardMark,
    out: OutputSink<D, S>,
    splice: CalcSplice,
    sweep_backlog: bool,
}

impl<D: TextDisplay, S: Serial> ConsoleState<D, S> {
    /// Builds the state around a display and a serial port.
    pub fn new(display: D, serial: S, config: &ConsoleConfig) -> Self {
        let screen = DisplayCursorManager::new(display, config.geometry, config.color);
        Self {
            line: LineBuffer::new(),
            history: HistoryRing::new(),
            mark: ClipboardMark::new(),
            out: OutputSink::new(screen, serial, config.targets),
            splice: config.splice,
            sweep_backlog: config.sweep_backlog,
        }
    }

    /// The input ring.
    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    /// Mutable input ring, for the reader side.
    pub(crate) fn line_mut(&mut self) -> &mut LineBuffer {
        &mut self.line
    }

    /// Saved lines.
    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    /// The copy mark.
    pub fn mark(&self) -> &ClipboardMark {
        &self.mark
    }

    /// The output side.
    pub fn sink(&self) -> &OutputSink<D, S> {
        &self.out
    }

    /// Mutable output side.
    pub fn sink_mut(&mut self) -> &mut OutputSink<D, S> {
        &mut self.out
    }

    /// Copies the line being edited into `out`, returning its length.
    pub fn live_line(&self, out: &mut [u8]) -> usize {
        self.line
            .copy_range(self.line.commit_offset()..self.line.edit(), out)
    }

    /// Processes one input symbol.
    pub fn handle(&mut self, symbol: InputSymbol, deferred: &mut Deferred) {
        trace!("console: {:?}", symbol);
        match symbol {
            InputSymbol::ProcDump => deferred.dump = true,
            InputSymbol::KillLine => self.kill_line(),
            InputSymbol::Backspace => {
                self.backspace();
            }
            InputSymbol::Left => {
                self.cursor_left();
            }
            InputSymbol::Right => {
                self.cursor_right();
            }
            InputSymbol::Up => self.recall(true),
            InputSymbol::Down => self.recall(false),
            InputSymbol::MarkBegin => {
                self.mark.begin(self.line.cursor());
            }
            InputSymbol::MarkEnd => self.replay(deferred),
            InputSymbol::Newline => self.terminate(b'\n', deferred),
            InputSymbol::Eof => self.terminate(EOF_BYTE, deferred),
            InputSymbol::Char(b) => {
                self.type_byte(b, deferred);
            }
        }
        debug_assert!(self.line.invariants_hold());
    }

    /// Rewrites calculator triggers left in the live line after a batch.
    pub fn sweep(&mut self) {
        if self.sweep_backlog {
            self.rewrite_live();
        }
    }

    /// Writes output bytes through the sink.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let tail = self.line.tail_len();
            self.out.put_byte(b, tail);
        }
    }

    fn put(&mut self, event: RenderEvent) {
        let tail = self.line.tail_len();
        self.out.put(event, tail);
    }

    /// Inserts at the cursor and renders, without commit checks.
    fn insert_byte(&mut self, b: u8) -> bool {
        let cursor = self.line.cursor();
        if !self.line.insert(b) {
            return false;
        }
        self.mark.note_insert(cursor);
        self.put(RenderEvent::Char(b));
        true
    }

    /// The printable path: insert, render, commit when the ring fills up.
    fn type_byte(&mut self, b: u8, deferred: &mut Deferred) -> bool {
        if !self.insert_byte(b) {
            return false;
        }
        if self.line.is_full() {
            self.commit(deferred);
        }
        true
    }

    fn backspace(&mut self) -> bool {
        let cursor = self.line.cursor();
        if !self.line.delete_before_cursor() {
            return false;
        }
        self.mark.note_delete(cursor);
        self.put(RenderEvent::Backspace);
        true
    }

    fn cursor_left(&mut self) -> bool {
        if !self.line.move_left() {
            return false;
        }
        self.put(RenderEvent::Left);
        true
    }

    fn cursor_right(&mut self) -> bool {
        if !self.line.move_right() {
            return false;
        }
        self.put(RenderEvent::Right);
        true
    }

    fn cursor_to_end(&mut self) {
        while self.cursor_right() {}
    }

    fn terminate(&mut self, terminator: u8, deferred: &mut Deferred) {
        if self.line.is_full() {
            // No cell for the terminator; hand over what is there.
            if self.line.live_len() > 0 {
                self.commit(deferred);
            }
            return;
        }
        if terminator == b'\n' {
            self.rewrite_live();
        }
        self.cursor_to_end();
        self.line.append_terminator(terminator);
        if terminator == b'\n' {
            self.put(RenderEvent::Newline);
        }
        self.commit(deferred);
    }

    fn commit(&mut self, deferred: &mut Deferred) {
        self.cursor_to_end();
        let range = self.line.commit_line();
        self.history.reset_position();

        let len = range.end - range.start;
        if len > 1 && self.line.byte_at(range.end - 1) == b'\n' {
            let mut snapshot = [0u8; INPUT_BUF];
            let n = self.line.copy_range(range.start..range.end - 1, &mut snapshot);
            if self.history.push(&snapshot[..n]) {
                debug!("console: history full, oldest entry evicted");
            }
        }
        debug!("console: committed {} bytes", len);
        deferred.wake = true;
    }

    fn kill_line(&mut self) {
        self.cursor_to_end();
        while self.line.kill_step() {
            self.put(RenderEvent::Backspace);
        }
        self.mark.clear();
    }

    fn recall(&mut self, older: bool) {
        let selected = if older {
            self.history.older()
        } else {
            self.history.newer()
        };
        let entry: HistoryEntry = match selected {
            Some(entry) => *entry,
            None => return,
        };

        self.cursor_to_end();
        for _ in 0..self.line.live_len() {
            self.out.put(RenderEvent::Backspace, 0);
        }

        // Keep one cell free so the recalled line can still be terminated.
        let room = (self.line.free() + self.line.live_len()).saturating_sub(1);
        let bytes = entry.as_bytes();
        self.line.replace_live(&bytes[..bytes.len().min(room)]);
        for offset in self.line.commit_offset()..self.line.edit() {
            let b = self.line.byte_at(offset);
            if b != b'\n' && b != EOF_BYTE {
                self.out.put(RenderEvent::Char(b), 0);
            }
        }
        self.mark.clear();
    }

    fn replay(&mut self, deferred: &mut Deferred) {
        let Some(mark) = self.mark.take() else {
            return;
        };
        let end = self.line.cursor();
        let start = mark.max(self.line.read_offset());
        debug!("console: replaying {} bytes", end.saturating_sub(start));

        // Bytes before the cursor do not move while we insert at the cursor.
        // Terminators land past the cursor and are not drawn, so the screen
        // stays on the row being edited.
        for offset in start..end {
            let b = self.line.byte_at(offset);
            if b == b'\n' || b == EOF_BYTE {
                if !self.line.append_terminator(b) {
                    break;
                }
                if self.line.is_full() {
                    self.commit(deferred);
                }
            } else if !self.type_byte(b, deferred) {
                break;
            }
        }
    }

    /// Replaces every calculator trigger in the live line with its value.
    fn rewrite_live(&mut self) {
        let mut from = self.line.commit_offset();
        loop {
            let region = self.line.commit_offset()..self.line.edit();
            let line = &self.line;
            let Some(trigger) = calc::find_trigger(|i| line.byte_at(i), region, from) else {
                break;
            };
            from = trigger.qmark + 1;

            let Some(literal) = calc::evaluate_trigger(&trigger) else {
                continue;
            };
            let (first, count) = match self.splice {
                CalcSplice::ReplaceExpression => (trigger.start, trigger.span_len()),
                CalcSplice::KeepExpression => (trigger.qmark, 1),
            };
            // The line must keep a cell for its terminator.
            let grow = literal.as_bytes().len().saturating_sub(count);
            if grow >= self.line.free() {
                continue;
            }

            debug!(
                "console: {} {:?} {} -> {:?}",
                trigger.lhs, trigger.op, trigger.rhs, literal
            );
            self.splice(trigger.qmark + 1, count, &literal);
            from = first + literal.as_bytes().len();
        }
    }

    /// Deletes `count` bytes ending just before `after` and inserts `literal`.
    ///
    /// The cursor returns to the same distance from the trailing context it
    /// had before the splice.
    fn splice(&mut self, after: usize, count: usize, literal: &Literal) {
        let bias = self.line.cursor().saturating_sub(after);
        while self.line.cursor() > after && self.cursor_left() {}
        while self.line.cursor() < after && self.cursor_right() {}

        for _ in 0..count {
            self.backspace();
        }
        for &b in literal.as_bytes() {
            self.insert_byte(b);
        }
        for _ in 0..bias {
            self.cursor_right();
        }
    }
}

impl<D: TextDisplay, S: Serial> fmt::Write for ConsoleState<D, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{CaptureSerial, MemoryDisplay};
    use kiln_common::keys;

    type State = ConsoleState<MemoryDisplay, CaptureSerial>;

    fn state() -> State {
        ConsoleState::new(MemoryDisplay::new(), CaptureSerial::new(), &ConsoleConfig::default())
    }

    fn feed(state: &mut State, codes: &[i32]) -> Deferred {
        let mut deferred = Deferred::default();
        for &code in codes {
            if let Some(symbol) = InputSymbol::from_code(code) {
                state.handle(symbol, &mut deferred);
            }
        }
        state.sweep();
        deferred
    }

    fn type_str(state: &mut State, s: &str) -> Deferred {
        let codes: std::vec::Vec<i32> = s.bytes().map(i32::from).collect();
        feed(state, &codes)
    }

    fn live(state: &State) -> std::string::String {
        let mut buf = [0u8; INPUT_BUF];
        let n = state.live_line(&mut buf);
        std::string::String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    fn committed(state: &mut State) -> std::string::String {
        let mut out = std::vec::Vec::new();
        while let Some(b) = state.line_mut().pop_committed() {
            out.push(b);
        }
        std::string::String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_mid_line_insert_tracks_screen() {
        let mut s = state();
        type_str(&mut s, "abc");
        feed(&mut s, &[keys::LEFT_ARROW, keys::LEFT_ARROW]);
        type_str(&mut s, "X");
        assert_eq!(live(&s), "aXbc");
        assert_eq!(s.sink().screen().display().row_text(0), "aXbc");
        assert_eq!(s.line().cursor(), 2);
    }

    #[test]
    fn test_newline_commits_and_wakes() {
        let mut s = state();
        let d = type_str(&mut s, "ls\n");
        assert!(d.wake);
        assert_eq!(committed(&mut s), "ls\n");
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_newline_mid_line_commits_whole_line() {
        let mut s = state();
        type_str(&mut s, "echo");
        feed(&mut s, &[keys::LEFT_ARROW, keys::LEFT_ARROW, b'\r' as i32]);
        assert_eq!(committed(&mut s), "echo\n");
        assert_eq!(s.sink_mut().screen_mut().position(), 80);
    }

    #[test]
    fn test_empty_line_not_saved() {
        let mut s = state();
        type_str(&mut s, "\n");
        assert!(s.history().is_empty());
        feed(&mut s, &[keys::EOF]);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_backspace_adjusts_line_and_screen() {
        let mut s = state();
        type_str(&mut s, "cart");
        feed(&mut s, &[keys::LEFT_ARROW, keys::BACKSPACE]);
        assert_eq!(live(&s), "cat");
        assert_eq!(s.sink().screen().display().row_text(0), "cat");
    }

    #[test]
    fn test_kill_line_erases_screen_and_mark() {
        let mut s = state();
        type_str(&mut s, "done\n");
        type_str(&mut s, "oops");
        feed(&mut s, &[keys::MARK_BEGIN, keys::LEFT_ARROW, keys::KILL_LINE]);
        assert_eq!(live(&s), "");
        assert!(!s.mark().is_marked());
        assert_eq!(s.sink().screen().display().row_text(1), "");
        assert_eq!(committed(&mut s), "done\n");
    }

    #[test]
    fn test_history_recall_replaces_live_line() {
        let mut s = state();
        type_str(&mut s, "first\nsecond\nsc");
        feed(&mut s, &[keys::UP_ARROW]);
        assert_eq!(live(&s), "second");
        assert_eq!(s.sink().screen().display().row_text(2), "second");
        feed(&mut s, &[keys::UP_ARROW]);
        assert_eq!(live(&s), "first");
        assert_eq!(s.sink().screen().display().row_text(2), "first");
        feed(&mut s, &[keys::UP_ARROW]);
        assert_eq!(live(&s), "first");
        feed(&mut s, &[keys::DOWN_ARROW]);
        assert_eq!(live(&s), "second");
        feed(&mut s, &[keys::DOWN_ARROW]);
        assert_eq!(live(&s), "second");
    }

    #[test]
    fn test_recall_same_entry_twice_is_identical() {
        let mut s = state();
        type_str(&mut s, "a\nb\n");
        feed(&mut s, &[keys::UP_ARROW, keys::UP_ARROW, keys::DOWN_ARROW]);
        let first = s.sink().screen().display().row_text(2);
        feed(&mut s, &[keys::UP_ARROW, keys::DOWN_ARROW]);
        assert_eq!(s.sink().screen().display().row_text(2), first);
        assert_eq!(live(&s), "b");
    }

    #[test]
    fn test_recalled_line_can_be_submitted() {
        let mut s = state();
        type_str(&mut s, "run\n");
        committed(&mut s);
        feed(&mut s, &[keys::UP_ARROW]);
        type_str(&mut s, "\n");
        assert_eq!(committed(&mut s), "run\n");
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn test_mark_replay_copies_typed_text() {
        let mut s = state();
        type_str(&mut s, "go ");
        feed(&mut s, &[keys::MARK_BEGIN]);
        type_str(&mut s, "abc");
        feed(&mut s, &[keys::MARK_END]);
        assert_eq!(live(&s), "go abcabc");
        assert_eq!(s.sink().screen().display().row_text(0), "go abcabc");
        assert!(!s.mark().is_marked());

        feed(&mut s, &[keys::MARK_END]);
        assert_eq!(live(&s), "go abcabc");
    }

    #[test]
    fn test_mark_survives_edit_before_it() {
        let mut s = state();
        type_str(&mut s, "xy");
        feed(&mut s, &[keys::MARK_BEGIN]);
        type_str(&mut s, "12");
        feed(&mut s, &[keys::LEFT_ARROW, keys::LEFT_ARROW, keys::LEFT_ARROW]);
        feed(&mut s, &[keys::BACKSPACE]);
        assert_eq!(s.mark().offset(), Some(1));
        feed(&mut s, &[keys::RIGHT_ARROW, keys::RIGHT_ARROW, keys::RIGHT_ARROW]);
        feed(&mut s, &[keys::MARK_END]);
        assert_eq!(live(&s), "y1212");
    }

    #[test]
    fn test_proc_dump_is_deferred() {
        let mut s = state();
        let d = feed(&mut s, &[keys::PROC_DUMP]);
        assert!(d.dump);
        assert!(!d.wake);
        assert_eq!(live(&s), "");
    }

    #[test]
    fn test_capacity_forces_commit() {
        let mut s = state();
        let text: std::string::String = core::iter::repeat('a').take(INPUT_BUF).collect();
        let d = type_str(&mut s, &text);
        assert!(d.wake);
        assert!(s.line().is_full());
        assert_eq!(s.line().commit_offset(), INPUT_BUF);
        // Nothing fits until a reader drains the ring.
        type_str(&mut s, "b\n");
        assert_eq!(s.line().edit(), INPUT_BUF);
        assert_eq!(committed(&mut s).len(), INPUT_BUF);
    }

    #[test]
    fn test_eof_is_stored_but_not_drawn() {
        let mut s = state();
        type_str(&mut s, "ab");
        feed(&mut s, &[keys::EOF]);
        assert_eq!(committed(&mut s), "ab\u{4}");
        assert_eq!(s.sink().screen().display().row_text(0), "ab");
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_calculator_rewrites_on_question_mark() {
        let mut s = state();
        type_str(&mut s, "7+3=?");
        assert_eq!(live(&s), "10");
        assert_eq!(s.sink().screen().display().row_text(0), "10");
        assert_eq!(s.line().cursor(), 2);
    }

    #[test]
    fn test_calculator_keeps_trailing_context() {
        let mut s = state();
        type_str(&mut s, "x 6*7= y");
        feed(&mut s, &[keys::LEFT_ARROW, keys::LEFT_ARROW]);
        type_str(&mut s, "?");
        assert_eq!(live(&s), "x 42 y");
        assert_eq!(s.sink().screen().display().row_text(0), "x 42 y");
        assert_eq!(s.line().cursor(), 4);
        assert_eq!(s.sink_mut().screen_mut().position(), 4);
    }

    #[test]
    fn test_calculator_keep_expression_mode() {
        let config = ConsoleConfig {
            splice: CalcSplice::KeepExpression,
            ..ConsoleConfig::default()
        };
        let mut s = ConsoleState::new(MemoryDisplay::new(), CaptureSerial::new(), &config);
        type_str(&mut s, "7/2=?\n");
        assert_eq!(committed(&mut s), "7/2=3.5\n");
        assert_eq!(s.history().get(0).map(HistoryEntry::as_bytes), Some(&b"7/2=3.5"[..]));
    }

    #[test]
    fn test_malformed_trigger_left_alone() {
        let mut s = state();
        type_str(&mut s, "abc=?\n");
        assert_eq!(committed(&mut s), "abc=?\n");
    }

    #[test]
    fn test_rewrite_at_commit_without_sweep() {
        let config = ConsoleConfig {
            sweep_backlog: false,
            ..ConsoleConfig::default()
        };
        let mut s = ConsoleState::new(MemoryDisplay::new(), CaptureSerial::new(), &config);
        type_str(&mut s, "9%4=?");
        assert_eq!(live(&s), "9%4=?");
        type_str(&mut s, "\n");
        assert_eq!(committed(&mut s), "1\n");
    }

    fn keep_expression() -> State {
        let config = ConsoleConfig {
            splice: CalcSplice::KeepExpression,
            ..ConsoleConfig::default()
        };
        ConsoleState::new(MemoryDisplay::new(), CaptureSerial::new(), &config)
    }

    #[test]
    fn test_rewrite_never_takes_the_terminator_cell() {
        let mut s = keep_expression();
        let text = "a ".repeat(61) + "7+3=?";
        type_str(&mut s, &text);
        assert_eq!(s.line().free(), 1);
        assert_eq!(live(&s), text);

        let d = type_str(&mut s, "\n");
        assert!(d.wake);
        assert!(s.line().invariants_hold());
        assert_eq!(s.line().commit_offset(), s.line().edit());
        assert_eq!(committed(&mut s), text + "\n");
    }

    #[test]
    fn test_rewrite_fills_all_but_one_cell() {
        let mut s = keep_expression();
        let text = "a ".repeat(60) + "7+3=?";
        type_str(&mut s, &text);
        assert_eq!(s.line().free(), 2);
        type_str(&mut s, "\n");
        assert!(s.line().invariants_hold());
        assert_eq!(committed(&mut s), "a ".repeat(60) + "7+3=10\n");
    }

    #[test]
    fn test_terminator_commits_full_live_line() {
        let mut s = state();
        for _ in 0..INPUT_BUF {
            assert!(s.line_mut().insert(b'q'));
        }
        assert_eq!(s.line().commit_offset(), 0);
        let d = type_str(&mut s, "\n");
        assert!(d.wake);
        assert_eq!(s.line().commit_offset(), INPUT_BUF);
        assert_eq!(committed(&mut s), "q".repeat(INPUT_BUF));
    }

    #[test]
    fn test_replay_that_fills_ring_commits() {
        let mut s = state();
        feed(&mut s, &[keys::MARK_BEGIN]);
        type_str(&mut s, &"x".repeat(INPUT_BUF / 2));
        let d = feed(&mut s, &[keys::MARK_END]);
        assert!(d.wake);
        assert!(s.line().is_full());
        assert!(s.line().invariants_hold());
        assert_eq!(s.line().commit_offset(), INPUT_BUF);
        assert_eq!(committed(&mut s), "x".repeat(INPUT_BUF));

        type_str(&mut s, "\n");
        assert_eq!(committed(&mut s), "\n");
    }

    #[test]
    fn test_recall_into_nearly_full_ring() {
        let mut s = state();
        type_str(&mut s, "hello world\n");
        type_str(&mut s, &("y".repeat(100) + "\n"));
        assert_eq!(s.line().free(), 15);

        feed(&mut s, &[keys::UP_ARROW]);
        assert_eq!(live(&s), "y".repeat(14));
        assert_eq!(s.line().free(), 1);
        assert!(s.line().invariants_hold());

        type_str(&mut s, "\n");
        assert!(s.line().is_full());
        assert_eq!(
            committed(&mut s),
            "hello world\n".to_string() + &"y".repeat(100) + "\n" + &"y".repeat(14) + "\n"
        );
    }

    #[test]
    fn test_replay_span_with_newline() {
        let mut s = state();
        feed(&mut s, &[keys::MARK_BEGIN]);
        type_str(&mut s, "ab\n");
        feed(&mut s, &[keys::MARK_END]);
        assert_eq!(live(&s), "ab\n");
        assert_eq!(s.line().cursor(), 5);
        assert!(s.line().invariants_hold());
        assert_eq!(s.sink().screen().display().row_text(1), "ab");
        assert_eq!(s.sink_mut().screen_mut().position(), 82);

        type_str(&mut s, "\n");
        assert_eq!(committed(&mut s), "ab\nab\n\n");
    }

    #[test]
    fn test_write_goes_to_both_sinks() {
        let mut s = state();
        s.write_bytes(b"$ ");
        assert_eq!(s.sink().serial().bytes(), b"$ ");
        assert_eq!(s.sink().screen().display().row_text(0), "$");
    }
}

//! In-memory hardware doubles.
//!
//! These stand in for the VGA grid, the UART, the PIC and the process
//! scheduler so the console can be driven from ordinary host tests.
//!
//! ```rust,ignore
//! use kiln_kernel::testutil::{CaptureSerial, MemoryDisplay};
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kiln_hal::{Channel, InterruptController, Scheduler, Serial, TextDisplay};

const COLS: usize = 80;
const ROWS: usize = 25;

/// An 80x25 text grid held in memory.
pub struct MemoryDisplay {
    cells: [u16; COLS * ROWS],
    cursor: usize,
}

impl MemoryDisplay {
    /// A blank grid with the cursor at the origin.
    pub const fn new() -> Self {
        Self {
            cells: [0; COLS * ROWS],
            cursor: 0,
        }
    }

    /// The characters of `row`, with trailing blanks trimmed.
    pub fn row_text(&self, row: usize) -> RowText {
        let mut text = RowText {
            bytes: [b' '; COLS],
            len: 0,
        };
        for col in 0..COLS {
            let ch = self.cells[row * COLS + col] as u8;
            text.bytes[col] = if ch == 0 { b' ' } else { ch };
            if text.bytes[col] != b' ' {
                text.len = col + 1;
            }
        }
        text
    }
}

impl Default for MemoryDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDisplay for MemoryDisplay {
    fn cols(&self) -> usize {
        COLS
    }

    fn rows(&self) -> usize {
        ROWS
    }

    fn read_cell(&self, index: usize) -> u16 {
        self.cells[index]
    }

    fn write_cell(&mut self, index: usize, cell: u16) {
        self.cells[index] = cell;
    }

    fn cursor(&mut self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos;
    }
}

/// One row of a [`MemoryDisplay`], comparable with `&str`.
#[derive(Clone, Copy)]
pub struct RowText {
    bytes: [u8; COLS],
    len: usize,
}

impl RowText {
    /// The row as text.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("<non-ascii>")
    }
}

impl PartialEq<&str> for RowText {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq for RowText {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for RowText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

const CAPTURE: usize = 4096;

/// A serial port that records everything written to it.
///
/// Bytes past the capture limit are dropped.
pub struct CaptureSerial {
    out: [u8; CAPTURE],
    len: usize,
}

impl CaptureSerial {
    /// An empty capture.
    pub const fn new() -> Self {
        Self {
            out: [0; CAPTURE],
            len: 0,
        }
    }

    /// Everything written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.out[..self.len]
    }
}

impl Default for CaptureSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl Serial for CaptureSerial {
    fn write_byte(&mut self, byte: u8) {
        if self.len < CAPTURE {
            self.out[self.len] = byte;
            self.len += 1;
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }
}

/// An interrupt controller that records which lines were unmasked.
#[derive(Debug, Default)]
pub struct MockIrq {
    unmasked: u16,
}

impl MockIrq {
    /// All lines masked.
    pub const fn new() -> Self {
        Self { unmasked: 0 }
    }

    /// Whether `irq` was unmasked.
    pub fn is_unmasked(&self, irq: u8) -> bool {
        self.unmasked & (1 << irq) != 0
    }
}

impl InterruptController for MockIrq {
    fn enable(&mut self) {}

    fn disable(&mut self) {}

    fn enable_irq(&mut self, irq: u8) {
        self.unmasked |= 1 << irq;
    }

    fn end_of_interrupt(&mut self, _irq: u8) {}
}

/// A scheduler for single-threaded tests.
///
/// `sleep` releases the caller's lock, re-enables interrupts and returns
/// straight away, so a reader loops back and re-checks its condition. Tests that need a real
/// blocking reader use a thread-backed scheduler instead.
#[derive(Debug, Default)]
pub struct InlineScheduler {
    killed: AtomicBool,
    sleeps: AtomicUsize,
    wakeups: AtomicUsize,
    dumps: AtomicUsize,
}

impl InlineScheduler {
    /// A live process with no recorded activity.
    pub const fn new() -> Self {
        Self {
            killed: AtomicBool::new(false),
            sleeps: AtomicUsize::new(0),
            wakeups: AtomicUsize::new(0),
            dumps: AtomicUsize::new(0),
        }
    }

    /// Marks the current process as killed.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    /// Times `sleep` was called.
    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Times `wakeup` was called.
    pub fn wakeups(&self) -> usize {
        self.wakeups.load(Ordering::SeqCst)
    }

    /// Times the process table was dumped.
    pub fn dumps(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }
}

impl Scheduler for InlineScheduler {
    fn sleep(&self, _chan: Channel, release: &mut dyn FnMut()) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        release();
        crate::sync::wait_for_interrupt();
    }

    fn wakeup(&self, _chan: Channel) {
        self.wakeups.fetch_add(1, Ordering::SeqCst);
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn dump_processes(&self) {
        self.dumps.fetch_add(1, Ordering::SeqCst);
    }
}

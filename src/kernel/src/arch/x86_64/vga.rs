//! VGA text mode driver for x86_64.
//!
//! Exposes the 80x25 buffer at 0xB8000 and the CRT controller's cursor
//! register as a [`TextDisplay`].

use core::ptr;

use kiln_hal::TextDisplay;
use x86_64::instructions::port::Port;

/// VGA text buffer memory-mapped I/O address.
const VGA_BUFFER_ADDR: usize = 0xB8000;

/// Number of rows in VGA text mode.
const BUFFER_HEIGHT: usize = 25;

/// Number of columns in VGA text mode.
const BUFFER_WIDTH: usize = 80;

/// CRT controller index register.
const CRT_INDEX: u16 = 0x3D4;

/// CRT controller data register.
const CRT_DATA: u16 = 0x3D5;

/// Cursor location, high byte.
const CURSOR_HIGH: u8 = 14;

/// Cursor location, low byte.
const CURSOR_LOW: u8 = 15;

/// The VGA text buffer and its hardware cursor.
pub struct VgaText {
    /// SAFETY: valid for the kernel's lifetime; the buffer at 0xB8000 is
    /// always mapped in x86 protected and long mode.
    cells: *mut u16,
    index: Port<u8>,
    data: Port<u8>,
}

// SAFETY: VgaText only touches the buffer through volatile operations and
// the console lock serializes every access.
unsafe impl Send for VgaText {}

impl VgaText {
    /// Binds to the legacy VGA buffer.
    ///
    /// # Safety
    ///
    /// Only one `VgaText` may exist; the caller must be running with the
    /// buffer identity-mapped and I/O privilege for the CRT ports.
    pub unsafe fn new() -> Self {
        Self {
            cells: VGA_BUFFER_ADDR as *mut u16,
            index: Port::new(CRT_INDEX),
            data: Port::new(CRT_DATA),
        }
    }

    fn crt_read(&mut self, reg: u8) -> u8 {
        // SAFETY: CRT index/data are the standard cursor registers.
        unsafe {
            self.index.write(reg);
            self.data.read()
        }
    }

    fn crt_write(&mut self, reg: u8, value: u8) {
        // SAFETY: see `crt_read`.
        unsafe {
            self.index.write(reg);
            self.data.write(value);
        }
    }
}

impl TextDisplay for VgaText {
    fn cols(&self) -> usize {
        BUFFER_WIDTH
    }

    fn rows(&self) -> usize {
        BUFFER_HEIGHT
    }

    fn read_cell(&self, index: usize) -> u16 {
        assert!(index < BUFFER_WIDTH * BUFFER_HEIGHT, "cell out of range");
        // SAFETY: bounds checked above; volatile because the buffer is MMIO.
        unsafe { ptr::read_volatile(self.cells.add(index)) }
    }

    fn write_cell(&mut self, index: usize, cell: u16) {
        assert!(index < BUFFER_WIDTH * BUFFER_HEIGHT, "cell out of range");
        // SAFETY: as for `read_cell`.
        unsafe { ptr::write_volatile(self.cells.add(index), cell) }
    }

    fn cursor(&mut self) -> usize {
        let high = usize::from(self.crt_read(CURSOR_HIGH));
        let low = usize::from(self.crt_read(CURSOR_LOW));
        high << 8 | low
    }

    fn set_cursor(&mut self, pos: usize) {
        self.crt_write(CURSOR_HIGH, (pos >> 8) as u8);
        self.crt_write(CURSOR_LOW, pos as u8);
    }
}

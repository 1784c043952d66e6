//! Screen-side rendering of line edits.
//!
//! The manager keeps no position of its own: every event starts by reading
//! the hardware cursor back and ends by programming it again, so the grid,
//! the register and the line buffer can never disagree for longer than one
//! event.

use kiln_hal::TextDisplay;

use crate::config::{ColorCode, ScreenGeometry};

/// One logical edit, as seen by the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    /// Draw a byte at the cursor, pushing the tail right.
    Char(u8),
    /// Move to the start of the next row.
    Newline,
    /// Erase the cell before the cursor, pulling the tail left.
    Backspace,
    /// Move the cursor one cell left.
    Left,
    /// Move the cursor one cell right.
    Right,
}

/// Owns the text grid and its cursor register.
pub struct DisplayCursorManager<D> {
    display: D,
    geometry: ScreenGeometry,
    attr: u16,
}

impl<D: TextDisplay> DisplayCursorManager<D> {
    /// Wraps a display.
    ///
    /// `geometry` is clamped to the grid the display reports, so a page
    /// configured larger than the hardware never indexes past it.
    pub fn new(display: D, geometry: ScreenGeometry, color: ColorCode) -> Self {
        let geometry = ScreenGeometry {
            cols: geometry.cols.min(display.cols()),
            rows: geometry.rows.min(display.rows()),
        };
        Self {
            display,
            geometry,
            attr: color.cell_bits(),
        }
    }

    /// The page size in use.
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// The underlying display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Current cursor position, read from the hardware register.
    pub fn position(&mut self) -> usize {
        self.display.cursor()
    }

    fn blank(&self) -> u16 {
        u16::from(b' ') | self.attr
    }

    /// Applies one event.
    ///
    /// `tail` is the number of line bytes after the cursor once the buffer
    /// mutation behind this event is done; those cells move with the edit.
    ///
    /// # Panics
    ///
    /// Panics if the resulting position falls outside the grid. That can only
    /// happen when the cursor register or the line buffer is corrupt.
    pub fn render(&mut self, event: RenderEvent, tail: usize) {
        let cols = self.geometry.cols;
        let cells = self.geometry.cells();
        let mut pos = self.display.cursor();

        match event {
            RenderEvent::Newline => pos += cols - pos % cols,
            RenderEvent::Backspace => {
                if pos > 0 {
                    let run = tail.min(cells.saturating_sub(pos));
                    for i in 0..run {
                        let cell = self.display.read_cell(pos + i);
                        self.display.write_cell(pos - 1 + i, cell);
                    }
                    pos -= 1;
                    let blank = self.blank();
                    self.display.write_cell(pos + run, blank);
                }
            }
            RenderEvent::Left => pos = pos.saturating_sub(1),
            RenderEvent::Right => {
                if pos + 1 < cells {
                    pos += 1;
                }
            }
            RenderEvent::Char(c) => {
                if pos < cells {
                    let run = tail.min(cells - 1 - pos);
                    for i in (0..run).rev() {
                        let cell = self.display.read_cell(pos + i);
                        self.display.write_cell(pos + 1 + i, cell);
                    }
                    self.display.write_cell(pos, u16::from(c) | self.attr);
                }
                pos += 1;
            }
        }

        if pos > cells {
            panic!("pos under/overflow");
        }

        if pos / cols >= self.geometry.rows - 1 {
            self.scroll_up();
            pos -= cols;
            let blank = self.blank();
            for i in pos..(self.geometry.rows - 1) * cols {
                self.display.write_cell(i, blank);
            }
        }

        self.display.set_cursor(pos);
        let under = self.display.read_cell(pos);
        self.display.write_cell(pos, under | self.attr);
    }

    fn scroll_up(&mut self) {
        let cols = self.geometry.cols;
        for i in 0..(self.geometry.rows - 2) * cols {
            let cell = self.display.read_cell(i + cols);
            self.display.write_cell(i, cell);
        }
    }

    /// Blanks the whole grid and homes the cursor.
    pub fn clear(&mut self) {
        let blank = self.blank();
        for i in 0..self.geometry.cells() {
            self.display.write_cell(i, blank);
        }
        self.display.set_cursor(0);
    }
}

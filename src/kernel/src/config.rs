//! Console configuration.
//!
//! Sizes that shape data structures are compile-time constants; everything
//! else lives in [`ConsoleConfig`], handed to [`crate::console::Console::new`].

use kiln_common::OutputTargets;

/// Capacity of the console input ring, in bytes.
pub const INPUT_BUF: usize = 128;

/// Number of committed lines kept for recall.
pub const MAX_HISTORY: usize = 10;

/// Major number the console registers under in the device table.
pub const CONSOLE_MAJOR: usize = 1;

/// Legacy PIC line of the PS/2 keyboard.
pub const IRQ_KEYBOARD: u8 = 1;

/// Legacy PIC line of COM1.
pub const IRQ_COM1: u8 = 4;

/// VGA color codes.
///
/// Standard 16-color VGA palette for text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    /// Black color.
    Black = 0,
    /// Blue color.
    Blue = 1,
    /// Green color.
    Green = 2,
    /// Cyan color.
    Cyan = 3,
    /// Red color.
    Red = 4,
    /// Magenta color.
    Magenta = 5,
    /// Brown color.
    Brown = 6,
    /// Light gray color.
    LightGray = 7,
    /// Dark gray color.
    DarkGray = 8,
    /// Light blue color.
    LightBlue = 9,
    /// Light green color.
    LightGreen = 10,
    /// Light cyan color.
    LightCyan = 11,
    /// Light red color.
    LightRed = 12,
    /// Pink color.
    Pink = 13,
    /// Yellow color.
    Yellow = 14,
    /// White color.
    White = 15,
}

/// Combined foreground and background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    /// Creates a new color code from foreground and background colors.
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    /// The attribute shifted into the high byte of a text cell.
    pub const fn cell_bits(self) -> u16 {
        (self.0 as u16) << 8
    }
}

/// How a recognised `a op b=?` trigger is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalcSplice {
    /// Replace the whole expression with its value: `7+3=?` becomes `10`.
    #[default]
    ReplaceExpression,
    /// Replace only the `?`: `7+3=?` becomes `7+3=10`.
    KeepExpression,
}

/// Text-mode screen dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Characters per row.
    pub cols: usize,
    /// Rows on the page. The last row is kept blank; output scrolls before
    /// reaching it.
    pub rows: usize,
}

impl ScreenGeometry {
    /// Standard 80x25 colour text mode.
    pub const VGA_TEXT: ScreenGeometry = ScreenGeometry { cols: 80, rows: 25 };

    /// Total number of cells.
    pub const fn cells(&self) -> usize {
        self.cols * self.rows
    }
}

/// Runtime console settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Screen size.
    pub geometry: ScreenGeometry,
    /// Attribute used for every character the console draws.
    pub color: ColorCode,
    /// Which sinks receive rendered output.
    pub targets: OutputTargets,
    /// Calculator rewrite policy.
    pub splice: CalcSplice,
    /// Re-scan the live line for `?` triggers after every input batch,
    /// not only when the line is committed.
    pub sweep_backlog: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            geometry: ScreenGeometry::VGA_TEXT,
            color: ColorCode::new(Color::LightGray, Color::Black),
            targets: OutputTargets::default(),
            splice: CalcSplice::default(),
            sweep_backlog: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attribute_is_grey_on_black() {
        let config = ConsoleConfig::default();
        assert_eq!(config.color.cell_bits(), 0x0700);
        assert_eq!(config.geometry.cells(), 2000);
        assert!(config.targets.contains(OutputTargets::DISPLAY | OutputTargets::SERIAL));
    }
}

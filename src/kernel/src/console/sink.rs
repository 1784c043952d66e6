//! Fan-out of rendered console output.

use kiln_common::OutputTargets;
use kiln_hal::{Serial, TextDisplay};

use super::display::{DisplayCursorManager, RenderEvent};
use crate::fatal;

/// Sends every rendered event to the screen and the serial mirror.
pub struct OutputSink<D, S> {
    screen: DisplayCursorManager<D>,
    serial: S,
    targets: OutputTargets,
}

impl<D: TextDisplay, S: Serial> OutputSink<D, S> {
    /// Creates a sink over both outputs.
    pub fn new(screen: DisplayCursorManager<D>, serial: S, targets: OutputTargets) -> Self {
        Self {
            screen,
            serial,
            targets,
        }
    }

    /// The screen side.
    pub fn screen(&self) -> &DisplayCursorManager<D> {
        &self.screen
    }

    /// Mutable access to the screen side.
    pub fn screen_mut(&mut self) -> &mut DisplayCursorManager<D> {
        &mut self.screen
    }

    /// The serial side.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Emits one event.
    ///
    /// Once the kernel has panicked, any caller other than the panicking
    /// one freezes here so the report is not interleaved.
    pub fn put(&mut self, event: RenderEvent, tail: usize) {
        if fatal::panicked() {
            fatal::freeze();
        }

        if self.targets.contains(OutputTargets::SERIAL) {
            match event {
                RenderEvent::Char(c) => self.serial.write_byte(c),
                RenderEvent::Newline => self.serial.write_byte(b'\n'),
                RenderEvent::Backspace => self.write_serial(b"\x08 \x08"),
                RenderEvent::Left => self.write_serial(b"\x1b[D"),
                RenderEvent::Right => self.write_serial(b"\x1b[C"),
            }
        }

        if self.targets.contains(OutputTargets::DISPLAY) {
            self.screen.render(event, tail);
        }
    }

    /// Emits a raw output byte (console writes and kernel messages).
    pub fn put_byte(&mut self, byte: u8, tail: usize) {
        let event = match byte {
            b'\n' => RenderEvent::Newline,
            b => RenderEvent::Char(b),
        };
        self.put(event, tail);
    }

    fn write_serial(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.serial.write_byte(b);
        }
    }
}

//! PS/2 keyboard decoding.
//!
//! Scancodes are decoded with `pc-keyboard` into the console's symbol codes:
//! printable keys as their byte, Ctrl+letter as the control byte, arrows as
//! the dedicated arrow codes.

use kiln_common::keys;
use pc_keyboard::{layouts, DecodedKey, HandleControl, KeyCode, Keyboard, ScancodeSet1};
use spin::Mutex;
use x86_64::instructions::port::Port;

/// Keyboard controller status port.
const KBD_STATUS: u16 = 0x64;

/// Keyboard controller data port.
const KBD_DATA: u16 = 0x60;

/// Status bit: output buffer holds a byte.
const KBD_DATA_IN_BUFFER: u8 = 0x01;

/// Stateful scancode decoder.
pub struct Decoder {
    keyboard: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl Decoder {
    /// A decoder with no modifiers held.
    pub const fn new() -> Self {
        Self {
            keyboard: Keyboard::new(
                ScancodeSet1::new(),
                layouts::Us104Key,
                HandleControl::MapLettersToUnicode,
            ),
        }
    }

    /// Feeds one scancode byte.
    ///
    /// Returns the console code of a completed key press, or 0 when the
    /// byte was a prefix, a release, or a key the console does not use.
    pub fn decode(&mut self, scancode: u8) -> i32 {
        let Ok(Some(event)) = self.keyboard.add_byte(scancode) else {
            return 0;
        };
        match self.keyboard.process_keyevent(event) {
            Some(DecodedKey::Unicode(c)) if c.is_ascii() => c as i32,
            Some(DecodedKey::RawKey(KeyCode::ArrowUp)) => keys::UP_ARROW,
            Some(DecodedKey::RawKey(KeyCode::ArrowDown)) => keys::DOWN_ARROW,
            Some(DecodedKey::RawKey(KeyCode::ArrowLeft)) => keys::LEFT_ARROW,
            Some(DecodedKey::RawKey(KeyCode::ArrowRight)) => keys::RIGHT_ARROW,
            _ => 0,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Global keyboard decoder instance.
static KEYBOARD: Mutex<Decoder> = Mutex::new(Decoder::new());

/// Console producer for the keyboard interrupt.
///
/// Returns -1 once the controller has no more bytes.
pub fn kbd_getc() -> i32 {
    let mut status: Port<u8> = Port::new(KBD_STATUS);
    let mut data: Port<u8> = Port::new(KBD_DATA);
    // SAFETY: standard 8042 status and data ports; data is read only when
    // the status register says a byte is waiting.
    let scancode = unsafe {
        if status.read() & KBD_DATA_IN_BUFFER == 0 {
            return -1;
        }
        data.read()
    };
    KEYBOARD.lock().decode(scancode)
}

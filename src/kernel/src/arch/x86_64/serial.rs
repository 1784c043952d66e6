//! Serial port driver for x86_64.
//!
//! COM1 (0x3F8) carries the console mirror and the kernel log, and its
//! receive interrupt is a second console input source.

use core::fmt::{self, Write};

use kiln_hal::Serial;
use spin::Mutex;
use uart_16550::SerialPort;
use x86_64::instructions::interrupts;
use x86_64::instructions::port::Port;

/// COM1 I/O port address.
const COM1_PORT: u16 = 0x3F8;

/// Line status register.
const COM1_LSR: u16 = COM1_PORT + 5;

/// Line status: received data ready.
const LSR_DATA_READY: u8 = 0x01;

/// Global serial port instance, lazily initialized.
///
/// Uses a spinlock for safe concurrent access from multiple contexts,
/// including interrupt handlers.
pub static SERIAL: spin::Once<Mutex<SerialPort>> = spin::Once::new();

/// Initializes the global serial port.
///
/// This function is idempotent - calling it multiple times has no effect
/// after the first successful initialization.
pub fn init() {
    SERIAL.call_once(|| {
        // SAFETY: COM1_PORT (0x3F8) is a well-known x86 serial port address.
        // We're running in kernel mode with full I/O port access.
        // The uart_16550 crate handles the port initialization sequence correctly,
        // including enabling the receive interrupt.
        let mut serial = unsafe { SerialPort::new(COM1_PORT) };
        serial.init();
        Mutex::new(serial)
    });
}

/// Runs `f` on the port with interrupts masked.
///
/// The console's interrupt handlers write to this port, so holding its lock
/// with interrupts enabled could deadlock.
pub fn with_port<R>(f: impl FnOnce(&mut SerialPort) -> R) -> R {
    init();
    interrupts::without_interrupts(|| match SERIAL.get() {
        Some(serial) => f(&mut serial.lock()),
        None => unreachable!("serial initialized above"),
    })
}

/// Prints to the serial port without a newline.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::serial::_print(format_args!($($arg)*))
    };
}

/// Prints to the serial port with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    with_port(|port| {
        let _ = port.write_fmt(args);
    });
}

/// COM1 as the console's serial mirror and input source.
pub struct ComPort;

impl Serial for ComPort {
    fn write_byte(&mut self, byte: u8) {
        // Raw: the console already expands backspace itself.
        with_port(|port| port.send_raw(byte));
    }

    fn read_byte(&mut self) -> Option<u8> {
        with_port(|_| {
            let mut lsr: Port<u8> = Port::new(COM1_LSR);
            let mut data: Port<u8> = Port::new(COM1_PORT);
            // SAFETY: LSR and RBR of an initialized 16550; reading RBR only
            // after data-ready keeps the FIFO consistent.
            unsafe {
                if lsr.read() & LSR_DATA_READY == 0 {
                    None
                } else {
                    Some(data.read())
                }
            }
        })
    }
}

/// Console producer for the COM1 receive interrupt.
///
/// Returns the next received byte, or -1 once the receive buffer is empty.
pub fn uart_getc() -> i32 {
    ComPort.read_byte().map_or(-1, i32::from)
}

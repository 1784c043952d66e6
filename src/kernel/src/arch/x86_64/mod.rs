//! x86_64 architecture support.
//!
//! VGA text mode, the COM1 UART, the 8259 PICs and the PS/2 keyboard, each
//! wrapped in the HAL trait the console consumes.

pub mod keyboard;
pub mod pic;
pub mod serial;
pub mod vga;

#[cfg(feature = "bare-metal")]
pub mod backtrace;
#[cfg(feature = "bare-metal")]
pub mod interrupts;

pub use pic::Pic;
pub use serial::{ComPort, SERIAL};
pub use vga::VgaText;

/// The console as wired on x86_64.
#[cfg(feature = "bare-metal")]
pub type KernelConsole = crate::console::Console<VgaText, ComPort, crate::proc::HaltScheduler>;

/// The boot console, reachable from interrupt handlers.
#[cfg(feature = "bare-metal")]
pub static CONSOLE: spin::Once<KernelConsole> = spin::Once::new();

/// Halts the CPU until the next interrupt.
///
/// Used in idle loops to reduce power consumption.
#[inline]
pub fn hlt() {
    x86_64::instructions::hlt();
}

/// Halts the CPU in an infinite loop.
///
/// Used after unrecoverable errors (panics).
pub fn halt_loop() -> ! {
    loop {
        hlt();
    }
}

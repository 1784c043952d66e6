//! KilnOS Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details,
//! plus the narrow scheduler seam the console needs to block and wake readers.

#![no_std]

/// Trait for a serial port or similar character-based communication channel.
pub trait Serial {
    /// Writes a single byte to the serial port.
    fn write_byte(&mut self, byte: u8);
    /// Reads a single byte from the serial port, if available.
    fn read_byte(&mut self) -> Option<u8>;
}

/// A memory-mapped text grid with a hardware cursor register.
///
/// Cells are addressed linearly (`row * cols + col`). Each cell holds the
/// character in the low byte and the colour attribute in the high byte.
pub trait TextDisplay {
    /// Number of character columns.
    fn cols(&self) -> usize;
    /// Number of character rows.
    fn rows(&self) -> usize;
    /// Reads the cell at `index`.
    fn read_cell(&self, index: usize) -> u16;
    /// Writes the cell at `index`.
    fn write_cell(&mut self, index: usize, cell: u16);
    /// Reads back the hardware cursor position.
    fn cursor(&mut self) -> usize;
    /// Programs the hardware cursor position.
    fn set_cursor(&mut self, pos: usize);
}

/// Trait for controlling interrupts.
pub trait InterruptController {
    /// Globally enables interrupts.
    fn enable(&mut self);
    /// Globally disables interrupts.
    fn disable(&mut self);
    /// Unmasks a single IRQ line.
    fn enable_irq(&mut self, irq: u8);
    /// Signals the end of an interrupt to the controller.
    fn end_of_interrupt(&mut self, irq: u8);
}

/// Identifier a sleeping process waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(pub usize);

/// The process-management operations the console depends on.
///
/// `sleep` must register the current process as waiting on `chan` before it
/// calls `release`, so a `wakeup` issued right after the caller's lock is
/// dropped still reaches the sleeper.
pub trait Scheduler {
    /// Suspends the current process on `chan`.
    ///
    /// `release` drops the caller's lock; it is invoked exactly once, after
    /// the process has been registered as a sleeper. It may leave local
    /// interrupts masked, and the scheduler re-enables them as it suspends.
    fn sleep(&self, chan: Channel, release: &mut dyn FnMut());
    /// Wakes every process sleeping on `chan`.
    fn wakeup(&self, chan: Channel);
    /// Whether the current process has been marked for termination.
    fn killed(&self) -> bool;
    /// Prints the process table to the console.
    fn dump_processes(&self);
}

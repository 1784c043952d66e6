//! `log` backend for the kernel.
//!
//! Records go straight to the COM1 port, never through the console: the
//! console logs from inside its own lock.

use core::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Logger writing one line per record to the serial port.
pub struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

/// Installs the serial logger at `level`.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Formats a record as `[LEVEL target] message`.
pub fn write_record<W: fmt::Write>(out: &mut W, record: &Record<'_>) -> fmt::Result {
    let tag = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    writeln!(out, "[{} {}] {}", tag, record.target(), record.args())
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        #[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
        crate::arch::x86_64::serial::with_port(|port| {
            let _ = write_record(port, record);
        });
    }

    fn flush(&self) {}
}

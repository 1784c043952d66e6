//! Boot logging with status indicators.
//!
//! Provides Linux-style boot messages on the console.

pub mod banner;

use core::fmt;

use crate::kprint;

/// Boot status indicators.
#[derive(Debug, Clone, Copy)]
pub enum Status {
    /// Success - `[ OK ]`
    Ok,
    /// Failure - `[FAIL]`
    Fail,
    /// Warning - `[WARN]`
    Warn,
    /// Informational - `[INFO]`
    Info,
}

impl Status {
    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[ OK ]",
            Status::Fail => "[FAIL]",
            Status::Warn => "[WARN]",
            Status::Info => "[INFO]",
        }
    }
}

/// A boot stage line, printable with `{}`.
///
/// Format: `[ OK ] Message text`
pub struct StageLine<'a> {
    status: Status,
    message: &'a str,
}

impl fmt::Display for StageLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.status.tag(), self.message)
    }
}

/// Log a boot stage with status.
pub fn log(status: Status, message: &str) {
    kprint!("{}", StageLine { status, message });
    match status {
        Status::Fail => log::error!("boot: {}", message),
        Status::Warn => log::warn!("boot: {}", message),
        Status::Ok | Status::Info => log::info!("boot: {}", message),
    }
}

/// Log an indented detail line (for sub-items).
///
/// Format: `       Detail text` (aligned with message after status)
pub fn log_detail(message: &str) {
    kprint!("       {}\n", message);
}

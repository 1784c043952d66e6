//! Kernel panic reporting.
//!
//! The panic handler prints a report through the console with locking
//! disabled, raises the panicked flag and parks the CPU. Any other path that
//! tries to produce output after that point parks as well.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

/// Number of return addresses included in a panic report.
pub const TRACE_DEPTH: usize = 10;

static PANICKED: AtomicBool = AtomicBool::new(false);

/// Whether the kernel has panicked.
pub fn panicked() -> bool {
    PANICKED.load(Ordering::Acquire)
}

/// Raises the panicked flag. Output attempted after this freezes.
pub fn mark_panicked() {
    PANICKED.store(true, Ordering::Release);
}

/// Parks the current CPU forever.
pub fn freeze() -> ! {
    #[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
    {
        ::x86_64::instructions::interrupts::disable();
        crate::arch::x86_64::halt_loop()
    }
    #[cfg(not(all(target_arch = "x86_64", feature = "bare-metal")))]
    loop {
        core::hint::spin_loop();
    }
}

/// Writes the panic report.
///
/// ```text
/// lapicid 0: panic: <message>
///  1053c4 10563f 0 ...
/// ```
///
/// Missing frames are printed as `0` so the trace is always
/// [`TRACE_DEPTH`] entries wide.
pub fn write_report<W: fmt::Write>(
    out: &mut W,
    cpu: u32,
    message: &dyn fmt::Display,
    pcs: &[usize; TRACE_DEPTH],
) -> fmt::Result {
    writeln!(out, "lapicid {}: panic: {}", cpu, message)?;
    for pc in pcs {
        write!(out, " {:x}", pc)?;
    }
    writeln!(out)
}

/// A panic report, printable with `{}`.
pub struct Report<'a> {
    /// Local APIC id of the panicking CPU.
    pub cpu: u32,
    /// The panic message.
    pub message: &'a dyn fmt::Display,
    /// Return addresses, innermost first.
    pub pcs: [usize; TRACE_DEPTH],
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.cpu, self.message, &self.pcs)
    }
}

/// The kernel panic path: report, raise the flag, park.
#[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
pub fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
    use crate::arch::x86_64::backtrace;

    ::x86_64::instructions::interrupts::disable();
    let report = Report {
        cpu: backtrace::lapic_id(),
        message: &info.message(),
        pcs: backtrace::caller_pcs(),
    };
    match crate::console::printer() {
        Some(printer) => {
            printer.disable_locking();
            printer.print(format_args!("{}", report));
        }
        None => crate::serial_print!("{}", report),
    }
    mark_panicked();
    freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_layout() {
        let mut out = std::string::String::new();
        let mut pcs = [0usize; TRACE_DEPTH];
        pcs[0] = 0x1053c4;
        pcs[1] = 0x10563f;
        write_report(&mut out, 3, &"pos under/overflow", &pcs).unwrap();
        assert_eq!(
            out,
            "lapicid 3: panic: pos under/overflow\n 1053c4 10563f 0 0 0 0 0 0 0 0\n"
        );
    }

    #[test]
    fn test_report_display_matches_writer() {
        let report = Report {
            cpu: 0,
            message: &"null fmt",
            pcs: [0x10; TRACE_DEPTH],
        };
        let text = std::format!("{}", report);
        assert!(text.starts_with("lapicid 0: panic: null fmt\n 10 10"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_flag_starts_clear() {
        assert!(!panicked());
    }
}

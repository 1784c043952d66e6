//! Locking and sleeping for code shared with interrupt handlers.
//!
//! - [`IrqMutex<T>`]: spin lock that keeps interrupts off while held
//! - [`sleep_releasing`]: hands a held guard to the scheduler's sleep
//! - [`wait_for_interrupt`]: re-enables interrupts and idles in one step

mod irq_mutex;
mod sleep;

pub use irq_mutex::{wait_for_interrupt, IrqMutex, IrqMutexGuard};
#[cfg(all(test, not(all(target_arch = "x86_64", feature = "bare-metal"))))]
pub(crate) use irq_mutex::interrupts_enabled;
pub use sleep::sleep_releasing;

//! Process layer for the single boot process.
//!
//! The kernel runs one process, `init`, so sleeping means idling the CPU
//! until an interrupt arrives and waking is implicit.

use core::sync::atomic::{AtomicBool, Ordering};

use kiln_hal::{Channel, Scheduler};
use log::trace;

use crate::kprintln;
use crate::sync;

/// Scheduler for a uniprocessor kernel with only the boot process.
#[derive(Debug, Default)]
pub struct HaltScheduler {
    killed: AtomicBool,
}

impl HaltScheduler {
    /// The boot process, alive.
    pub const fn new() -> Self {
        Self {
            killed: AtomicBool::new(false),
        }
    }

    /// Marks the boot process as killed.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }
}

impl Scheduler for HaltScheduler {
    fn sleep(&self, chan: Channel, release: &mut dyn FnMut()) {
        trace!("proc: sleep on {:#x}", chan.0);
        // The lock goes with interrupts still masked. Any input interrupt
        // raised since then is pending and ends the halt straight away.
        release();
        sync::wait_for_interrupt();
    }

    fn wakeup(&self, chan: Channel) {
        trace!("proc: wakeup {:#x}", chan.0);
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn dump_processes(&self) {
        let state = if self.killed() { "killed" } else { "sleep " };
        kprintln!();
        kprintln!("1 {} init", state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_releases_and_returns() {
        let sched = HaltScheduler::new();
        let mut released = false;
        sched.sleep(Channel(7), &mut || released = true);
        assert!(released);
    }

    #[test]
    fn test_sleep_reenables_interrupts_after_release() {
        let sched = HaltScheduler::new();
        let lock = sync::IrqMutex::new(());
        sync::sleep_releasing(&sched, Channel(9), lock.lock());
        assert!(!lock.is_locked());
        assert!(sync::interrupts_enabled());
    }

    #[test]
    fn test_kill_flag() {
        let sched = HaltScheduler::new();
        assert!(!sched.killed());
        sched.kill();
        assert!(sched.killed());
    }
}

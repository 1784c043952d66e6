//! Sleeping with a lock held.

use kiln_hal::{Channel, Scheduler};

use super::IrqMutexGuard;

/// Sleeps on `chan`, releasing `guard` once the scheduler has registered the
/// sleeper.
///
/// The lock is dropped with interrupts still masked; the scheduler turns them
/// back on as it suspends, so a wakeup cannot slip in between. The caller
/// reacquires its lock after this returns and must re-check the condition it
/// was waiting for; wakeups may be spurious.
pub fn sleep_releasing<K, T>(sched: &K, chan: Channel, guard: IrqMutexGuard<'_, T>)
where
    K: Scheduler + ?Sized,
{
    let mut guard = Some(guard);
    sched.sleep(chan, &mut || {
        if let Some(guard) = guard.take() {
            guard.unlock_masked();
        }
    });
    // Still held if the scheduler never called `release`.
    drop(guard);
}

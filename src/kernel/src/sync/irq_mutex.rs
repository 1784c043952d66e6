//! Interrupt-safe spin lock.
//!
//! State touched from an interrupt handler must never be locked with
//! interrupts enabled, or the handler can spin forever on a lock its own CPU
//! holds. [`IrqMutex`] masks interrupts for the lifetime of the guard and
//! restores the previous state on drop. Hosted builds have no interrupts to
//! mask and it degrades to a plain spin lock.

use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

/// A spin lock that disables interrupts while held.
pub struct IrqMutex<T> {
    inner: Mutex<T>,
}

/// Guard returned by [`IrqMutex::lock`].
pub struct IrqMutexGuard<'a, T> {
    guard: Option<MutexGuard<'a, T>>,
    irq_were_enabled: bool,
}

impl<T> IrqMutex<T> {
    /// Creates an unlocked mutex.
    pub const fn new(data: T) -> Self {
        Self {
            inner: Mutex::new(data),
        }
    }

    /// Masks interrupts and spins until the lock is acquired.
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let irq_were_enabled = interrupts_off();
        IrqMutexGuard {
            guard: Some(self.inner.lock()),
            irq_were_enabled,
        }
    }

    /// Whether some context holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Releases the lock regardless of who holds it.
    ///
    /// # Safety
    ///
    /// The holder must never touch the data again. Only the panic path uses
    /// this, after every other CPU has been told to freeze.
    pub unsafe fn force_unlock(&self) {
        // SAFETY: forwarded to the caller.
        unsafe { self.inner.force_unlock() }
    }
}

impl<T> IrqMutexGuard<'_, T> {
    /// Releases the lock but leaves interrupts masked.
    ///
    /// Returns whether interrupts were enabled when the lock was taken. The
    /// caller turns them back on, usually through [`wait_for_interrupt`].
    pub fn unlock_masked(mut self) -> bool {
        drop(self.guard.take());
        core::mem::replace(&mut self.irq_were_enabled, false)
    }
}

impl<T> Deref for IrqMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // The guard is only taken out in `drop`.
        self.guard.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for IrqMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.guard.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for IrqMutexGuard<'_, T> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if self.irq_were_enabled {
            interrupts_on();
        }
    }
}

/// Enables interrupts and idles until one arrives.
///
/// On x86_64 `sti; hlt` runs as one step, so an interrupt that became
/// pending while masked ends the halt instead of being taken just before it.
pub fn wait_for_interrupt() {
    #[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
    x86_64::instructions::interrupts::enable_and_hlt();

    #[cfg(not(all(target_arch = "x86_64", feature = "bare-metal")))]
    {
        interrupts_on();
        core::hint::spin_loop();
    }
}

#[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
fn interrupts_off() -> bool {
    use x86_64::instructions::interrupts;
    let enabled = interrupts::are_enabled();
    interrupts::disable();
    enabled
}

#[cfg(all(target_arch = "x86_64", feature = "bare-metal"))]
fn interrupts_on() {
    x86_64::instructions::interrupts::enable();
}

#[cfg(not(any(test, all(target_arch = "x86_64", feature = "bare-metal"))))]
fn interrupts_off() -> bool {
    false
}

#[cfg(not(any(test, all(target_arch = "x86_64", feature = "bare-metal"))))]
fn interrupts_on() {}

// Unit tests model the interrupt flag per thread.
#[cfg(all(test, not(all(target_arch = "x86_64", feature = "bare-metal"))))]
std::thread_local! {
    static IF_FLAG: core::cell::Cell<bool> = core::cell::Cell::new(true);
}

#[cfg(all(test, not(all(target_arch = "x86_64", feature = "bare-metal"))))]
fn interrupts_off() -> bool {
    IF_FLAG.with(|flag| flag.replace(false))
}

#[cfg(all(test, not(all(target_arch = "x86_64", feature = "bare-metal"))))]
fn interrupts_on() {
    IF_FLAG.with(|flag| flag.set(true));
}

#[cfg(all(test, not(all(target_arch = "x86_64", feature = "bare-metal"))))]
pub(crate) fn interrupts_enabled() -> bool {
    IF_FLAG.with(|flag| flag.get())
}

//! The kernel console.
//!
//! One [`Console`] owns the text screen, the serial mirror and the line
//! editor behind a single interrupt-safe lock. Keyboard and UART interrupt
//! handlers feed it through [`Console::intr`]; processes read committed
//! lines and write output through the [`CharDevice`] implementation in
//! [`file`].
//!
//! # Modules
//!
//! - `line`: input ring with read/commit/cursor/edit offsets
//! - `display`: cursor-register-driven screen rendering
//! - `sink`: screen and serial fan-out
//! - `history`, `clipboard`: recall ring and copy mark
//! - `calc`: `a op b=?` triggers
//! - `engine`: per-symbol editing logic
//! - `file`: blocking read and write

pub mod calc;
pub mod clipboard;
pub mod display;
pub mod engine;
pub mod file;
pub mod history;
pub mod line;
pub mod sink;

pub use engine::{ConsoleState, Deferred};

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use kiln_common::{ConsoleError, InputSymbol};
use kiln_hal::{Channel, InterruptController, Scheduler, Serial, TextDisplay};
use log::info;
use spin::Once;

use crate::config::{ConsoleConfig, CONSOLE_MAJOR, IRQ_KEYBOARD};
use crate::dev::{CharDevice, DeviceTable};
use crate::sync::{IrqMutex, IrqMutexGuard};

/// The console device.
pub struct Console<D, S, K> {
    state: IrqMutex<ConsoleState<D, S>>,
    sched: K,
    locking: AtomicBool,
}

impl<D: TextDisplay, S: Serial, K: Scheduler> Console<D, S, K> {
    /// Builds a console over a display, a serial port and the scheduler.
    pub fn new(display: D, serial: S, sched: K, config: &ConsoleConfig) -> Self {
        Self {
            state: IrqMutex::new(ConsoleState::new(display, serial, config)),
            sched,
            locking: AtomicBool::new(true),
        }
    }

    /// The scheduler readers sleep on.
    pub fn scheduler(&self) -> &K {
        &self.sched
    }

    /// The channel readers wait on for committed input.
    pub fn input_channel(&self) -> Channel {
        Channel(&self.state as *const _ as usize)
    }

    pub(crate) fn lock(&self) -> IrqMutexGuard<'_, ConsoleState<D, S>> {
        if !self.locking.load(Ordering::Acquire) && self.state.is_locked() {
            // SAFETY: locking is only switched off on the panic path, after
            // which the previous holder freezes on its next output.
            unsafe { self.state.force_unlock() };
        }
        self.state.lock()
    }

    /// Drains the producer `getc` and applies every symbol it yields.
    ///
    /// `getc` returns a negative value when it has nothing more. Readers are
    /// woken and the process dump runs only after the lock is dropped.
    pub fn intr(&self, mut getc: impl FnMut() -> i32) {
        let mut deferred = Deferred::default();
        {
            let mut state = self.lock();
            loop {
                let code = getc();
                if code < 0 {
                    break;
                }
                if let Some(symbol) = InputSymbol::from_code(code) {
                    state.handle(symbol, &mut deferred);
                }
            }
            state.sweep();
        }

        if deferred.wake {
            self.sched.wakeup(self.input_channel());
        }
        if deferred.dump {
            self.sched.dump_processes();
        }
    }

    /// Runs `f` against the locked console state.
    pub fn inspect<R>(&self, f: impl FnOnce(&ConsoleState<D, S>) -> R) -> R {
        f(&self.lock())
    }

    /// Formats kernel output onto the console.
    pub fn print(&self, args: fmt::Arguments<'_>) {
        // ConsoleState::write_str never fails.
        let _ = self.lock().write_fmt(args);
    }

    /// Stops serializing output; used once, by the panic handler.
    pub fn disable_locking(&self) {
        self.locking.store(false, Ordering::Release);
    }

    /// Blanks the screen.
    pub fn clear(&self) {
        self.lock().sink_mut().screen_mut().clear();
    }
}

/// Kernel-wide output target for [`kprint!`] and [`crate::printf`].
pub trait Printer: Sync {
    /// Formats onto the output.
    fn print(&self, args: fmt::Arguments<'_>);
    /// Stops taking the output lock.
    fn disable_locking(&self);
}

impl<D, S, K> Printer for Console<D, S, K>
where
    D: TextDisplay + Send,
    S: Serial + Send,
    K: Scheduler + Sync,
{
    fn print(&self, args: fmt::Arguments<'_>) {
        Console::print(self, args);
    }

    fn disable_locking(&self) {
        Console::disable_locking(self);
    }
}

static PRINTER: Once<&'static dyn Printer> = Once::new();

/// The installed kernel printer, if the console is up.
pub fn printer() -> Option<&'static dyn Printer> {
    PRINTER.get().copied()
}

/// Registers `console` as the console device and unmasks the keyboard IRQ.
///
/// The first console initialized also becomes the target of [`kprint!`].
pub fn init<C, I>(console: &'static C, devices: &DeviceTable, irq: &mut I) -> Result<(), ConsoleError>
where
    C: CharDevice + Printer + 'static,
    I: InterruptController,
{
    devices.register(CONSOLE_MAJOR, console)?;
    let printer: &'static dyn Printer = console;
    PRINTER.call_once(|| printer);
    irq.enable_irq(IRQ_KEYBOARD);
    info!("console: ready on major {}", CONSOLE_MAJOR);
    Ok(())
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    if let Some(printer) = printer() {
        printer.print(args);
    }
}

/// Prints to the console without a newline.
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the console with a newline.
#[macro_export]
macro_rules! kprintln {
    () => ($crate::kprint!("\n"));
    ($($arg:tt)*) => ($crate::kprint!("{}\n", format_args!($($arg)*)))
}

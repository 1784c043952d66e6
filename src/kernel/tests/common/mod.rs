//! Shared fixtures for console integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use kiln_hal::{Channel, Scheduler};
use kiln_kernel::config::ConsoleConfig;
use kiln_kernel::console::Console;
use kiln_kernel::testutil::{CaptureSerial, MemoryDisplay};

/// Scheduler where each reader is an OS thread parked on a condvar.
#[derive(Default)]
pub struct ThreadScheduler {
    generation: Mutex<u64>,
    cv: Condvar,
    killed: AtomicBool,
    sleeps: AtomicUsize,
}

impl ThreadScheduler {
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
        let _g = self.generation.lock().unwrap();
        self.cv.notify_all();
    }

    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Spins until at least `n` sleeps have started.
    pub fn wait_for_sleepers(&self, n: usize) {
        while self.sleeps() < n {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn sleep(&self, _chan: Channel, release: &mut dyn FnMut()) {
        let mut gen = self.generation.lock().unwrap();
        let seen = *gen;
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        release();
        while *gen == seen && !self.killed.load(Ordering::SeqCst) {
            gen = self.cv.wait(gen).unwrap();
        }
    }

    fn wakeup(&self, _chan: Channel) {
        let mut gen = self.generation.lock().unwrap();
        *gen += 1;
        self.cv.notify_all();
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn dump_processes(&self) {}
}

pub type TestConsole = Console<MemoryDisplay, CaptureSerial, ThreadScheduler>;

pub fn console() -> TestConsole {
    console_with(ConsoleConfig::default())
}

pub fn console_with(config: ConsoleConfig) -> TestConsole {
    Console::new(
        MemoryDisplay::new(),
        CaptureSerial::new(),
        ThreadScheduler::default(),
        &config,
    )
}

/// Delivers `codes` as one interrupt batch.
pub fn feed_codes(console: &TestConsole, codes: &[i32]) {
    let mut it = codes.iter().copied();
    console.intr(|| it.next().unwrap_or(-1));
}

/// Types `text` as one interrupt batch.
pub fn feed(console: &TestConsole, text: &str) {
    let codes: Vec<i32> = text.bytes().map(i32::from).collect();
    feed_codes(console, &codes);
}

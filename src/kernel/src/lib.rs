//! KilnOS Kernel
//!
//! The console subsystem of a small teaching kernel: line editing with
//! history, a copy mark and an inline calculator over a VGA text screen
//! mirrored to COM1.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `console`: input engine, screen rendering and the console device
//! - `dev`: character device switch
//! - `printf`, `fatal`, `logger`: kernel output paths
//! - `sync`: interrupt-safe locking and sleeping
//! - `arch`: platform-specific code (VGA, serial, PIC, keyboard, interrupts)
//!
//! # Safety
//!
//! This is a `#![no_std]` kernel. All unsafe code is documented with safety
//! invariants explaining why the usage is correct. Host builds (`cargo test`
//! without `bare-metal`) never touch hardware.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "bare-metal", feature(abi_x86_interrupt))]
#![warn(missing_docs)]

pub mod arch;
pub mod boot;
pub mod config;
pub mod console;
pub mod dev;
pub mod fatal;
pub mod logger;
pub mod printf;
pub mod proc;
pub mod sync;
pub mod testutil;

/// Initializes core kernel subsystems.
///
/// Called early in the boot process, before the console exists, so that
/// log records from console bring-up reach the serial port.
pub fn init() {
    #[cfg(target_arch = "x86_64")]
    arch::x86_64::serial::init();

    #[cfg(debug_assertions)]
    let level = log::LevelFilter::Debug;
    #[cfg(not(debug_assertions))]
    let level = log::LevelFilter::Info;

    // A logger is already installed on re-entry.
    let _ = logger::init(level);
}

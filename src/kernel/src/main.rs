//! KilnOS Kernel Entry Point
//!
//! Brings up the console and runs the boot process, which reads lines from
//! the console device and echoes them back.

#![no_std]
#![no_main]

use bootloader::{entry_point, BootInfo};
use core::panic::PanicInfo;
use kiln_hal::InterruptController;
use kiln_kernel::arch::x86_64::{interrupts, ComPort, Pic, VgaText, CONSOLE};
use kiln_kernel::boot::{self, Status};
use kiln_kernel::config::{ConsoleConfig, CONSOLE_MAJOR, INPUT_BUF, IRQ_COM1};
use kiln_kernel::console;
use kiln_kernel::dev::DEVSW;
use kiln_kernel::proc::HaltScheduler;
use kiln_kernel::{kprint, kprintln};

entry_point!(kernel_main);

/// Kernel entry point.
///
/// Called by the bootloader after setting up the initial environment.
fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    // ========================================================================
    // Phase 1: Core Initialization (serial log only)
    // ========================================================================
    kiln_kernel::init();
    interrupts::init_idt();

    // ========================================================================
    // Phase 2: Console
    // ========================================================================
    let config = ConsoleConfig::default();
    let cons = CONSOLE.call_once(|| {
        // SAFETY: the only VgaText in the kernel.
        let display = unsafe { VgaText::new() };
        console::Console::new(display, ComPort, HaltScheduler::new(), &config)
    });
    cons.clear();

    let mut pic = Pic;
    if let Err(e) = console::init(cons, &DEVSW, &mut pic) {
        panic!("console init: {}", e);
    }
    pic.enable_irq(IRQ_COM1);

    boot::banner::print_banner();
    boot::log(Status::Ok, "Serial port initialized");
    boot::log(Status::Ok, "IDT configured");
    boot::log(Status::Ok, "Console registered");
    boot::log_detail("Ctrl-S/Ctrl-F copy, Up/Down history, a+b=? to calculate");

    pic.enable();
    boot::log(Status::Ok, "Interrupts enabled");
    kprintln!();

    // ========================================================================
    // Phase 3: init - echo lines until end of input
    // ========================================================================
    let mut line = [0u8; INPUT_BUF];
    loop {
        kprint!("$ ");
        match DEVSW.read(CONSOLE_MAJOR, &mut line) {
            Ok(0) => boot::log(Status::Info, "end of input"),
            Ok(n) => {
                let _ = DEVSW.write(CONSOLE_MAJOR, &line[..n]);
            }
            Err(e) => {
                boot::log(Status::Fail, "console read failed");
                log::error!("init: {}", e);
                kiln_kernel::arch::x86_64::halt_loop();
            }
        }
    }
}

/// Panic handler.
///
/// Called when the kernel encounters an unrecoverable error.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    kiln_kernel::fatal::panic(info)
}

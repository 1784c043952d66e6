//! Interrupt Descriptor Table (IDT) and exception handlers for x86_64.

use kiln_hal::InterruptController;
use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

use crate::arch::x86_64::pic::{InterruptIndex, Pic};
use crate::arch::x86_64::{keyboard, serial, CONSOLE};
use crate::config::{IRQ_COM1, IRQ_KEYBOARD};

lazy_static! {
    /// The Interrupt Descriptor Table (IDT).
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.divide_error.set_handler_fn(divide_error_handler);

        // Hardware interrupts
        idt[InterruptIndex::Timer.as_usize()]
            .set_handler_fn(timer_interrupt_handler);
        idt[InterruptIndex::Keyboard.as_usize()]
            .set_handler_fn(keyboard_interrupt_handler);
        idt[InterruptIndex::Com1.as_usize()]
            .set_handler_fn(com1_interrupt_handler);

        idt
    };
}

/// Loads the IDT and remaps the PICs. Interrupts stay disabled.
pub fn init_idt() {
    IDT.load();
    Pic.init();
}

/// Handler for the timer interrupt.
extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    Pic.end_of_interrupt(0);
}

/// Handler for the keyboard interrupt.
extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    if let Some(console) = CONSOLE.get() {
        console.intr(keyboard::kbd_getc);
    }
    Pic.end_of_interrupt(IRQ_KEYBOARD);
}

/// Handler for the COM1 receive interrupt.
extern "x86-interrupt" fn com1_interrupt_handler(_stack_frame: InterruptStackFrame) {
    if let Some(console) = CONSOLE.get() {
        console.intr(serial::uart_getc);
    }
    Pic.end_of_interrupt(IRQ_COM1);
}

/// Handler for the breakpoint exception (INT3).
extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::warn!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

/// Handler for the double fault exception.
extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

/// Handler for the page fault exception.
extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: x86_64::structures::idt::PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    panic!(
        "EXCEPTION: PAGE FAULT at {:?} ({:?})\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
}

/// Handler for the general protection fault exception.
extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "EXCEPTION: GENERAL PROTECTION FAULT ({:#x})\n{:#?}",
        error_code, stack_frame
    );
}

/// Handler for the divide error exception.
extern "x86-interrupt" fn divide_error_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: DIVIDE ERROR\n{:#?}", stack_frame);
}

//! Support for the primary and secondary 8259 Programmable Interrupt Controllers (PICs).

use kiln_hal::InterruptController;
use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::port::Port;

/// The offset of the first PIC (master).
///
/// IRQs 0..7 are mapped to interrupts 32..39.
pub const PIC_1_OFFSET: u8 = 32;

/// The offset of the second PIC (slave).
///
/// IRQs 8..15 are mapped to interrupts 40..47.
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// Mask registers of the two PICs.
const PIC_1_DATA: u16 = 0x21;
const PIC_2_DATA: u16 = 0xA1;

/// The global instance of the chained PICs.
pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Possible IRQ indices.
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    /// Timer interrupt.
    Timer = PIC_1_OFFSET,
    /// Keyboard interrupt.
    Keyboard = PIC_1_OFFSET + crate::config::IRQ_KEYBOARD,
    /// COM1 receive interrupt.
    Com1 = PIC_1_OFFSET + crate::config::IRQ_COM1,
}

impl InterruptIndex {
    /// Returns the internal u8 value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the internal usize value.
    pub fn as_usize(self) -> usize {
        usize::from(self as u8)
    }
}

/// The legacy PIC pair as an [`InterruptController`].
pub struct Pic;

impl Pic {
    /// Remaps both PICs and masks every line except the cascade.
    pub fn init(&mut self) {
        // SAFETY: the offsets above do not overlap CPU exceptions.
        unsafe {
            let mut pics = PICS.lock();
            pics.initialize();
            Port::<u8>::new(PIC_1_DATA).write(!(1 << 2));
            Port::<u8>::new(PIC_2_DATA).write(0xFF);
        }
    }
}

impl InterruptController for Pic {
    fn enable(&mut self) {
        x86_64::instructions::interrupts::enable();
    }

    fn disable(&mut self) {
        x86_64::instructions::interrupts::disable();
    }

    fn enable_irq(&mut self, irq: u8) {
        let (port, bit) = if irq < 8 {
            (PIC_1_DATA, irq)
        } else {
            (PIC_2_DATA, irq - 8)
        };
        let _pics = PICS.lock();
        let mut data: Port<u8> = Port::new(port);
        // SAFETY: read-modify-write of the PIC's interrupt mask register.
        unsafe {
            let mask = data.read();
            data.write(mask & !(1 << bit));
        }
    }

    fn end_of_interrupt(&mut self, irq: u8) {
        // SAFETY: called from the handler of `irq`.
        unsafe {
            PICS.lock().notify_end_of_interrupt(PIC_1_OFFSET + irq);
        }
    }
}

//! Frame-pointer stack walking for panic reports.

use core::arch::asm;

use crate::fatal::TRACE_DEPTH;

/// Collects up to [`TRACE_DEPTH`] return addresses of the current call
/// chain, leaving zeros where the chain ends.
///
/// Relies on the kernel being built with frame pointers.
pub fn caller_pcs() -> [usize; TRACE_DEPTH] {
    let mut pcs = [0usize; TRACE_DEPTH];
    let mut rbp: usize;
    // SAFETY: reads the frame pointer register only.
    unsafe { asm!("mov {}, rbp", out(reg) rbp) };

    for pc in pcs.iter_mut() {
        if rbp == 0 || rbp % core::mem::align_of::<usize>() != 0 {
            break;
        }
        // SAFETY: rbp points at a saved frame: [saved rbp, return address].
        unsafe {
            *pc = *((rbp + 8) as *const usize);
            rbp = *(rbp as *const usize);
        }
    }
    pcs
}

/// The local APIC id of this CPU, from CPUID leaf 1.
pub fn lapic_id() -> u32 {
    // SAFETY: CPUID leaf 1 is available on every x86_64 CPU.
    let leaf = unsafe { core::arch::x86_64::__cpuid(1) };
    leaf.ebx >> 24
}

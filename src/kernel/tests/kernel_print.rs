//! Kernel output through the registered console.

mod common;

use common::console as test_console;
use kiln_kernel::config::{CONSOLE_MAJOR, IRQ_KEYBOARD};
use kiln_kernel::console;
use kiln_kernel::dev::DeviceTable;
use kiln_kernel::printf::{cprintf, Arg};
use kiln_kernel::kprintln;
use kiln_kernel::testutil::MockIrq;

#[test]
fn test_printf_and_kprint_reach_console() {
    let c: &'static common::TestConsole = Box::leak(Box::new(test_console()));
    let devices = DeviceTable::new();
    let mut irq = MockIrq::new();
    console::init(c, &devices, &mut irq).unwrap();
    assert!(irq.is_unmasked(IRQ_KEYBOARD));
    assert!(devices.lookup(CONSOLE_MAJOR).is_ok());

    cprintf(Some("pid %d: %s\n"), &[Arg::Int(1), Arg::Str(Some("init"))]);
    kprintln!("cpu{}: starting", 0);

    c.inspect(|s| {
        assert_eq!(s.sink().serial().bytes(), b"pid 1: init\ncpu0: starting\n");
        assert_eq!(s.sink().screen().display().row_text(0), "pid 1: init");
        assert_eq!(s.sink().screen().display().row_text(1), "cpu0: starting");
    });
}

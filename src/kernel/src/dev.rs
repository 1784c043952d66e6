//! Character device switch.
//!
//! File reads and writes on a device inode are routed by major number to
//! whatever driver registered itself here.

use kiln_common::ConsoleError;
use log::info;
use spin::Mutex;

/// Number of major numbers.
pub const NDEV: usize = 10;

/// A driver reachable through the device switch.
pub trait CharDevice: Sync {
    /// Reads into `dst`, returning the number of bytes transferred.
    fn read(&self, _dst: &mut [u8]) -> Result<usize, ConsoleError> {
        Err(ConsoleError::Unsupported)
    }

    /// Writes `src`, returning the number of bytes consumed.
    fn write(&self, _src: &[u8]) -> Result<usize, ConsoleError> {
        Err(ConsoleError::Unsupported)
    }
}

/// Drivers indexed by major number.
pub struct DeviceTable {
    slots: Mutex<[Option<&'static dyn CharDevice>; NDEV]>,
}

/// The kernel's device switch.
pub static DEVSW: DeviceTable = DeviceTable::new();

impl DeviceTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new([None; NDEV]),
        }
    }

    /// Installs `dev` under `major`, replacing any previous driver.
    pub fn register(&self, major: usize, dev: &'static dyn CharDevice) -> Result<(), ConsoleError> {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(major).ok_or(ConsoleError::NoDevice)?;
        *slot = Some(dev);
        info!("dev: major {} registered", major);
        Ok(())
    }

    /// The driver for `major`.
    pub fn lookup(&self, major: usize) -> Result<&'static dyn CharDevice, ConsoleError> {
        self.slots
            .lock()
            .get(major)
            .copied()
            .flatten()
            .ok_or(ConsoleError::NoDevice)
    }

    /// Reads from the device under `major`.
    pub fn read(&self, major: usize, dst: &mut [u8]) -> Result<usize, ConsoleError> {
        // The table lock is not held across the call; reads may sleep.
        self.lookup(major)?.read(dst)
    }

    /// Writes to the device under `major`.
    pub fn write(&self, major: usize, src: &[u8]) -> Result<usize, ConsoleError> {
        self.lookup(major)?.write(src)
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink;

    impl CharDevice for Sink {
        fn write(&self, src: &[u8]) -> Result<usize, ConsoleError> {
            Ok(src.len())
        }
    }

    static SINK: Sink = Sink;

    #[test]
    fn test_unregistered_major() {
        let table = DeviceTable::new();
        assert_eq!(table.write(3, b"x"), Err(ConsoleError::NoDevice));
        assert_eq!(table.register(NDEV, &SINK), Err(ConsoleError::NoDevice));
    }

    #[test]
    fn test_routing_and_default_ops() {
        let table = DeviceTable::new();
        table.register(3, &SINK).unwrap();
        assert_eq!(table.write(3, b"abc"), Ok(3));
        let mut buf = [0u8; 4];
        assert_eq!(table.read(3, &mut buf), Err(ConsoleError::Unsupported));
    }
}

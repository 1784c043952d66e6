//! System-wide error types for KilnOS.

use core::fmt;

/// Console and character-device error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsoleError {
    /// The calling process was killed while blocked
    Killed,
    /// No device registered under the requested major number
    NoDevice,
    /// Operation not supported by the device
    Unsupported,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Killed => write!(f, "process killed while waiting for input"),
            ConsoleError::NoDevice => write!(f, "no such device"),
            ConsoleError::Unsupported => write!(f, "operation not supported"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ConsoleError::Killed.to_string(),
            "process killed while waiting for input"
        );
        assert_eq!(ConsoleError::NoDevice.to_string(), "no such device");
    }
}

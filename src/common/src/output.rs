//! Console output routing flags.

use bitflags::bitflags;

bitflags! {
    /// Where rendered console output is sent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OutputTargets: u8 {
        const DISPLAY = 1 << 0; // memory-mapped text grid
        const SERIAL  = 1 << 1; // COM1 mirror
    }
}

impl Default for OutputTargets {
    fn default() -> Self {
        OutputTargets::DISPLAY | OutputTargets::SERIAL
    }
}

//! Boot banner and branding.

use crate::kprintln;

/// Print the KilnOS boot banner.
pub fn print_banner() {
    kprintln!("  _  ___ _       ___  ____  ");
    kprintln!(" | |/ (_) |_ __ / _ \\/ ___| ");
    kprintln!(" | ' /| | | '_ \\ | | \\___ \\ ");
    kprintln!(" | . \\| | | | | | |_| |___) |");
    kprintln!(" |_|\\_\\_|_|_| |_|\\___/|____/ ");
    kprintln!();
    kprintln!(" KilnOS v{}", env!("CARGO_PKG_VERSION"));
    kprintln!();
}

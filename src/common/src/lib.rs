//! Types shared between the KilnOS kernel and its drivers.

#![no_std]

pub mod error;
pub mod keys;
pub mod output;

pub use error::ConsoleError;
pub use keys::InputSymbol;
pub use output::OutputTargets;

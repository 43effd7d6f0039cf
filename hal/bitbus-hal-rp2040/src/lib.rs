//! RP2040 implementations of the bitbus HAL traits
//!
//! - [`pins::BusRx`] - Bus receive line (input with pull-up)
//! - [`pins::BusTx`] - Bus transmit line (switchable direction)
//! - [`pins::StatusPin`] - Status indicator output
//! - [`delay::SpinDelay`] - Timer-referenced busy-wait via `embedded-hal`

#![no_std]

pub mod delay;
pub mod pins;

// Re-export shared traits from bitbus-hal for convenience
pub use bitbus_hal::{BusyWait, InputPin, OutputPin, TristatePin};

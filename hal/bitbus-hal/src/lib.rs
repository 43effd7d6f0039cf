//! Bitbus Hardware Abstraction Layer
//!
//! This crate defines the capabilities a bitbus node consumes from its host
//! platform. Chip-specific crates implement them against real registers;
//! `bitbus-core` implements them against an in-memory line model for tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  bitbus-firmware / host tests           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitbus-core (software UART, dispatch)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitbus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ bitbus-hal-   │       │ embedded-hal  │
//! │    rp2040     │       │   adapters    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`gpio::TristatePin`] - Output that can let go of a shared line
//! - [`delay::BusyWait`] - Spinning delays for bit timing

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod gpio;

#[cfg(feature = "embedded-hal")]
pub mod eh;

// Re-export key traits at crate root for convenience
pub use delay::BusyWait;
pub use gpio::{InputPin, OutputPin, TristatePin};

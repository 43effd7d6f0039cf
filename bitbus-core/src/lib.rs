//! Software UART and node dispatch for a bit-banged multi-drop bus
//!
//! Every node shares one pair of bus lines driven through an external,
//! inverting line driver. There is no UART peripheral, timer or interrupt:
//! bits are framed and sampled with busy-wait delays alone.
//!
//! - [`timing`] - Bit period and the busy-wait bit timer
//! - [`rx`] - Frame receiver (start-bit edge, centered sampling)
//! - [`tx`] - Frame transmitter
//! - [`message`] - Sentinel-terminated message transmission
//! - [`status`] - Status indicator pulses
//! - [`config`] - Node configuration
//! - [`node`] - Address dispatch loop
//!
//! # Frame format
//!
//! ```text
//!   idle  start  b0   b1  ...  b7   stop  gap   idle
//!  ──────┐     ┌────┬────┬   ┬────┬──────────────────
//!        └─────┴────┴────┴   ┴────┘
//!        │◄ T ►│◄ T ►│        │◄ T ►│◄ T ►│◄ T ►│
//! ```
//!
//! Levels are shown at the pin: high is idle (logical 1), low is active
//! (logical 0). Data bits go out least-significant first; each may be at
//! either level. The external line driver inverts between pin and wire.

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

pub mod config;
pub mod line;
pub mod message;
pub mod node;
pub mod rx;
pub mod status;
pub mod timing;
pub mod tx;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use config::{BusRelease, ConfigError, NodeConfig};
pub use line::LineLevel;
pub use message::SentinelPolicy;
pub use node::{Dispatch, Node, NodeEvent, NodeState};
pub use rx::FrameReceiver;
pub use status::{PulseTiming, StatusLed};
pub use timing::{BitPeriod, BitTimer};
pub use tx::FrameTransmitter;

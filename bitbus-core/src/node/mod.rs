//! Address dispatch
//!
//! A node sends its banner once, then forever: waits for an address frame,
//! blinks a long pulse, and if the address is its own, replies and blinks
//! short pulses. A byte from line noise is dispatched like any other.

mod dispatch;
mod state;

pub use dispatch::{Dispatch, Node};
pub use state::{NodeEvent, NodeState};

#[cfg(test)]
mod scenarios;

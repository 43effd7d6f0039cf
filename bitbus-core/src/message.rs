//! Message transmission
//!
//! A message is the text before the first 0x00 sentinel, sent one frame per
//! byte. Existing nodes on the bus also send the sentinel itself as a final
//! frame; [`SentinelPolicy`] chooses whether this node does too.

use bitbus_hal::{BusyWait, OutputPin};

use crate::timing::BitTimer;
use crate::tx::FrameTransmitter;

/// Message terminator
pub const SENTINEL: u8 = 0x00;

/// Line feed, sent after the banner and after each reply
pub const LINE_FEED: u8 = 0x0A;

/// Whether the terminating sentinel goes out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentinelPolicy {
    /// Send a 0x00 frame after the text (wire-compatible with existing nodes)
    #[default]
    Transmit,
    /// Send the text only
    Omit,
}

/// Bytes of `message` before the first sentinel
pub fn content(message: &[u8]) -> &[u8] {
    match message.iter().position(|&b| b == SENTINEL) {
        Some(end) => &message[..end],
        None => message,
    }
}

impl<P: OutputPin> FrameTransmitter<P> {
    /// Send a sentinel-terminated message
    ///
    /// Returns the number of frames sent.
    pub fn send_message<D: BusyWait>(
        &mut self,
        timer: &mut BitTimer<D>,
        message: &[u8],
        policy: SentinelPolicy,
    ) -> usize {
        let text = content(message);
        for &byte in text {
            self.send_byte(timer, byte);
        }

        match policy {
            SentinelPolicy::Transmit => {
                self.send_byte(timer, SENTINEL);
                text.len() + 1
            }
            SentinelPolicy::Omit => text.len(),
        }
    }
}

//! Frame receiver
//!
//! Waits for the start-bit edge, then samples each data bit at its center:
//! 1.5 bit periods after the edge for bit 0, one period apart after that.
//! The stop bit is skipped, never checked, and there is no timeout. A glitch
//! that looks like a start edge yields a garbage byte.

use bitbus_hal::{BusyWait, InputPin};

use crate::line::LineLevel;
use crate::timing::BitTimer;

/// Receives frames from one bus input line
pub struct FrameReceiver<P> {
    line: P,
}

impl<P: InputPin> FrameReceiver<P> {
    pub fn new(line: P) -> Self {
        Self { line }
    }

    fn level(&mut self) -> LineLevel {
        LineLevel::from_pin(self.line.is_high())
    }

    /// Read the line once; true if a start bit is on it
    pub fn poll_start(&mut self) -> bool {
        self.level() == LineLevel::Active
    }

    /// Receive one byte
    ///
    /// Spins while the line is idle, so this never returns on a silent bus.
    /// That spin is the node's idle state.
    pub fn receive_byte<D: BusyWait>(&mut self, timer: &mut BitTimer<D>) -> u8 {
        while !self.poll_start() {
            core::hint::spin_loop();
        }
        self.read_frame(timer)
    }

    /// Receive one byte, giving up after `max_polls` idle reads
    pub fn try_receive_byte<D: BusyWait>(
        &mut self,
        timer: &mut BitTimer<D>,
        max_polls: u32,
    ) -> Option<u8> {
        for _ in 0..max_polls {
            if self.poll_start() {
                return Some(self.read_frame(timer));
            }
        }
        None
    }

    /// Sample a frame whose start edge was just seen
    ///
    /// Returns at the end of the stop bit, 10 bit periods after the edge.
    fn read_frame<D: BusyWait>(&mut self, timer: &mut BitTimer<D>) -> u8 {
        // Center of data bit 0
        timer.wait_half_bit();
        timer.wait_full_bit();

        let mut byte = 0u8;
        for bit in 0..8 {
            if bit > 0 {
                timer.wait_full_bit();
            }
            if self.level().bit() {
                byte |= 1 << bit;
            }
        }

        // Stop bit is assumed
        timer.wait_full_bit();
        timer.wait_half_bit();
        byte
    }
}

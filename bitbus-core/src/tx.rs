//! Frame transmitter
//!
//! One frame is a start bit, 8 data bits LSB first and a stop bit, each held
//! for one bit period, then one more idle period as the inter-character gap.
//! The line is idle when `send_byte` returns.

use bitbus_hal::{BusyWait, OutputPin};

use crate::line::LineLevel;
use crate::timing::BitTimer;

/// Frame length on the wire, gap included, in bit periods
pub const FRAME_BITS: u32 = 11;

/// Sends frames on one bus output line
pub struct FrameTransmitter<P> {
    line: P,
}

impl<P: OutputPin> FrameTransmitter<P> {
    pub fn new(line: P) -> Self {
        Self { line }
    }

    fn drive(&mut self, level: LineLevel) {
        self.line.set_state(level.is_pin_high());
    }

    /// Send one byte
    pub fn send_byte<D: BusyWait>(&mut self, timer: &mut BitTimer<D>, value: u8) {
        self.drive(LineLevel::Active);
        timer.wait_full_bit();

        for bit in 0..8 {
            self.drive(LineLevel::for_bit(value & (1 << bit) != 0));
            timer.wait_full_bit();
        }

        self.drive(LineLevel::Idle);
        timer.wait_full_bit();

        // Inter-character gap
        timer.wait_full_bit();
    }

    /// Access the output line
    pub fn line_mut(&mut self) -> &mut P {
        &mut self.line
    }
}

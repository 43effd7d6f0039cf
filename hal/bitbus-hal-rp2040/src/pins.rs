//! Bus and status pins on RP2040 GPIO

use embassy_rp::gpio::{Flex, Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;

use bitbus_hal::{InputPin, OutputPin, TristatePin};

/// Bus receive line
///
/// Pulled up, so a disconnected line reads idle instead of a stream of
/// start bits.
pub struct BusRx<'d> {
    pin: Input<'d>,
}

impl<'d> BusRx<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
        }
    }
}

impl InputPin for BusRx<'_> {
    #[inline(always)]
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Bus transmit line
///
/// Starts released (input) with the output latch high, so joining the bus
/// does not disturb traffic between other nodes.
pub struct BusTx<'d> {
    pin: Flex<'d>,
    driving: bool,
}

impl<'d> BusTx<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_high();
        pin.set_as_input();
        Self {
            pin,
            driving: false,
        }
    }
}

impl OutputPin for BusTx<'_> {
    #[inline(always)]
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    #[inline(always)]
    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl TristatePin for BusTx<'_> {
    fn drive(&mut self) {
        self.pin.set_as_output();
        self.driving = true;
    }

    fn release(&mut self) {
        self.pin.set_as_input();
        self.driving = false;
    }

    fn is_driving(&self) -> bool {
        self.driving
    }
}

/// Status indicator pin
pub struct StatusPin<'d> {
    pin: Output<'d>,
}

impl<'d> StatusPin<'d> {
    /// Create the pin at `initial_high`; pass the "off" level of the indicator
    pub fn new(pin: Peri<'d, impl Pin>, initial_high: bool) -> Self {
        Self {
            pin: Output::new(pin, Level::from(initial_high)),
        }
    }
}

impl OutputPin for StatusPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

//! GPIO pin abstractions
//!
//! Provides the `{configure direction, read level, write level}` capability
//! for the bus lines and the status indicator.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Takes `&mut self` so that simulated lines can account for the time a
/// read costs.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Output pin on a shared line
///
/// A released pin is an input (high impedance), leaving the line to the
/// other nodes on the bus. The output latch keeps its value while released,
/// so setting it high before driving avoids a glitch onto the bus.
pub trait TristatePin: OutputPin {
    /// Switch the pin to output and drive the latched level
    fn drive(&mut self);

    /// Switch the pin to input
    fn release(&mut self);

    /// Check if the pin is currently an output
    fn is_driving(&self) -> bool;
}

//! Adapters from `embedded-hal` 1.0
//!
//! Lets any chip HAL that implements the `embedded-hal` digital and delay
//! traits drive a bitbus node without a dedicated crate. Pin adapters
//! require an infallible error type, since the bus has no error path.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;

use crate::delay::BusyWait;
use crate::gpio::{InputPin, OutputPin};

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// `embedded-hal` output pin adapter
///
/// Tracks the commanded level itself so `is_set_high` does not need
/// `StatefulOutputPin`.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P> EhOutput<P>
where
    P: digital::OutputPin<Error = Infallible>,
{
    /// Wrap a pin, driving it to `initial_high`
    pub fn new(mut pin: P, initial_high: bool) -> Self {
        infallible(pin.set_state(initial_high.into()));
        Self {
            pin,
            high: initial_high,
        }
    }

    /// Give back the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for EhOutput<P>
where
    P: digital::OutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        infallible(self.pin.set_high());
        self.high = true;
    }

    fn set_low(&mut self) {
        infallible(self.pin.set_low());
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// `embedded-hal` input pin adapter
pub struct EhInput<P>(pub P);

impl<P> InputPin for EhInput<P>
where
    P: digital::InputPin<Error = Infallible>,
{
    fn is_high(&mut self) -> bool {
        infallible(self.0.is_high())
    }

    fn is_low(&mut self) -> bool {
        infallible(self.0.is_low())
    }
}

/// `embedded-hal` delay adapter
///
/// Only sound for blocking `DelayNs` implementations, which is what the
/// trait requires.
pub struct EhDelay<D>(pub D);

impl<D: DelayNs> BusyWait for EhDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

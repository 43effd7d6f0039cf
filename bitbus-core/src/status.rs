//! Status indicator
//!
//! The indicator is a plain GPIO output, active-low on the reference board
//! (pin low = on). A pulse is an on phase followed by an off phase.

use bitbus_hal::{BusyWait, OutputPin};

use crate::timing::BitTimer;

/// On/off durations of one pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl PulseTiming {
    /// Pulse after every received address
    pub const LONG: Self = Self::symmetric(500);

    /// Pulses after a reply
    pub const SHORT: Self = Self::symmetric(100);

    /// Equal on and off phases
    pub const fn symmetric(ms: u32) -> Self {
        Self {
            on_ms: ms,
            off_ms: ms,
        }
    }
}

/// Status LED on a GPIO pin
pub struct StatusLed<P> {
    pin: P,
    /// If true, LED on = pin low
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create the indicator, switched off
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self {
            pin,
            active_low,
            on: false,
        };
        led.set_on(false);
        led
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
        self.pin.set_state(on != self.active_low);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Blink once, spinning through both phases
    pub fn pulse<D: BusyWait>(&mut self, timer: &mut BitTimer<D>, timing: PulseTiming) {
        self.set_on(true);
        timer.wait_ms(timing.on_ms);
        self.set_on(false);
        timer.wait_ms(timing.off_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimDelay, SimOutput};
    use crate::timing::BitPeriod;

    #[test]
    fn test_active_low_led() {
        let clock = SimClock::new();
        let pin = SimOutput::new(&clock);
        let mut led = StatusLed::new_active_low(pin.clone());

        // Initially off (pin is high for active-low)
        assert!(!led.is_on());
        assert!(pin.is_set_high());

        led.set_on(true);
        assert!(led.is_on());
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_active_high_led() {
        let clock = SimClock::new();
        let mut pin = SimOutput::new(&clock);
        pin.set_high();
        let led = StatusLed::new_active_high(pin.clone());

        assert!(!led.is_on());
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_long_pulse_timing() {
        let clock = SimClock::new();
        let pin = SimOutput::new(&clock);
        let mut led = StatusLed::new_active_low(pin.clone());
        let mut timer = BitTimer::new(SimDelay::new(&clock), BitPeriod::DEFAULT);

        led.pulse(&mut timer, PulseTiming::LONG);

        assert_eq!(pin.pulses(true), [(0, 500_000)]);
        assert_eq!(clock.now(), 1_000_000);
        assert!(!led.is_on());
    }
}

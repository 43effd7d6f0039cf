//! Bit timing
//!
//! Every timing on the bus derives from one bit period: the full period
//! advances from bit to bit, the half period centers the first sample
//! inside a bit.

use bitbus_hal::BusyWait;

use crate::config::ConfigError;

/// Duration of one bit on the bus, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitPeriod(u32);

impl BitPeriod {
    /// ~9600 baud once per-bit loop overhead is included
    pub const DEFAULT: Self = Self(100);

    /// Shortest period with a non-zero half period
    pub const MIN_US: u32 = 2;

    /// Create a bit period from microseconds
    pub const fn new(us: u32) -> Result<Self, ConfigError> {
        if us < Self::MIN_US {
            return Err(ConfigError::BitPeriodTooShort);
        }
        Ok(Self(us))
    }

    /// Bit period for a nominal baud rate, rounded to the nearest microsecond
    pub const fn from_baud(baud: u32) -> Result<Self, ConfigError> {
        if baud == 0 {
            return Err(ConfigError::BitPeriodTooShort);
        }
        Self::new((1_000_000 + baud / 2) / baud)
    }

    /// Full period in microseconds
    pub const fn as_us(self) -> u32 {
        self.0
    }

    /// Half period in microseconds (rounded down)
    pub const fn half_us(self) -> u32 {
        self.0 / 2
    }
}

impl Default for BitPeriod {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Busy-wait bit timer
///
/// Owns the delay provider for the whole node; status pulses borrow it
/// through [`BitTimer::wait_ms`].
pub struct BitTimer<D> {
    delay: D,
    full_us: u32,
    half_us: u32,
}

impl<D: BusyWait> BitTimer<D> {
    /// Create a timer; the half period is fixed here for the timer's lifetime
    pub fn new(delay: D, period: BitPeriod) -> Self {
        Self {
            delay,
            full_us: period.as_us(),
            half_us: period.half_us(),
        }
    }

    /// Spin for one bit period
    #[inline(always)]
    pub fn wait_full_bit(&mut self) {
        self.delay.delay_us(self.full_us);
    }

    /// Spin for half a bit period
    #[inline(always)]
    pub fn wait_half_bit(&mut self) {
        self.delay.delay_us(self.half_us);
    }

    /// Spin for `ms` milliseconds (not bit-aligned)
    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Full period in microseconds
    pub fn period_us(&self) -> u32 {
        self.full_us
    }

    /// Half period in microseconds
    pub fn half_period_us(&self) -> u32 {
        self.half_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimDelay};

    #[test]
    fn test_half_period_is_floor_of_half() {
        assert_eq!(BitPeriod::new(100).unwrap().half_us(), 50);
        assert_eq!(BitPeriod::new(101).unwrap().half_us(), 50);
        assert_eq!(BitPeriod::new(2).unwrap().half_us(), 1);
    }

    #[test]
    fn test_too_short_period_rejected() {
        assert_eq!(BitPeriod::new(1), Err(ConfigError::BitPeriodTooShort));
        assert_eq!(BitPeriod::new(0), Err(ConfigError::BitPeriodTooShort));
        assert_eq!(BitPeriod::from_baud(0), Err(ConfigError::BitPeriodTooShort));
    }

    #[test]
    fn test_from_baud() {
        assert_eq!(BitPeriod::from_baud(9600).unwrap().as_us(), 104);
        assert_eq!(BitPeriod::from_baud(10_000).unwrap().as_us(), 100);
        assert_eq!(BitPeriod::from_baud(115_200).unwrap().as_us(), 9);
        assert!(BitPeriod::from_baud(1_000_000).is_err());
    }

    #[test]
    fn test_timer_fixes_half_period_at_construction() {
        let clock = SimClock::new();
        let mut timer = BitTimer::new(SimDelay::new(&clock), BitPeriod::new(101).unwrap());
        assert_eq!(timer.period_us(), 101);
        assert_eq!(timer.half_period_us(), 50);

        timer.wait_half_bit();
        timer.wait_full_bit();
        assert_eq!(clock.now(), 151);
        assert_eq!(timer.period_us(), 101);
        assert_eq!(timer.half_period_us(), 50);
    }

    #[test]
    fn test_timer_advances_clock() {
        let clock = SimClock::new();
        let mut timer = BitTimer::new(SimDelay::new(&clock), BitPeriod::DEFAULT);

        timer.wait_half_bit();
        assert_eq!(clock.now(), 50);
        timer.wait_full_bit();
        assert_eq!(clock.now(), 150);
        timer.wait_ms(2);
        assert_eq!(clock.now(), 2_150);
    }
}

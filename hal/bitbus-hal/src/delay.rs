//! Busy-wait delays
//!
//! Bit timing has no timer or interrupt behind it: every delay spins the CPU
//! until the time has elapsed. Accuracy is whatever the implementation's
//! instruction timing gives.

/// Spinning delay provider
pub trait BusyWait {
    /// Spin for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Spin for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

impl<T: BusyWait + ?Sized> BusyWait for &mut T {
    fn delay_us(&mut self, us: u32) {
        T::delay_us(self, us)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

//! Busy-wait delays on RP2040

use bitbus_hal::eh::EhDelay;

/// Busy-wait against the embassy time driver
///
/// `embassy_time::Delay` spins on the 1 MHz system timer when used through
/// `embedded-hal`, so the delay is independent of the core clock. Needs the
/// `time-driver` feature of `embassy-rp`.
pub type SpinDelay = EhDelay<embassy_time::Delay>;

/// Create a [`SpinDelay`]
pub const fn spin_delay() -> SpinDelay {
    EhDelay(embassy_time::Delay)
}

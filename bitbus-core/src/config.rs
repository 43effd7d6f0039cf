//! Node configuration
//!
//! Fixed at build time. Every constructor is `const` so firmware can keep
//! its configuration in a `static`.

use crate::message::{SentinelPolicy, SENTINEL};
use crate::status::PulseTiming;
use crate::timing::BitPeriod;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bit period too short to have a half period
    BitPeriodTooShort,
    /// Startup banner has no text
    EmptyBanner,
    /// Reply prefix has no text
    EmptyReplyPrefix,
    /// Banner contains a 0x00 byte, which would cut it short
    SentinelInBanner,
    /// Reply prefix contains a 0x00 byte, which would cut it short
    SentinelInReplyPrefix,
    /// A pulse phase has zero length
    ZeroPulseTime,
    /// No short pulses after a reply
    ZeroShortPulseCount,
}

/// What happens to the transmit line after the node has spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusRelease {
    /// Claim the line at the first send and keep driving it idle
    #[default]
    Hold,
    /// Release the line after every banner or reply
    AfterSend,
}

/// Bus node configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Address this node answers to
    pub node_id: u8,
    /// Bit period shared by receive and transmit
    pub bit_period: BitPeriod,
    /// Sent once at startup, followed by a line feed
    pub banner: &'static [u8],
    /// Reply text sent before the echoed address
    pub reply_prefix: &'static [u8],
    /// Pulse after every received address
    pub long_pulse: PulseTiming,
    /// Pulse repeated after a reply
    pub short_pulse: PulseTiming,
    /// Number of short pulses after a reply
    pub short_pulse_count: u8,
    /// If true, indicator on = pin low
    pub status_active_low: bool,
    /// Whether messages end with a 0x00 frame
    pub sentinel: SentinelPolicy,
    /// Transmit line handling after sending
    pub bus_release: BusRelease,
}

impl NodeConfig {
    pub const DEFAULT_BANNER: &'static [u8] = b"hello from version 6";
    pub const DEFAULT_REPLY_PREFIX: &'static [u8] = b"i am node ";
    pub const DEFAULT_SHORT_PULSE_COUNT: u8 = 2;

    /// Reference configuration for the node answering to `node_id`
    pub const fn new(node_id: u8) -> Self {
        Self {
            node_id,
            bit_period: BitPeriod::DEFAULT,
            banner: Self::DEFAULT_BANNER,
            reply_prefix: Self::DEFAULT_REPLY_PREFIX,
            long_pulse: PulseTiming::LONG,
            short_pulse: PulseTiming::SHORT,
            short_pulse_count: Self::DEFAULT_SHORT_PULSE_COUNT,
            status_active_low: true,
            sentinel: SentinelPolicy::Transmit,
            bus_release: BusRelease::Hold,
        }
    }

    pub const fn with_bit_period(mut self, bit_period: BitPeriod) -> Self {
        self.bit_period = bit_period;
        self
    }

    pub const fn with_banner(mut self, banner: &'static [u8]) -> Self {
        self.banner = banner;
        self
    }

    pub const fn with_reply_prefix(mut self, prefix: &'static [u8]) -> Self {
        self.reply_prefix = prefix;
        self
    }

    pub const fn with_pulses(mut self, long: PulseTiming, short: PulseTiming, short_count: u8) -> Self {
        self.long_pulse = long;
        self.short_pulse = short;
        self.short_pulse_count = short_count;
        self
    }

    pub const fn with_status_active_low(mut self, active_low: bool) -> Self {
        self.status_active_low = active_low;
        self
    }

    pub const fn with_sentinel(mut self, sentinel: SentinelPolicy) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub const fn with_bus_release(mut self, release: BusRelease) -> Self {
        self.bus_release = release;
        self
    }

    /// Check the configuration for values the node cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_period.half_us() == 0 {
            return Err(ConfigError::BitPeriodTooShort);
        }
        if self.banner.is_empty() {
            return Err(ConfigError::EmptyBanner);
        }
        if self.banner.contains(&SENTINEL) {
            return Err(ConfigError::SentinelInBanner);
        }
        if self.reply_prefix.is_empty() {
            return Err(ConfigError::EmptyReplyPrefix);
        }
        if self.reply_prefix.contains(&SENTINEL) {
            return Err(ConfigError::SentinelInReplyPrefix);
        }
        for pulse in [self.long_pulse, self.short_pulse] {
            if pulse.on_ms == 0 || pulse.off_ms == 0 {
                return Err(ConfigError::ZeroPulseTime);
            }
        }
        if self.short_pulse_count == 0 {
            return Err(ConfigError::ZeroShortPulseCount);
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new(b'0')
    }
}

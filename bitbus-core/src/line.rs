//! Bus line levels
//!
//! The external line driver inverts between pin and wire, so "active" on
//! the wire is a low pin here. The core only ever looks at the pin.

/// Level of a bus line, seen at the pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineLevel {
    /// Pin high: idle line, stop bit, data bit 1
    Idle,
    /// Pin low: start bit, data bit 0
    Active,
}

impl LineLevel {
    /// Level that carries a logical bit
    pub const fn for_bit(bit: bool) -> Self {
        if bit {
            LineLevel::Idle
        } else {
            LineLevel::Active
        }
    }

    /// Level read from a pin
    pub const fn from_pin(high: bool) -> Self {
        Self::for_bit(high)
    }

    /// Pin state that produces this level
    pub const fn is_pin_high(self) -> bool {
        matches!(self, LineLevel::Idle)
    }

    /// Logical bit carried by this level
    pub const fn bit(self) -> bool {
        self.is_pin_high()
    }
}

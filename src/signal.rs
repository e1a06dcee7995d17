use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::types::Voltage;

/// Two-valued logic level carried by every line in the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    #[default]
    Low,
    High,
}

impl Signal {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Signal::High
        } else {
            Signal::Low
        }
    }

    pub fn to_bool(self) -> bool {
        self == Signal::High
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Signal::Low => "Low",
            Signal::High => "High",
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Signal::Low => '0',
            Signal::High => '1',
        }
    }

    pub fn and(self, other: Signal) -> Signal {
        Signal::from_bool(self.to_bool() && other.to_bool())
    }

    pub fn or(self, other: Signal) -> Signal {
        Signal::from_bool(self.to_bool() || other.to_bool())
    }

    pub fn invert(self) -> Signal {
        Signal::from_bool(!self.to_bool())
    }

    /// Nominal TTL output voltage for this level.
    pub fn to_voltage(self) -> Voltage {
        match self {
            Signal::Low => Voltage::new(0.3),
            Signal::High => Voltage::new(4.5),
        }
    }
}

impl Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        self.invert()
    }
}

impl BitAnd for Signal {
    type Output = Signal;

    fn bitand(self, rhs: Signal) -> Signal {
        self.and(rhs)
    }
}

impl BitOr for Signal {
    type Output = Signal;

    fn bitor(self, rhs: Signal) -> Signal {
        self.or(rhs)
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        Signal::from_bool(value)
    }
}

impl From<Signal> for bool {
    fn from(value: Signal) -> Self {
        value.to_bool()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [Signal; 2] = [Signal::Low, Signal::High];

    #[test]
    fn test_signal_default_is_low() {
        assert_eq!(Signal::default(), Signal::Low);
    }

    #[test]
    fn test_boolean_algebra_matches_bool() {
        for a in LEVELS {
            assert_eq!(!a, Signal::from_bool(!a.to_bool()));
            for b in LEVELS {
                assert_eq!(a & b, Signal::from_bool(a.to_bool() && b.to_bool()));
                assert_eq!(a | b, Signal::from_bool(a.to_bool() || b.to_bool()));
            }
        }
    }

    #[test]
    fn test_signal_formatting() {
        assert_eq!(Signal::High.to_string(), "High");
        assert_eq!(Signal::Low.to_char(), '0');
        assert_eq!(Signal::High.to_char(), '1');
    }

    #[test]
    fn test_voltage_round_trip_through_thresholds() {
        for level in LEVELS {
            assert_eq!(level.to_voltage().to_signal().unwrap(), level);
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::signal::Signal;

/// Analogue level in volts, only meaningful at the board boundary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Voltage(f64);

impl Voltage {
    /// Highest input voltage still read as Low by a TTL input.
    pub const INPUT_LOW_MAX: f64 = 0.8;
    /// Lowest input voltage read as High by a TTL input.
    pub const INPUT_HIGH_MIN: f64 = 2.0;

    pub fn new(volts: f64) -> Self {
        Voltage(volts)
    }

    pub fn volts(&self) -> f64 {
        self.0
    }

    /// Convert to a logic level, failing for readings in the forbidden band.
    pub fn to_signal(self) -> Result<Signal, LevelError> {
        if !self.0.is_finite() {
            return Err(LevelError::Indeterminate(self));
        }
        if self.0 <= Self::INPUT_LOW_MAX {
            Ok(Signal::Low)
        } else if self.0 >= Self::INPUT_HIGH_MIN {
            Ok(Signal::High)
        } else {
            Err(LevelError::Indeterminate(self))
        }
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}V", self.0)
    }
}

impl From<f64> for Voltage {
    fn from(volts: f64) -> Self {
        Voltage::new(volts)
    }
}

impl TryFrom<Voltage> for Signal {
    type Error = LevelError;

    fn try_from(value: Voltage) -> Result<Self, Self::Error> {
        value.to_signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(Voltage::new(0.0).to_signal().unwrap(), Signal::Low);
        assert_eq!(Voltage::new(0.8).to_signal().unwrap(), Signal::Low);
        assert_eq!(Voltage::new(2.0).to_signal().unwrap(), Signal::High);
        assert_eq!(Voltage::new(5.0).to_signal().unwrap(), Signal::High);
    }

    #[test]
    fn test_forbidden_band_fails_fast() {
        let err = Voltage::new(1.4).to_signal().unwrap_err();
        assert!(matches!(err, LevelError::Indeterminate(v) if v.volts() == 1.4));
        assert!(Signal::try_from(Voltage::new(f64::NAN)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Voltage::new(4.5).to_string(), "4.50V");
    }
}

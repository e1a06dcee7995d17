use std::cell::Cell;

use crate::component::Component;
use crate::connection::Input;
use crate::error::LevelError;
use crate::line::Line;
use crate::signal::Signal;
use crate::types::Voltage;

/// Input must rise above this to switch the output High.
pub const THRESHOLD_HIGH: f64 = 4.2;
/// Input must fall below this to switch the output Low.
pub const THRESHOLD_LOW: f64 = 0.6;

/// One section of a 7414, the entry point for analogue levels.
///
/// Between the two thresholds the output holds its previous level, so a slowly
/// moving or bouncing input produces a single clean edge.
pub struct SchmittTrigger {
    name: String,
    level: Cell<Signal>,
    output: Line,
}

impl SchmittTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let output = Line::new(format!("{}.out", name));
        SchmittTrigger {
            name,
            level: Cell::new(Signal::Low),
            output,
        }
    }

    /// Feed an analogue reading and return the resulting output level.
    pub fn apply(&self, input: Voltage) -> Result<Signal, LevelError> {
        let volts = input.volts();
        if !volts.is_finite() {
            return Err(LevelError::Indeterminate(input));
        }

        let current = self.level.get();
        let next = match current {
            Signal::Low if volts > THRESHOLD_HIGH => Signal::High,
            Signal::High if volts < THRESHOLD_LOW => Signal::Low,
            held => held,
        };
        self.level.set(next);
        self.output.set_level(next);
        Ok(next)
    }

    pub fn output(&self) -> &Line {
        &self.output
    }
}

impl Component for SchmittTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("out", &self.output)]
    }
}

use std::cell::Cell;

use tracing::info;

use crate::component::Component;
use crate::connection::{Input, WiringRegistry};
use crate::error::WiringError;
use crate::line::Line;
use crate::signal::Signal;

/// Fixed ground and Vcc rails used to tie off inputs the circuit does not drive.
///
/// Vcc is High only while the supply is switched on; ground is always Low.
pub struct PowerSupply {
    name: String,
    ground: Line,
    vcc: Line,
    on: Cell<bool>,
}

impl PowerSupply {
    /// A supply that is already switched on.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let psu = PowerSupply {
            ground: Line::new(format!("{}.ground", name)),
            vcc: Line::new(format!("{}.vcc", name)),
            on: Cell::new(false),
            name,
        };
        psu.switch(true);
        psu
    }

    pub fn switch(&self, on: bool) {
        if self.on.replace(on) != on {
            info!(psu = %self.name, on, "power switched");
        }
        self.vcc.set_level(Signal::from_bool(on));
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn ground(&self) -> &Line {
        &self.ground
    }

    pub fn vcc(&self) -> &Line {
        &self.vcc
    }

    /// Solder each input to ground.
    pub fn tie_low(&self, registry: &mut WiringRegistry, inputs: &[&Input]) -> Result<(), WiringError> {
        registry.connect_all(&self.ground, inputs)
    }

    /// Solder each input to Vcc.
    pub fn tie_high(&self, registry: &mut WiringRegistry, inputs: &[&Input]) -> Result<(), WiringError> {
        registry.connect_all(&self.vcc, inputs)
    }
}

impl Component for PowerSupply {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("ground", &self.ground), ("vcc", &self.vcc)]
    }
}

//! XOR built from the four NAND gates of one 7400.
//!
//! ```text
//! in1 ──┬──────────┐
//!       │   g1     g2 ──┐
//!       ├── NAND ──┤     g4 ── out
//!       │          g3 ──┘
//! in2 ──┴──────────┘
//! g1 = NAND(in1, in2), g2 = NAND(in1, g1), g3 = NAND(g1, in2), out = NAND(g2, g3)
//! ```

use crate::component::Component;
use crate::connection::{Input, WiringRegistry};
use crate::error::WiringError;
use crate::line::Line;
use crate::signal::Signal;

use super::nand::{nand, Nand};

/// XOR of two levels computed the way the gate network computes it.
pub fn xor(a: Signal, b: Signal) -> Signal {
    let g1 = nand(a, b);
    let g2 = nand(a, g1);
    let g3 = nand(g1, b);
    nand(g2, g3)
}

pub struct Xor {
    name: String,
    input1: Input,
    input2: Input,
    in1_internal: Line,
    in2_internal: Line,
    gates: [Nand; 4],
}

impl Xor {
    pub fn new(name: impl Into<String>, registry: &mut WiringRegistry) -> Result<Self, WiringError> {
        let name = name.into();
        let in1_internal = Line::new(format!("{}.in1_internal", name));
        let in2_internal = Line::new(format!("{}.in2_internal", name));

        let gates = [
            Nand::new(format!("{}.g1", name), registry),
            Nand::new(format!("{}.g2", name), registry),
            Nand::new(format!("{}.g3", name), registry),
            Nand::new(format!("{}.g4", name), registry),
        ];
        let [g1, g2, g3, g4] = &gates;

        registry.connect_all(&in1_internal, &[g1.input1(), g2.input1()])?;
        registry.connect_all(&in2_internal, &[g1.input2(), g3.input2()])?;
        registry.connect_all(g1.output(), &[g2.input2(), g3.input1()])?;
        registry.connect(g2.output(), g4.input1())?;
        registry.connect(g3.output(), g4.input2())?;

        let internal = in1_internal.downgrade();
        let input1 = registry.declare(&name, "in1", move |level| internal.set_level(level));
        let internal = in2_internal.downgrade();
        let input2 = registry.declare(&name, "in2", move |level| internal.set_level(level));

        Ok(Xor {
            name,
            input1,
            input2,
            in1_internal,
            in2_internal,
            gates,
        })
    }

    pub fn input1(&self) -> &Input {
        &self.input1
    }

    pub fn input2(&self) -> &Input {
        &self.input2
    }

    pub fn output(&self) -> &Line {
        self.gates[3].output()
    }

    pub fn gates(&self) -> &[Nand; 4] {
        &self.gates
    }

    /// Levels on the internal input wires.
    pub fn input_levels(&self) -> (Signal, Signal) {
        (self.in1_internal.level(), self.in2_internal.level())
    }
}

impl Component for Xor {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        vec![&self.input1, &self.input2]
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("out", self.output())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::{High as H, Low as L};

    const TRUTH_TABLE: [(Signal, Signal, Signal); 4] =
        [(L, L, L), (L, H, H), (H, L, H), (H, H, L)];

    #[test]
    fn test_xor_function_truth_table() {
        for (a, b, expected) in TRUTH_TABLE {
            assert_eq!(xor(a, b), expected);
        }
    }

    #[test]
    fn test_internal_wiring_is_complete() {
        let mut registry = WiringRegistry::new();
        let xor = Xor::new("U3", &mut registry).unwrap();

        // 4 gates x 2 inputs inside, plus the two external ports
        assert_eq!(registry.declared_count(), 10);
        let unconnected: Vec<String> = registry.unconnected().iter().map(|h| h.to_string()).collect();
        assert_eq!(unconnected, vec!["U3.in1", "U3.in2"]);

        let levels: Vec<Signal> = xor.gates().iter().map(|g| g.output().level()).collect();
        assert_eq!(levels, vec![H, H, H, L]);
    }

    #[test]
    fn test_gate_network_settles_low_at_power_up() {
        let mut registry = WiringRegistry::new();
        let xor = Xor::new("U3", &mut registry).unwrap();
        assert_eq!(xor.output().level(), L);
    }

    #[test]
    fn test_gate_network_truth_table() {
        for (a, b, expected) in TRUTH_TABLE {
            let mut registry = WiringRegistry::new();
            let xor = Xor::new("U3", &mut registry).unwrap();
            let line_a = Line::new("a");
            let line_b = Line::new("b");
            registry.connect(&line_a, xor.input1()).unwrap();
            registry.connect(&line_b, xor.input2()).unwrap();

            line_a.set_level(a);
            line_b.set_level(b);

            assert_eq!(xor.input_levels(), (a, b));
            assert_eq!(xor.output().level(), expected, "XOR({a}, {b})");
        }
    }

    #[test]
    fn test_gate_network_follows_every_transition() {
        let mut registry = WiringRegistry::new();
        let xor = Xor::new("U3", &mut registry).unwrap();
        let line_a = Line::new("a");
        let line_b = Line::new("b");
        registry.connect(&line_a, xor.input1()).unwrap();
        registry.connect(&line_b, xor.input2()).unwrap();

        let sequence = [(H, L), (H, H), (L, H), (L, L), (H, H), (L, L)];
        for (a, b) in sequence {
            line_a.set_level(a);
            line_b.set_level(b);
            assert_eq!(xor.output().level(), xor_reference(a, b));
        }
    }

    fn xor_reference(a: Signal, b: Signal) -> Signal {
        Signal::from_bool(a.to_bool() != b.to_bool())
    }
}

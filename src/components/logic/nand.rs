use std::cell::RefCell;
use std::rc::Rc;

use crate::component::{stateful_input, Component};
use crate::connection::{Input, WiringRegistry};
use crate::line::Line;
use crate::signal::Signal;

/// One NAND gate, as in a quarter of a 7400.
pub fn nand(a: Signal, b: Signal) -> Signal {
    !(a & b)
}

#[derive(Debug, Default)]
struct NandState {
    input1: Signal,
    input2: Signal,
}

/// Two-input NAND gate driving its own output line.
pub struct Nand {
    name: String,
    state: Rc<RefCell<NandState>>,
    input1: Input,
    input2: Input,
    output: Line,
}

impl Nand {
    pub fn new(name: impl Into<String>, registry: &mut WiringRegistry) -> Self {
        let name = name.into();
        let output = Line::new(format!("{}.out", name));
        let state = Rc::new(RefCell::new(NandState::default()));

        let out = output.downgrade();
        let input1 = stateful_input(
            registry,
            &name,
            "in1",
            &state,
            |s, level| {
                s.input1 = level;
                nand(s.input1, s.input2)
            },
            move |value| out.set_level(value),
        );
        let out = output.downgrade();
        let input2 = stateful_input(
            registry,
            &name,
            "in2",
            &state,
            |s, level| {
                s.input2 = level;
                nand(s.input1, s.input2)
            },
            move |value| out.set_level(value),
        );

        // Both inputs start Low, so the gate powers up driving High.
        output.set_level(nand(Signal::Low, Signal::Low));

        Nand {
            name,
            state,
            input1,
            input2,
            output,
        }
    }

    pub fn input1(&self) -> &Input {
        &self.input1
    }

    pub fn input2(&self) -> &Input {
        &self.input2
    }

    pub fn output(&self) -> &Line {
        &self.output
    }

    /// Levels currently seen on (in1, in2).
    pub fn input_levels(&self) -> (Signal, Signal) {
        let s = self.state.borrow();
        (s.input1, s.input2)
    }
}

impl Component for Nand {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        vec![&self.input1, &self.input2]
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("out", &self.output)]
    }
}

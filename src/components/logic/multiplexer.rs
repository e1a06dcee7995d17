use std::cell::RefCell;
use std::rc::Rc;

use crate::component::{stateful_input, Component};
use crate::connection::{Input, WiringRegistry};
use crate::line::Line;
use crate::signal::Signal;

const DATA_PORTS: [&str; 4] = ["data0", "data1", "data2", "data3"];
const SELECT_PORTS: [&str; 2] = ["select0", "select1"];

/// One section of a 74153: `data[select]` while enable is Low, Low otherwise.
pub fn multiplexer(data: [Signal; 4], select0: Signal, select1: Signal, enable: Signal) -> Signal {
    if enable == Signal::High {
        return Signal::Low;
    }
    data[select_index(select0, select1)]
}

fn select_index(select0: Signal, select1: Signal) -> usize {
    (select0.to_bool() as usize) | ((select1.to_bool() as usize) << 1)
}

#[derive(Debug, Default)]
struct MuxState {
    data: [Signal; 4],
    select: [Signal; 2],
    enable: Signal,
}

impl MuxState {
    fn output(&self) -> Signal {
        multiplexer(self.data, self.select[0], self.select[1], self.enable)
    }
}

/// 4-to-1 multiplexer with an active-low enable.
pub struct Multiplexer {
    name: String,
    state: Rc<RefCell<MuxState>>,
    data: [Input; 4],
    select: [Input; 2],
    enable: Input,
    output: Line,
}

impl Multiplexer {
    pub fn new(name: impl Into<String>, registry: &mut WiringRegistry) -> Self {
        let name = name.into();
        let output = Line::new(format!("{}.out", name));
        let state = Rc::new(RefCell::new(MuxState::default()));

        // Every port recomputes; the output line drops non-changes such as
        // a data input that is not currently selected.
        let data = std::array::from_fn(|k| {
            let out = output.downgrade();
            stateful_input(
                registry,
                &name,
                DATA_PORTS[k],
                &state,
                move |s, level| {
                    s.data[k] = level;
                    s.output()
                },
                move |value| out.set_level(value),
            )
        });
        let select = std::array::from_fn(|bit| {
            let out = output.downgrade();
            stateful_input(
                registry,
                &name,
                SELECT_PORTS[bit],
                &state,
                move |s, level| {
                    s.select[bit] = level;
                    s.output()
                },
                move |value| out.set_level(value),
            )
        });
        let out = output.downgrade();
        let enable = stateful_input(
            registry,
            &name,
            "enable",
            &state,
            |s, level| {
                s.enable = level;
                s.output()
            },
            move |value| out.set_level(value),
        );

        output.set_level(state.borrow().output());

        Multiplexer {
            name,
            state,
            data,
            select,
            enable,
            output,
        }
    }

    pub fn data(&self, k: usize) -> &Input {
        &self.data[k]
    }

    pub fn select0(&self) -> &Input {
        &self.select[0]
    }

    pub fn select1(&self) -> &Input {
        &self.select[1]
    }

    /// Active-low enable.
    pub fn enable(&self) -> &Input {
        &self.enable
    }

    pub fn output(&self) -> &Line {
        &self.output
    }

    /// Currently selected data input, 0-3.
    pub fn selected(&self) -> usize {
        let s = self.state.borrow();
        select_index(s.select[0], s.select[1])
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enable == Signal::Low
    }
}

impl Component for Multiplexer {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        self.data
            .iter()
            .chain(self.select.iter())
            .chain(std::iter::once(&self.enable))
            .collect()
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("out", &self.output)]
    }
}

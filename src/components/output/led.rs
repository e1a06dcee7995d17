use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::connection::{Input, WiringRegistry};
use crate::line::Line;
use crate::signal::Signal;

/// Anything that wants to observe a level: a console printer, a GUI lamp, a test recorder.
pub trait LevelSink {
    fn on_level(&mut self, level: Signal);
}

impl<F> LevelSink for F
where
    F: FnMut(Signal),
{
    fn on_level(&mut self, level: Signal) {
        self(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedColor {
    Red,
    Yellow,
    Blue,
    Green,
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LedColor::Red => "red",
            LedColor::Yellow => "yellow",
            LedColor::Blue => "blue",
            LedColor::Green => "green",
        };
        write!(f, "{}", s)
    }
}

/// An LED hanging off a line. How it is shown is up to the sink.
pub struct Led {
    name: String,
    color: LedColor,
    lit: Rc<Cell<bool>>,
    anode: Input,
}

impl Led {
    pub fn new(
        name: impl Into<String>,
        color: LedColor,
        sink: impl LevelSink + 'static,
        registry: &mut WiringRegistry,
    ) -> Self {
        Self::with_boxed_sink(name, color, Box::new(sink), registry)
    }

    pub fn with_boxed_sink(
        name: impl Into<String>,
        color: LedColor,
        sink: Box<dyn LevelSink>,
        registry: &mut WiringRegistry,
    ) -> Self {
        let name = name.into();
        let lit = Rc::new(Cell::new(false));
        let sink = RefCell::new(sink);

        let lamp = lit.clone();
        let anode = registry.declare(&name, "anode", move |level| {
            lamp.set(level.to_bool());
            sink.borrow_mut().on_level(level);
        });

        Led {
            name,
            color,
            lit,
            anode,
        }
    }

    pub fn anode(&self) -> &Input {
        &self.anode
    }

    pub fn color(&self) -> LedColor {
        self.color
    }

    pub fn is_lit(&self) -> bool {
        self.lit.get()
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} LED is {}", self.name, if self.is_lit() { "ON" } else { "OFF" })
    }
}

impl Component for Led {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        vec![&self.anode]
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        Vec::new()
    }
}

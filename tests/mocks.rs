//! Recording helpers shared by the integration tests
//!
//! Tests include this file with `mod mocks;`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use nand_cpu::systems::one_bit_cpu::LedSinks;
use nand_cpu::{Line, Signal, WiringRegistry};

/// Collects every level delivered to it, in order.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Rc<RefCell<Vec<Signal>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback feeding this recorder, usable as an LED sink.
    pub fn sink(&self) -> impl FnMut(Signal) + 'static {
        let seen = self.seen.clone();
        move |level| seen.borrow_mut().push(level)
    }

    pub fn levels(&self) -> Vec<Signal> {
        self.seen.borrow().clone()
    }

    pub fn last(&self) -> Option<Signal> {
        self.seen.borrow().last().copied()
    }

    pub fn count(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

/// Solder a recording input to `line`. The recorder sees the current level first.
pub fn attach_recorder(registry: &mut WiringRegistry, name: &str, line: &Line) -> Recorder {
    let recorder = Recorder::new();
    let seen = recorder.seen.clone();
    let input = registry.declare(name, "rec", move |level| seen.borrow_mut().push(level));
    registry
        .connect(line, &input)
        .expect("recorder input is fresh");
    recorder
}

/// Recorders for the three board LEDs.
pub struct LedRecorders {
    pub register: Recorder,
    pub program_counter: Recorder,
    pub clock: Recorder,
}

impl LedRecorders {
    pub fn new() -> Self {
        LedRecorders {
            register: Recorder::new(),
            program_counter: Recorder::new(),
            clock: Recorder::new(),
        }
    }

    pub fn sinks(&self) -> LedSinks {
        LedSinks {
            register: Box::new(self.register.sink()),
            program_counter: Box::new(self.program_counter.sink()),
            clock: Box::new(self.clock.sink()),
        }
    }
}

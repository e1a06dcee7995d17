//! # Wiring registry
//!
//! Every element declares its inputs with a [`WiringRegistry`] when it is constructed. Soldering an
//! input to a [`Line`] goes through [`WiringRegistry::connect`], which marks the input connected and
//! subscribes it. [`WiringRegistry::audit`] consumes the registry and reports every input that was
//! declared but never connected, so a forgotten wire fails at startup instead of silently never
//! receiving a level.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::error::WiringError;
use crate::line::Line;
use crate::signal::Signal;

/// Callback invoked with the new level whenever the connected line changes.
pub type Slot = Rc<dyn Fn(Signal)>;

static NEXT_REGISTRY_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies one input port of one element instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputHandle {
    registry: usize,
    id: usize,
    element: String,
    port: String,
}

impl InputHandle {
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for InputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.port)
    }
}

/// A declared input: its handle plus the callback a line drives.
#[derive(Clone)]
pub struct Input {
    handle: InputHandle,
    slot: Slot,
}

impl Input {
    pub fn handle(&self) -> &InputHandle {
        &self.handle
    }

    pub(crate) fn slot(&self) -> Slot {
        self.slot.clone()
    }

    /// Drive the input directly, bypassing any line.
    pub fn deliver(&self, level: Signal) {
        (self.slot)(level)
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Input").field(&self.handle).finish()
    }
}

#[derive(Debug)]
struct InputRecord {
    handle: InputHandle,
    line: Option<String>,
}

/// Summary returned by a successful audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringSummary {
    pub inputs: usize,
    pub lines: usize,
}

/// Tracks every declared input and which line, if any, it is soldered to.
#[derive(Debug)]
pub struct WiringRegistry {
    id: usize,
    inputs: BTreeMap<usize, InputRecord>,
}

impl WiringRegistry {
    pub fn new() -> Self {
        WiringRegistry {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            inputs: BTreeMap::new(),
        }
    }

    /// Declare an input port, not yet connected.
    pub fn declare<F>(&mut self, element: &str, port: &str, slot: F) -> Input
    where
        F: Fn(Signal) + 'static,
    {
        let handle = InputHandle {
            registry: self.id,
            id: self.inputs.len(),
            element: element.to_string(),
            port: port.to_string(),
        };
        self.inputs.insert(
            handle.id,
            InputRecord {
                handle: handle.clone(),
                line: None,
            },
        );
        Input {
            handle,
            slot: Rc::new(slot),
        }
    }

    /// Solder `input` to `line`.
    ///
    /// The input immediately receives the line's current level, the way a freshly soldered pin
    /// sees whatever is already on the wire.
    pub fn connect(&mut self, line: &Line, input: &Input) -> Result<(), WiringError> {
        let record = self.record_mut(input.handle())?;
        if record.line.is_some() {
            return Err(WiringError::AlreadyConnected(input.handle().clone()));
        }
        line.subscribe(input)?;
        record.line = Some(line.name().to_string());
        debug!(line = line.name(), input = %input.handle(), "soldered");

        input.deliver(line.level());
        Ok(())
    }

    /// Solder several inputs to the same line, in order.
    pub fn connect_all(&mut self, line: &Line, inputs: &[&Input]) -> Result<(), WiringError> {
        for input in inputs {
            self.connect(line, input)?;
        }
        Ok(())
    }

    pub fn is_connected(&self, handle: &InputHandle) -> bool {
        handle.registry == self.id
            && self
                .inputs
                .get(&handle.id)
                .map(|r| r.line.is_some())
                .unwrap_or(false)
    }

    pub fn declared_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn connected_count(&self) -> usize {
        self.inputs.values().filter(|r| r.line.is_some()).count()
    }

    /// Declared inputs with no line, in declaration order.
    pub fn unconnected(&self) -> Vec<InputHandle> {
        self.inputs
            .values()
            .filter(|r| r.line.is_none())
            .map(|r| r.handle.clone())
            .collect()
    }

    /// Line name to the inputs soldered to it.
    pub fn netlist(&self) -> BTreeMap<String, Vec<InputHandle>> {
        let mut nets: BTreeMap<String, Vec<InputHandle>> = BTreeMap::new();
        for record in self.inputs.values() {
            if let Some(line) = &record.line {
                nets.entry(line.clone())
                    .or_default()
                    .push(record.handle.clone());
            }
        }
        nets
    }

    /// Startup gate: fail with every unconnected input at once.
    pub fn audit(self) -> Result<WiringSummary, WiringError> {
        let unconnected = self.unconnected();
        if !unconnected.is_empty() {
            return Err(WiringError::UnconnectedInputs(unconnected));
        }
        let summary = WiringSummary {
            inputs: self.inputs.len(),
            lines: self.netlist().len(),
        };
        info!(
            inputs = summary.inputs,
            lines = summary.lines,
            "wiring audit passed"
        );
        Ok(summary)
    }

    fn record_mut(&mut self, handle: &InputHandle) -> Result<&mut InputRecord, WiringError> {
        if handle.registry != self.id {
            return Err(WiringError::UnknownInputHandle(handle.clone()));
        }
        self.inputs
            .get_mut(&handle.id)
            .ok_or_else(|| WiringError::UnknownInputHandle(handle.clone()))
    }
}

impl Default for WiringRegistry {
    fn default() -> Self {
        Self::new()
    }
}

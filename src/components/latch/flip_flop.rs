//! # D flip-flop
//!
//! One half of a 7474: a rising-edge triggered D latch with asynchronous preset and clear.
//!
//! | preset | clear | Q    | Q̅    |                                  |
//! |--------|-------|------|------|----------------------------------|
//! | 0      | 0     | q    | ¬q   | q changes only on a rising edge  |
//! | 0      | 1     | Low  | High | forced clear                     |
//! | 1      | 0     | High | Low  | forced preset                    |
//! | 1      | 1     | High | High | invalid, logged                  |
//!
//! Preset and clear also load the latch, so after they are released the output keeps the forced
//! value until the next rising edge. Behaviour is composed, not inherited: anything that cares about
//! the outputs subscribes to the `q` and `q_inv` lines.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::component::{stateful_input, Component};
use crate::connection::{Input, WiringRegistry};
use crate::line::{Line, WeakLine};
use crate::signal::Signal;

/// Which row of the control table the flip-flop is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Clocked,
    Cleared,
    Preset,
    Invalid,
}

impl ControlState {
    pub fn from_bits(preset_active: bool, clear_active: bool) -> Self {
        match (preset_active, clear_active) {
            (false, false) => ControlState::Clocked,
            (false, true) => ControlState::Cleared,
            (true, false) => ControlState::Preset,
            (true, true) => ControlState::Invalid,
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlState::Clocked => "clocked",
            ControlState::Cleared => "cleared",
            ControlState::Preset => "preset",
            ControlState::Invalid => "invalid",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
struct FlipFlopState {
    name: String,
    preset_active: bool,
    clear_active: bool,
    data: Signal,
    latched: Signal,
    clock: Signal,
}

/// Levels to drive on (Q, Q̅), or nothing.
type Drive = Option<(Signal, Signal)>;

impl FlipFlopState {
    fn control(&self) -> ControlState {
        ControlState::from_bits(self.preset_active, self.clear_active)
    }

    fn outputs(&self) -> (Signal, Signal) {
        match self.control() {
            ControlState::Clocked => (self.latched, !self.latched),
            ControlState::Cleared => (Signal::Low, Signal::High),
            ControlState::Preset => (Signal::High, Signal::Low),
            ControlState::Invalid => (Signal::High, Signal::High),
        }
    }

    fn set_data(&mut self, level: Signal) -> Drive {
        self.data = level;
        None
    }

    fn set_clock(&mut self, level: Signal) -> Drive {
        let rising = self.clock == Signal::Low && level == Signal::High;
        self.clock = level;
        if !rising || self.control() != ControlState::Clocked {
            return None;
        }
        self.latched = self.data;
        debug!(flip_flop = %self.name, q = %self.latched, "latched on rising edge");
        Some(self.outputs())
    }

    fn set_preset(&mut self, active: bool) -> Drive {
        self.preset_active = active;
        self.apply_controls()
    }

    fn set_clear(&mut self, active: bool) -> Drive {
        self.clear_active = active;
        self.apply_controls()
    }

    fn apply_controls(&mut self) -> Drive {
        match self.control() {
            ControlState::Preset => self.latched = Signal::High,
            ControlState::Cleared => self.latched = Signal::Low,
            ControlState::Invalid => {
                warn!(
                    flip_flop = %self.name,
                    "preset and clear asserted together, both outputs forced High"
                );
            }
            ControlState::Clocked => {}
        }
        Some(self.outputs())
    }
}

fn drive_pair(q: &WeakLine, q_inv: &WeakLine, drive: Drive) {
    if let Some((level, level_inv)) = drive {
        q.set_level(level);
        q_inv.set_level(level_inv);
    }
}

/// Edge-triggered D flip-flop with active-high asynchronous preset and clear inputs.
pub struct FlipFlop {
    name: String,
    state: Rc<RefCell<FlipFlopState>>,
    data: Input,
    clock: Input,
    preset: Input,
    clear: Input,
    q: Line,
    q_inv: Line,
}

impl FlipFlop {
    pub fn new(name: impl Into<String>, registry: &mut WiringRegistry) -> Self {
        let name = name.into();
        let q = Line::new(format!("{}.q", name));
        let q_inv = Line::new(format!("{}.q_inv", name));
        let state = Rc::new(RefCell::new(FlipFlopState {
            name: name.clone(),
            preset_active: false,
            clear_active: false,
            data: Signal::Low,
            latched: Signal::Low,
            clock: Signal::Low,
        }));

        let mut port = |port_name: &str, update: fn(&mut FlipFlopState, Signal) -> Drive| {
            let (q, q_inv) = (q.downgrade(), q_inv.downgrade());
            stateful_input(registry, &name, port_name, &state, update, move |drive| {
                drive_pair(&q, &q_inv, drive)
            })
        };
        let data = port("data", |s, level| s.set_data(level));
        let clock = port("clock", |s, level| s.set_clock(level));
        let preset = port("preset", |s, level| s.set_preset(level.to_bool()));
        let clear = port("clear", |s, level| s.set_clear(level.to_bool()));

        let (level, level_inv) = state.borrow().outputs();
        q.set_level(level);
        q_inv.set_level(level_inv);

        FlipFlop {
            name,
            state,
            data,
            clock,
            preset,
            clear,
            q,
            q_inv,
        }
    }

    pub fn data(&self) -> &Input {
        &self.data
    }

    pub fn clock(&self) -> &Input {
        &self.clock
    }

    pub fn preset(&self) -> &Input {
        &self.preset
    }

    pub fn clear(&self) -> &Input {
        &self.clear
    }

    pub fn q(&self) -> &Line {
        &self.q
    }

    pub fn q_inv(&self) -> &Line {
        &self.q_inv
    }

    pub fn control_state(&self) -> ControlState {
        self.state.borrow().control()
    }

    /// Level waiting on the D input for the next rising edge.
    pub fn pending_data(&self) -> Signal {
        self.state.borrow().data
    }
}

impl Component for FlipFlop {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        vec![&self.data, &self.clock, &self.preset, &self.clear]
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("q", &self.q), ("q_inv", &self.q_inv)]
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use Signal::{High as H, Low as L};

    struct Bench {
        ff: FlipFlop,
        data: Line,
        clock: Line,
        preset: Line,
        clear: Line,
    }

    fn bench() -> Bench {
        let mut registry = WiringRegistry::new();
        let ff = FlipFlop::new("U2A", &mut registry);
        let bench = Bench {
            data: Line::new("d"),
            clock: Line::new("clk"),
            preset: Line::new("pre"),
            clear: Line::new("clr"),
            ff,
        };
        registry.connect(&bench.data, bench.ff.data()).unwrap();
        registry.connect(&bench.clock, bench.ff.clock()).unwrap();
        registry.connect(&bench.preset, bench.ff.preset()).unwrap();
        registry.connect(&bench.clear, bench.ff.clear()).unwrap();
        registry.audit().unwrap();
        bench
    }

    fn outputs(b: &Bench) -> (Signal, Signal) {
        (b.ff.q().level(), b.ff.q_inv().level())
    }

    #[test]
    fn test_powers_up_cleared() {
        let b = bench();
        assert_eq!(outputs(&b), (L, H));
        assert_eq!(b.ff.control_state(), ControlState::Clocked);
    }

    #[test]
    fn test_data_alone_does_not_change_output() {
        let b = bench();
        b.data.set_level(H);
        assert_eq!(outputs(&b), (L, H));
        assert_eq!(b.ff.pending_data(), H);
    }

    #[test]
    fn test_rising_edge_latches_data() {
        let b = bench();
        b.data.set_level(H);
        b.clock.set_level(H);
        assert_eq!(outputs(&b), (H, L));

        b.data.set_level(L);
        assert_eq!(outputs(&b), (H, L));
    }

    #[test]
    fn test_falling_edge_never_changes_output() {
        let b = bench();
        b.clock.set_level(H);
        b.data.set_level(H);
        b.clock.set_level(L);
        assert_eq!(outputs(&b), (L, H));

        b.clock.set_level(H);
        assert_eq!(outputs(&b), (H, L));
    }

    #[test]
    fn test_clear_forces_low_regardless_of_clock_and_data() {
        for clock in [L, H] {
            let b = bench();
            b.data.set_level(H);
            b.clock.set_level(H);
            b.clock.set_level(clock);

            b.clear.set_level(H);
            assert_eq!(outputs(&b), (L, H));
            assert_eq!(b.ff.control_state(), ControlState::Cleared);
        }
    }

    #[test]
    fn test_preset_forces_high_regardless_of_clock_and_data() {
        for data in [L, H] {
            for clock in [L, H] {
                let b = bench();
                b.data.set_level(data);
                b.clock.set_level(H);
                b.clock.set_level(clock);
                assert_eq!(outputs(&b), (data, !data));

                b.preset.set_level(H);
                assert_eq!(outputs(&b), (H, L));
                assert_eq!(b.ff.control_state(), ControlState::Preset);
            }
        }
    }

    #[test]
    fn test_clock_ignored_while_forced() {
        let b = bench();
        b.clear.set_level(H);
        b.data.set_level(H);
        b.clock.set_level(H);
        assert_eq!(outputs(&b), (L, H));
    }

    #[test]
    fn test_forced_value_held_after_release() {
        let b = bench();
        b.preset.set_level(H);
        b.preset.set_level(L);
        assert_eq!(outputs(&b), (H, L));

        b.clock.set_level(H);
        assert_eq!(outputs(&b), (L, H));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_preset_and_clear_together_logs_warning() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let b = bench();
            b.preset.set_level(H);
            assert!(!logs.text().contains("preset and clear asserted together"));
            b.clear.set_level(H);
        });

        let text = logs.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("preset and clear asserted together"));
    }

    #[test]
    fn test_preset_and_clear_together_is_invalid_but_defined() {
        let b = bench();
        b.preset.set_level(H);
        b.clear.set_level(H);
        assert_eq!(b.ff.control_state(), ControlState::Invalid);
        assert_eq!(outputs(&b), (H, H));

        b.preset.set_level(L);
        assert_eq!(outputs(&b), (L, H));
    }

    #[test]
    fn test_feedback_into_own_data_input() {
        // Q̅ -> D makes a divide-by-two counter.
        let mut registry = WiringRegistry::new();
        let ff = FlipFlop::new("U2B", &mut registry);
        let clock = Line::new("clk");
        let ground = Line::new("gnd");
        registry.connect(ff.q_inv(), ff.data()).unwrap();
        registry.connect(&clock, ff.clock()).unwrap();
        registry.connect_all(&ground, &[ff.preset(), ff.clear()]).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            clock.set_level(H);
            seen.push(ff.q().level());
            clock.set_level(L);
        }
        assert_eq!(seen, vec![H, L, H, L]);
    }
}

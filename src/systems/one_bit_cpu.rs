//! # The 1-bit computer
//!
//! Solders the board sections together:
//!
//! - the clock drives the register and program-counter flip-flops (register first) and an LED
//! - the register output feeds the XOR, the ALU multiplexer and an LED
//! - the program counter addresses the program store; its inverted output is the "next address"
//! - the program store's opcode selects between the XOR result and the old register value (ALU),
//!   and between the next address and the operand (address pointer)
//! - a reset push-button, debounced by a Schmitt trigger, clears both flip-flops
//!
//! Every input the circuit does not drive is tied to ground, and the wiring audit runs before the
//! board is handed out, so a board that exists is a fully soldered one.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::component::Component;
use crate::components::clock::generic_clock::Clock;
use crate::components::latch::flip_flop::FlipFlop;
use crate::components::logic::multiplexer::Multiplexer;
use crate::components::logic::schmitt_trigger::SchmittTrigger;
use crate::components::logic::xor::Xor;
use crate::components::memory::program_store::{InstructionWord, ProgramStore};
use crate::components::output::led::{Led, LedColor, LevelSink};
use crate::components::power::psu::PowerSupply;
use crate::connection::{WiringRegistry, WiringSummary};
use crate::error::{LevelError, ProgramError, SimError};
use crate::signal::Signal;
use crate::types::Voltage;

/// Number of words addressable by the 1-bit program counter.
pub const PROGRAM_SIZE: usize = 2;

/// Observers for the three board LEDs.
pub struct LedSinks {
    pub register: Box<dyn LevelSink>,
    pub program_counter: Box<dyn LevelSink>,
    pub clock: Box<dyn LevelSink>,
}

impl Default for LedSinks {
    fn default() -> Self {
        LedSinks {
            register: Box::new(|_: Signal| {}),
            program_counter: Box::new(|_: Signal| {}),
            clock: Box::new(|_: Signal| {}),
        }
    }
}

/// Snapshot of the architecturally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub clock: Signal,
    pub register: Signal,
    pub program_counter: Signal,
    pub instruction: InstructionWord,
    pub ticks: u64,
}

impl fmt::Display for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {:>4}  clk={}  reg={}  pc={}  next: {}",
            self.ticks,
            self.clock.to_char(),
            self.register.to_char(),
            self.program_counter.to_char(),
            self.instruction
        )
    }
}

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub name: String,
    pub component_count: usize,
    pub wiring: WiringSummary,
    pub half_period: Duration,
    pub program: Vec<String>,
}

pub struct OneBitCpu {
    psu: PowerSupply,
    clock: Clock,
    reset_button: SchmittTrigger,
    register: FlipFlop,
    prog_counter: FlipFlop,
    rom: ProgramStore,
    xor: Xor,
    alu: Multiplexer,
    addr_ptr: Multiplexer,
    register_led: Led,
    pc_led: Led,
    clock_led: Led,
    wiring: WiringSummary,
}

impl OneBitCpu {
    /// Build, solder and audit the board.
    pub fn new(
        half_period: Duration,
        program: Vec<InstructionWord>,
        sinks: LedSinks,
    ) -> Result<Self, SimError> {
        if program.len() != PROGRAM_SIZE {
            return Err(ProgramError::WrongLength {
                expected: PROGRAM_SIZE,
                actual: program.len(),
            }
            .into());
        }

        let mut registry = WiringRegistry::new();
        let r = &mut registry;

        let psu = PowerSupply::new("psu");
        let clock = Clock::new("clock", half_period);
        let reset_button = SchmittTrigger::new("reset");
        let register = FlipFlop::new("register", r);
        let prog_counter = FlipFlop::new("prog_counter", r);
        let rom = ProgramStore::new("rom", program, r)?;
        let xor = Xor::new("xor", r)?;
        let alu = Multiplexer::new("alu", r);
        let addr_ptr = Multiplexer::new("addr_ptr", r);
        let register_led = Led::with_boxed_sink("Reg", LedColor::Red, sinks.register, r);
        let pc_led = Led::with_boxed_sink("PC", LedColor::Yellow, sinks.program_counter, r);
        let clock_led = Led::with_boxed_sink("Clock", LedColor::Blue, sinks.clock, r);

        // Inputs nothing drives.
        psu.tie_low(
            r,
            &[
                register.preset(),
                prog_counter.preset(),
                alu.data(2),
                alu.data(3),
                alu.select1(),
                alu.enable(),
                addr_ptr.data(2),
                addr_ptr.data(3),
                addr_ptr.select1(),
                addr_ptr.enable(),
            ],
        )?;

        r.connect_all(reset_button.output(), &[register.clear(), prog_counter.clear()])?;

        // The register must latch before the program counter moves the ROM under it.
        r.connect_all(
            clock.output(),
            &[register.clock(), prog_counter.clock(), clock_led.anode()],
        )?;

        r.connect_all(
            register.q(),
            &[xor.input1(), alu.data(1), register_led.anode()],
        )?;

        r.connect_all(prog_counter.q(), &[rom.address_input(0), pc_led.anode()])?;
        r.connect(prog_counter.q_inv(), addr_ptr.data(0))?;

        r.connect_all(rom.operand(), &[xor.input2(), addr_ptr.data(1)])?;
        r.connect_all(rom.opcode(), &[alu.select0(), addr_ptr.select0()])?;

        r.connect(xor.output(), alu.data(0))?;
        r.connect(alu.output(), register.data())?;
        r.connect(addr_ptr.output(), prog_counter.data())?;

        let wiring = registry.audit()?;

        let cpu = OneBitCpu {
            psu,
            clock,
            reset_button,
            register,
            prog_counter,
            rom,
            xor,
            alu,
            addr_ptr,
            register_led,
            pc_led,
            clock_led,
            wiring,
        };
        info!(program = %cpu.rom.listing().join(", "), "board assembled");
        Ok(cpu)
    }

    /// Advance the clock by one half period.
    pub fn tick(&mut self) -> Signal {
        let level = self.clock.tick();
        debug!(state = %self.state(), "tick");
        level
    }

    /// Execute one instruction: a full clock period.
    pub fn step(&mut self) -> CpuState {
        self.clock.pulse();
        let state = self.state();
        debug!(%state, "step");
        state
    }

    /// Run the clock in real time until stopped or `limit` half periods have passed.
    pub async fn run(&mut self, stop: watch::Receiver<bool>, limit: Option<u64>) -> u64 {
        self.clock.run(stop, limit).await
    }

    /// Rewrite the program; takes effect immediately, even mid-run.
    pub fn burn(&self, program: Vec<InstructionWord>) -> Result<(), ProgramError> {
        self.rom.burn(program)
    }

    /// Push and release the reset button.
    pub fn press_reset(&self) -> Result<(), LevelError> {
        self.reset_button.apply(Signal::High.to_voltage())?;
        self.reset_button.apply(Signal::Low.to_voltage())?;
        info!("reset");
        Ok(())
    }

    /// Drive the reset button input with an analogue level; returns the debounced level.
    pub fn apply_reset_voltage(&self, voltage: Voltage) -> Result<Signal, LevelError> {
        self.reset_button.apply(voltage)
    }

    pub fn register(&self) -> Signal {
        self.register.q().level()
    }

    pub fn program_counter(&self) -> Signal {
        self.prog_counter.q().level()
    }

    pub fn current_instruction(&self) -> InstructionWord {
        self.rom.current_instruction()
    }

    pub fn state(&self) -> CpuState {
        CpuState {
            clock: self.clock.level(),
            register: self.register(),
            program_counter: self.program_counter(),
            instruction: self.current_instruction(),
            ticks: self.clock.ticks(),
        }
    }

    /// LED name and whether it is lit.
    pub fn leds(&self) -> Vec<(&str, LedColor, bool)> {
        [&self.register_led, &self.pc_led, &self.clock_led]
            .into_iter()
            .map(|led| (led.name(), led.color(), led.is_lit()))
            .collect()
    }

    pub fn power(&self) -> &PowerSupply {
        &self.psu
    }

    pub fn components(&self) -> Vec<&dyn Component> {
        vec![
            &self.psu as &dyn Component,
            &self.clock,
            &self.reset_button,
            &self.register,
            &self.prog_counter,
            &self.rom,
            &self.xor,
            &self.alu,
            &self.addr_ptr,
            &self.register_led,
            &self.pc_led,
            &self.clock_led,
        ]
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            name: "OneBitCpu".to_string(),
            component_count: self.components().len(),
            wiring: self.wiring.clone(),
            half_period: self.clock.half_period(),
            program: self.rom.listing(),
        }
    }
}

//! # NAND CPU
//!
//! A discrete-event simulator for a 1-bit computer built from NAND gates, D flip-flops and
//! 4-to-1 multiplexers.
//!
//! This library provides:
//! - Named lines that propagate level changes synchronously to the inputs soldered to them
//! - A wiring registry that audits the board for unconnected inputs before it runs
//! - Gate-level models of the board's ICs, composed from NAND where the hardware is
//! - A clock that can be stepped by hand or run in real time on a tokio runtime
//! - JSON board configuration and a terminal LED renderer

pub mod component;
pub mod components;
pub mod connection;
pub mod console;
pub mod error;
pub mod line;
pub mod signal;
pub mod system_config;
pub mod systems;
pub mod types;

// Re-export commonly used items for easier importing
pub use component::Component;
pub use connection::{Input, InputHandle, WiringRegistry, WiringSummary};
pub use error::{ConfigError, LevelError, ProgramError, SimError, WiringError};
pub use line::Line;
pub use signal::Signal;
pub use system_config::BoardConfig;
pub use systems::one_bit_cpu::OneBitCpu;
pub use types::Voltage;

// Latch components module
pub mod flip_flop;

pub use flip_flop::{ControlState, FlipFlop};

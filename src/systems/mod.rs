// Complete boards assembled from components
pub mod one_bit_cpu;

pub use one_bit_cpu::{CpuState, LedSinks, OneBitCpu, SystemInfo, PROGRAM_SIZE};

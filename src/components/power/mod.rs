// Power components module
pub mod psu;

pub use psu::PowerSupply;

// Board components, grouped by the kind of IC they model
pub mod clock;
pub mod latch;
pub mod logic;
pub mod memory;
pub mod output;
pub mod power;

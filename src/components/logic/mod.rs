// Combinational logic components module
pub mod multiplexer;
pub mod nand;
pub mod schmitt_trigger;
pub mod xor;

pub use multiplexer::Multiplexer;
pub use nand::Nand;
pub use schmitt_trigger::SchmittTrigger;
pub use xor::Xor;

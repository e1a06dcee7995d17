// Memory components module
pub mod program_store;

pub use program_store::{InstructionWord, Opcode, ProgramStore};

//! Error types for the board simulation.
//!
//! Wiring problems are startup-fatal and reported together by the wiring audit. Analogue levels that
//! cannot be read as logic levels fail at the conversion boundary. The flip-flop's invalid
//! preset+clear state is not an error: it is logged and simulation continues.

use std::fmt;

use crate::connection::InputHandle;
use crate::types::Voltage;

/// Errors raised by the wiring registry and by line subscription.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WiringError {
    /// Declared inputs that were never soldered to a line
    #[error("{} input(s) not connected: {}", .0.len(), HandleList(.0))]
    UnconnectedInputs(Vec<InputHandle>),

    /// The input is already soldered to a line
    #[error("input {0} already connected to an output")]
    AlreadyConnected(InputHandle),

    /// The input was not declared with this registry
    #[error("input {0} was not declared with this wiring registry")]
    UnknownInputHandle(InputHandle),

    /// The input is already a subscriber of this line
    #[error("input {handle} already subscribed to line {line}")]
    DuplicateSubscription { line: String, handle: InputHandle },
}

/// Errors raised when loading or decoding a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("program has {actual} word(s), the store holds exactly {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("program store size {0} is not a non-zero power of two")]
    InvalidSize(usize),

    #[error("unknown instruction mnemonic: {0}")]
    UnknownMnemonic(String),
}

/// Analogue-to-digital conversion failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    #[error("{0} is neither a valid Low nor a valid High input level")]
    Indeterminate(Voltage),
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Top-level error for building and running a board.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Wiring(#[from] WiringError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct HandleList<'a>(&'a [InputHandle]);

impl fmt::Display for HandleList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, handle) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", handle)?;
        }
        Ok(())
    }
}

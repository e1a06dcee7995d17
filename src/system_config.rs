//! # JSON board configuration
//!
//! The board layout itself is fixed; what varies between runs is the clock speed, the program
//! burnt into the dip switches and how the run is observed.
//!
//! ```json
//! {
//!   "name": "one_bit_cpu",
//!   "description": "XOR the register with 0, then with 1, forever",
//!   "half_period_ms": 1000,
//!   "program": ["XOR 0", "XOR 1"],
//!   "max_ticks": 16,
//!   "log_level": "info",
//!   "console": { "enabled": true, "color": true }
//! }
//! ```
//!
//! Every field is optional; missing fields take the values of [`BoardConfig::default`].

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::components::memory::program_store::InstructionWord;
use crate::console::ConsoleConfig;
use crate::error::{ConfigError, ProgramError, SimError};
use crate::systems::one_bit_cpu::{LedSinks, OneBitCpu, PROGRAM_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub name: String,
    pub description: String,
    pub half_period_ms: u64,
    pub program: Vec<String>,
    pub max_ticks: Option<u64>,
    pub log_level: String,
    pub console: ConsoleConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "one_bit_cpu".to_string(),
            description: String::new(),
            half_period_ms: 1000,
            program: vec!["XOR 0".to_string(), "XOR 1".to_string()],
            max_ticks: None,
            log_level: "info".to_string(),
            console: ConsoleConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_period_ms == 0 {
            return Err(ConfigError::Invalid("half_period_ms must be positive".to_string()));
        }
        let words = self.program_words()?;
        if words.len() != PROGRAM_SIZE {
            return Err(ProgramError::WrongLength {
                expected: PROGRAM_SIZE,
                actual: words.len(),
            }
            .into());
        }
        self.log_level()?;
        Ok(())
    }

    pub fn program_words(&self) -> Result<Vec<InstructionWord>, ProgramError> {
        self.program.iter().map(|w| w.parse()).collect()
    }

    pub fn half_period(&self) -> Duration {
        Duration::from_millis(self.half_period_ms)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level: {}", self.log_level)))
    }

    /// Assemble and audit the board this configuration describes.
    pub fn build(&self, sinks: LedSinks) -> Result<OneBitCpu, SimError> {
        self.validate()?;
        OneBitCpu::new(self.half_period(), self.program_words()?, sinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BoardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.half_period(), Duration::from_secs(1));
        assert_eq!(config.log_level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json_str(r#"{ "program": ["JMP 1", "XOR 1"] }"#).unwrap();
        assert_eq!(config.half_period_ms, 1000);
        assert_eq!(
            config.program_words().unwrap(),
            vec!["JMP 1".parse().unwrap(), "XOR 1".parse().unwrap()]
        );
        assert!(config.console.enabled);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            r#"{ "half_period_ms": 0 }"#,
            r#"{ "program": ["XOR 0"] }"#,
            r#"{ "program": ["ADD 0", "XOR 0"] }"#,
            r#"{ "log_level": "loud" }"#,
        ];
        for json in cases {
            assert!(BoardConfig::from_json_str(json).is_err(), "{json} should be rejected");
        }
        assert!(matches!(
            BoardConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = BoardConfig {
            max_ticks: Some(8),
            ..BoardConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(BoardConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_build_board() {
        let cpu = BoardConfig::default().build(LedSinks::default()).unwrap();
        assert_eq!(cpu.system_info().program, vec!["XOR 0", "XOR 1"]);
    }
}

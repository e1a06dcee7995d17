//! # Console output
//!
//! Renders the board LEDs and the per-tick CPU state on a terminal. This is one possible
//! [`LevelSink`]; nothing in the simulation depends on it.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::components::output::led::{LedColor, LevelSink};
use crate::signal::Signal;
use crate::systems::one_bit_cpu::{CpuState, LedSinks};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: true,
        }
    }
}

fn terminal_color(color: LedColor) -> Color {
    match color {
        LedColor::Red => Color::Red,
        LedColor::Yellow => Color::Yellow,
        LedColor::Blue => Color::Blue,
        LedColor::Green => Color::Green,
    }
}

/// Prints `<name> LED is ON/OFF` whenever the LED's line changes.
pub struct ConsoleLed<W: Write> {
    name: String,
    color: LedColor,
    use_color: bool,
    out: W,
}

impl<W: Write> ConsoleLed<W> {
    pub fn new(name: impl Into<String>, color: LedColor, use_color: bool, out: W) -> Self {
        Self {
            name: name.into(),
            color,
            use_color,
            out,
        }
    }

    pub fn render(&self, level: Signal) -> String {
        let state = if level.to_bool() { "ON" } else { "OFF" };
        if self.use_color && level.to_bool() {
            format!("{} LED is {}", self.name, state.with(terminal_color(self.color)).bold())
        } else {
            format!("{} LED is {}", self.name, state)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LevelSink for ConsoleLed<W> {
    fn on_level(&mut self, level: Signal) {
        let line = self.render(level);
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(led = %self.name, error = %e, "failed to write LED state");
        }
    }
}

/// LED sinks for the board according to `config`.
pub fn console_sinks(config: &ConsoleConfig) -> LedSinks {
    if !config.enabled {
        return LedSinks::default();
    }
    let led = |name: &str, color: LedColor| -> Box<dyn LevelSink> {
        Box::new(ConsoleLed::new(name, color, config.color, io::stdout()))
    };
    LedSinks {
        register: led("Reg", LedColor::Red),
        program_counter: led("PC", LedColor::Yellow),
        clock: led("Clock", LedColor::Blue),
    }
}

/// One status line for the CPU state.
pub fn render_state(state: &CpuState, use_color: bool) -> String {
    let text = state.to_string();
    if use_color {
        text.with(Color::Cyan).to_string()
    } else {
        text
    }
}

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, trace};

use crate::component::Component;
use crate::connection::Input;
use crate::line::Line;
use crate::signal::Signal;

/// Free-running square-wave generator, the astable multivibrator of the board.
///
/// The clock is the only source of forward progress: each toggle performs one full synchronous
/// propagation pass before the clock suspends again, so passes never overlap.
pub struct Clock {
    name: String,
    half_period: Duration,
    output: Line,
    ticks: u64,
}

/// Cancels a running [`Clock::run`]. Dropping it stops the clock too.
pub struct ClockStopper {
    sender: watch::Sender<bool>,
}

impl ClockStopper {
    pub fn stop(&self) {
        // send only fails once the clock side is gone, which is already stopped
        let _ = self.sender.send(true);
    }
}

/// Create a stopper and the receiver to hand to [`Clock::run`].
pub fn stop_channel() -> (ClockStopper, watch::Receiver<bool>) {
    let (sender, receiver) = watch::channel(false);
    (ClockStopper { sender }, receiver)
}

impl Clock {
    pub fn new(name: impl Into<String>, half_period: Duration) -> Self {
        let name = name.into();
        let output = Line::new(format!("{}.out", name));
        Clock {
            name,
            half_period,
            output,
            ticks: 0,
        }
    }

    /// Clock with a 50% duty cycle at `frequency` Hz.
    pub fn from_frequency(name: impl Into<String>, frequency: f64) -> Self {
        Self::new(name, Self::frequency_to_half_period(frequency))
    }

    fn frequency_to_half_period(frequency: f64) -> Duration {
        if frequency <= 0.0 || !frequency.is_finite() {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(0.5 / frequency)
        }
    }

    pub fn output(&self) -> &Line {
        &self.output
    }

    pub fn level(&self) -> Signal {
        self.output.level()
    }

    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    /// Toggles performed since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Toggle once and propagate synchronously. Returns the new level.
    pub fn tick(&mut self) -> Signal {
        let level = !self.output.level();
        self.ticks += 1;
        trace!(clock = %self.name, tick = self.ticks, %level, "tick");
        self.output.set_level(level);
        level
    }

    /// One full period: a rising edge followed by a falling edge.
    pub fn pulse(&mut self) {
        if self.level() == Signal::High {
            self.tick();
        }
        self.tick();
        self.tick();
    }

    /// Toggle every half period until stopped, or until `limit` toggles have been made.
    ///
    /// Returns the number of toggles made by this call. Suspension happens only between toggles.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>, limit: Option<u64>) -> u64 {
        info!(clock = %self.name, half_period = ?self.half_period, "clock started");
        let mut made = 0;

        while limit.map_or(true, |limit| made < limit) {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = sleep(self.half_period) => {
                    self.tick();
                    made += 1;
                }
            }
        }

        info!(clock = %self.name, ticks = made, "clock stopped");
        made
    }
}

impl Component for Clock {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("out", &self.output)]
    }
}

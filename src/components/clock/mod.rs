// Clock components module
pub mod generic_clock;

pub use generic_clock::{stop_channel, Clock, ClockStopper};

// Output components module
pub mod led;

pub use led::{Led, LedColor, LevelSink};

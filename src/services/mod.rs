// src/services/mod.rs

//! Lottery services: season generation, winner draws and their helpers.

pub mod random;
pub mod report;
pub mod schedule;
pub mod seasons;
pub mod winners;

// Re-export for convenience
pub use random::RandomSource;
pub use report::{Email, WinnerReport};
pub use schedule::CycleSchedule;
pub use seasons::{SeasonGenerator, season_letter};
pub use winners::WinnerPicker;

// src/services/schedule.rs

//! Bi-weekly cycle gate for scheduled handlers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::ScheduleConfig;

/// Cycle of `cycle_days` starting at `origin` (midnight UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSchedule {
    origin: NaiveDate,
    cycle_days: i64,
}

impl CycleSchedule {
    pub fn new(origin: NaiveDate, cycle_days: i64) -> Self {
        Self {
            origin,
            cycle_days: cycle_days.max(1),
        }
    }

    /// Whole days elapsed since the origin, floored.
    pub fn day_index(&self, now: DateTime<Utc>) -> i64 {
        let origin = self.origin.and_time(NaiveTime::MIN).and_utc();
        (now - origin).num_seconds().div_euclid(86_400)
    }

    pub fn is_cycle_day(&self, now: DateTime<Utc>) -> bool {
        self.day_index(now).rem_euclid(self.cycle_days) == 0
    }
}

impl From<&ScheduleConfig> for CycleSchedule {
    fn from(config: &ScheduleConfig) -> Self {
        Self::new(config.origin, config.cycle_days)
    }
}

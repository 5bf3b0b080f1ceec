//! Day/night cycle.
//!
//! The clock is a continuous `[0, 1)` phase over a configured day length,
//! advanced by simulation time (never by the wall clock, so tests can step
//! it freely). Phase boundaries follow the fixed table: night below 0.20,
//! dawn 0.20-0.25, day 0.25-0.70, dusk 0.70-0.75, night from 0.75.

use serde::{Deserialize, Serialize};

/// Named phase of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum DayPhase {
    Night,
    Dawn,
    Day,
    Dusk,
}

/// Snapshot of the current time of day, broadcast to clients every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDay {
    /// Position within the day cycle, `[0, 1)`.
    pub time: f32,
    /// Hour of the day, 0-23.
    pub hour: u32,
    /// Whether it is currently daytime.
    pub is_day_time: bool,
    /// Ambient light level, `[0, 1]`.
    pub light_level: f32,
    /// Named phase.
    pub phase: DayPhase,
}

/// The world's day/night clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayNightCycle {
    day_length: f32,
    elapsed: f32,
}

impl DayNightCycle {
    /// Create a clock with the given day length in seconds.
    ///
    /// The game starts at dawn so new players see daylight.
    #[must_use]
    pub fn new(day_length: f32) -> Self {
        Self {
            day_length,
            elapsed: day_length * 0.25,
        }
    }

    /// Advance the clock.
    pub fn advance(&mut self, delta_time: f32) {
        self.elapsed = (self.elapsed + delta_time) % self.day_length;
    }

    /// Position within the day cycle, `[0, 1)`.
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.elapsed / self.day_length
    }

    /// Named phase for the current time.
    #[must_use]
    pub fn phase(&self) -> DayPhase {
        let t = self.current_time();
        if t < 0.2 {
            DayPhase::Night
        } else if t < 0.25 {
            DayPhase::Dawn
        } else if t < 0.7 {
            DayPhase::Day
        } else if t < 0.75 {
            DayPhase::Dusk
        } else {
            DayPhase::Night
        }
    }

    /// Full time-of-day snapshot.
    #[must_use]
    pub fn info(&self) -> TimeOfDay {
        let t = self.current_time();
        let is_day_time = t >= 0.25 && t <= 0.75;

        let light_level = if t < 0.25 {
            t * 4.0
        } else if t < 0.75 {
            1.0
        } else {
            1.0 - (t - 0.75) * 4.0
        };

        TimeOfDay {
            time: t,
            hour: (t * 24.0) as u32,
            is_day_time,
            light_level,
            phase: self.phase(),
        }
    }
}

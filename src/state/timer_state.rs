//! Timer state structure and reconciliation

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RoomError;

/// Default focus interval in seconds
pub const DEFAULT_FOCUS_SECONDS: u64 = 1500;
/// Default short break interval in seconds
pub const DEFAULT_SHORT_BREAK_SECONDS: u64 = 300;
/// Default long break interval in seconds
pub const DEFAULT_LONG_BREAK_SECONDS: u64 = 900;

/// Which interval of the Pomodoro cycle the timer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "shortBreak" => Ok(TimerMode::ShortBreak),
            "longBreak" => Ok(TimerMode::LongBreak),
            other => Err(RoomError::InvalidMode(other.to_string())),
        }
    }
}

/// Per-room duration overrides, in seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u64>,
}

impl TimerSettings {
    /// Configured duration for a mode, falling back to the Pomodoro defaults
    pub fn duration_for(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_duration.unwrap_or(DEFAULT_FOCUS_SECONDS),
            TimerMode::ShortBreak => self
                .short_break_duration
                .unwrap_or(DEFAULT_SHORT_BREAK_SECONDS),
            TimerMode::LongBreak => self
                .long_break_duration
                .unwrap_or(DEFAULT_LONG_BREAK_SECONDS),
        }
    }
}

/// Authoritative timer state for a room.
///
/// `time_remaining` is the value as of `started_at`, not as of now. Use
/// [`TimerState::reconcile`] to observe the live value of a running timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub time_remaining: u64,
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub cycle_count: u32,
}

impl TimerState {
    /// Create a stopped focus timer holding the full focus duration
    pub fn new(settings: &TimerSettings) -> Self {
        Self {
            mode: TimerMode::Focus,
            time_remaining: settings.duration_for(TimerMode::Focus),
            is_running: false,
            started_at: None,
            paused_at: None,
            cycle_count: 0,
        }
    }

    /// Remaining whole seconds at `now`, never negative
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_running, self.started_at) {
            (true, Some(started_at)) => {
                // A clock reading before started_at counts as no elapsed time
                let elapsed = (now - started_at).num_seconds().max(0) as u64;
                self.time_remaining.saturating_sub(elapsed)
            }
            _ => self.time_remaining,
        }
    }

    /// Copy of this state with `time_remaining` brought up to `now`
    pub fn reconcile(&self, now: DateTime<Utc>) -> TimerState {
        let mut reconciled = self.clone();
        reconciled.time_remaining = self.remaining_at(now);
        reconciled
    }

    /// A completion is pending while the timer runs, or after it was paused at zero
    pub fn completion_pending(&self) -> bool {
        self.is_running || (self.time_remaining == 0 && self.paused_at.is_some())
    }

    /// `is_running` and `started_at` must agree
    pub fn is_consistent(&self) -> bool {
        self.is_running == self.started_at.is_some()
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(&TimerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn running(remaining: u64, started: i64) -> TimerState {
        TimerState {
            time_remaining: remaining,
            is_running: true,
            started_at: Some(at(started)),
            ..TimerState::default()
        }
    }

    #[test]
    fn new_state_uses_configured_focus_duration() {
        let settings = TimerSettings {
            focus_duration: Some(600),
            ..TimerSettings::default()
        };
        let state = TimerState::new(&settings);
        assert_eq!(state.mode, TimerMode::Focus);
        assert_eq!(state.time_remaining, 600);
        assert!(!state.is_running);
        assert!(state.is_consistent());
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let settings = TimerSettings::default();
        assert_eq!(settings.duration_for(TimerMode::Focus), 1500);
        assert_eq!(settings.duration_for(TimerMode::ShortBreak), 300);
        assert_eq!(settings.duration_for(TimerMode::LongBreak), 900);
    }

    #[test]
    fn reconcile_floors_partial_seconds() {
        let state = running(100, 0);
        let now = at(30) + Duration::milliseconds(999);
        assert_eq!(state.reconcile(now).time_remaining, 70);
    }

    #[test]
    fn reconcile_never_goes_negative() {
        let state = running(10, 0);
        assert_eq!(state.remaining_at(at(3600)), 0);
    }

    #[test]
    fn reconcile_is_monotonic_as_time_advances() {
        let state = running(50, 0);
        let mut previous = state.remaining_at(at(0));
        for secs in 1..80 {
            let current = state.remaining_at(at(secs));
            assert!(current < previous || current == 0);
            previous = current;
        }
    }

    #[test]
    fn reconcile_leaves_stopped_timer_unchanged() {
        let state = TimerState {
            time_remaining: 42,
            ..TimerState::default()
        };
        assert_eq!(state.reconcile(at(1000)), state);
    }

    #[test]
    fn reconcile_is_idempotent_for_fixed_now() {
        let state = running(100, 0);
        let first = state.reconcile(at(20));
        assert_eq!(first, state.reconcile(at(20)));
        assert_eq!(state.time_remaining, 100);
    }

    #[test]
    fn clock_before_start_counts_as_zero_elapsed() {
        let state = running(100, 10);
        assert_eq!(state.remaining_at(at(5)), 100);
    }

    #[test]
    fn mode_parses_wire_names_only() {
        assert_eq!("shortBreak".parse::<TimerMode>().unwrap(), TimerMode::ShortBreak);
        assert!(matches!(
            "short_break".parse::<TimerMode>(),
            Err(RoomError::InvalidMode(_))
        ));
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(TimerState::default()).unwrap();
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["timeRemaining"], 1500);
        assert_eq!(json["isRunning"], false);
        assert!(json["startedAt"].is_null());
        assert_eq!(json["cycleCount"], 0);
    }
}

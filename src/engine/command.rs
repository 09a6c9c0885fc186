//! Pure timer state transitions
//!
//! Each command maps `(state, settings, now, input)` to a new state and the
//! event to broadcast. Nothing here touches storage or the network.

use chrono::{DateTime, Utc};

use crate::{
    broadcast::{CompletionPayload, RoomEvent},
    error::RoomError,
    state::{TimerMode, TimerSettings, TimerState},
};

/// A mutating timer operation requested by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    /// Optional client-side remaining time; the smaller of it and the
    /// server's reconciled value wins
    Pause { time_remaining: Option<i64> },
    Reset,
    /// Mode as received on the wire, validated after authorization
    ChangeMode { mode: String },
    Complete,
}

impl TimerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TimerCommand::Start => "start",
            TimerCommand::Pause { .. } => "pause",
            TimerCommand::Reset => "reset",
            TimerCommand::ChangeMode { .. } => "change-mode",
            TimerCommand::Complete => "complete",
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub event: RoomEvent,
}

pub fn apply(
    state: &TimerState,
    settings: &TimerSettings,
    now: DateTime<Utc>,
    command: &TimerCommand,
) -> Result<Transition, RoomError> {
    let transition = match command {
        TimerCommand::Start => {
            let next = start(state, now);
            Transition {
                event: RoomEvent::Started(next.clone()),
                state: next,
            }
        }
        TimerCommand::Pause { time_remaining } => {
            let next = pause(state, now, *time_remaining);
            Transition {
                event: RoomEvent::Paused(next.clone()),
                state: next,
            }
        }
        TimerCommand::Reset => {
            let next = reset(state, settings);
            Transition {
                event: RoomEvent::Reset(next.clone()),
                state: next,
            }
        }
        TimerCommand::ChangeMode { mode } => {
            let next = change_mode(state, settings, mode.parse()?);
            Transition {
                event: RoomEvent::ModeChanged(next.clone()),
                state: next,
            }
        }
        TimerCommand::Complete => {
            let payload = complete(state)?;
            Transition {
                state: payload.timer_state.clone(),
                event: RoomEvent::Completed(payload),
            }
        }
    };
    debug_assert!(transition.state.is_consistent());
    Ok(transition)
}

/// Run the timer from its current remaining time.
///
/// Starting a running timer rebases `started_at` to `now`; time elapsed since
/// the previous start is discarded, not accumulated.
pub fn start(state: &TimerState, now: DateTime<Utc>) -> TimerState {
    TimerState {
        is_running: true,
        started_at: Some(now),
        ..state.clone()
    }
}

pub fn pause(state: &TimerState, now: DateTime<Utc>, suggested: Option<i64>) -> TimerState {
    let reconciled = state.remaining_at(now);
    let suggested = suggested
        .map(|secs| secs.max(0) as u64)
        .unwrap_or(state.time_remaining);

    TimerState {
        time_remaining: suggested.min(reconciled),
        is_running: false,
        started_at: None,
        paused_at: Some(now),
        ..state.clone()
    }
}

pub fn reset(state: &TimerState, settings: &TimerSettings) -> TimerState {
    TimerState {
        time_remaining: settings.duration_for(state.mode),
        is_running: false,
        started_at: None,
        paused_at: None,
        ..state.clone()
    }
}

pub fn change_mode(state: &TimerState, settings: &TimerSettings, mode: TimerMode) -> TimerState {
    // Only an explicit focus -> break switch counts as a cycle
    let cycle_count = if mode.is_break() && state.mode == TimerMode::Focus {
        state.cycle_count.saturating_add(1)
    } else {
        state.cycle_count
    };

    TimerState {
        mode,
        time_remaining: settings.duration_for(mode),
        is_running: false,
        started_at: None,
        paused_at: None,
        cycle_count,
    }
}

/// Stop the timer at zero and suggest the next mode. The mode itself is left
/// for a follow-up change-mode.
pub fn complete(state: &TimerState) -> Result<CompletionPayload, RoomError> {
    if !state.completion_pending() {
        return Err(RoomError::CompletionNotPending);
    }

    let cycle_count = if state.mode == TimerMode::Focus {
        state.cycle_count.saturating_add(1)
    } else {
        state.cycle_count
    };

    let timer_state = TimerState {
        time_remaining: 0,
        is_running: false,
        started_at: None,
        paused_at: None,
        cycle_count,
        ..state.clone()
    };

    Ok(CompletionPayload {
        completed_mode: state.mode,
        suggested_next_mode: suggest_next_mode(state.mode, cycle_count),
        cycle_count,
        timer_state,
    })
}

/// Pomodoro cadence: a long break when the updated cycle count is 3 mod 4
pub fn suggest_next_mode(completed: TimerMode, cycle_count: u32) -> TimerMode {
    match completed {
        TimerMode::Focus if cycle_count % 4 == 3 => TimerMode::LongBreak,
        TimerMode::Focus => TimerMode::ShortBreak,
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn running(remaining: u64, started_secs_ago: i64, mode: TimerMode) -> TimerState {
        TimerState {
            mode,
            time_remaining: remaining,
            is_running: true,
            started_at: Some(t0() - Duration::seconds(started_secs_ago)),
            paused_at: None,
            cycle_count: 0,
        }
    }

    #[test]
    fn start_keeps_remaining_time_and_mode() {
        let paused = TimerState {
            mode: TimerMode::ShortBreak,
            time_remaining: 123,
            paused_at: Some(t0() - Duration::seconds(5)),
            ..TimerState::default()
        };
        let started = start(&paused, t0());
        assert!(started.is_running);
        assert_eq!(started.started_at, Some(t0()));
        assert_eq!(started.time_remaining, 123);
        assert_eq!(started.mode, TimerMode::ShortBreak);
    }

    #[test]
    fn double_start_discards_elapsed_time() {
        let state = running(100, 40, TimerMode::Focus);
        let restarted = start(&state, t0());

        assert_eq!(restarted.time_remaining, 100);
        assert_eq!(restarted.started_at, Some(t0()));
        // Forty seconds already ran before the restart; they are lost
        assert_eq!(restarted.remaining_at(t0() + Duration::seconds(10)), 90);
    }

    #[test]
    fn pause_prefers_smaller_reconciled_value() {
        let state = running(100, 30, TimerMode::Focus);
        let paused = pause(&state, t0(), Some(80));
        assert_eq!(paused.time_remaining, 70);
        assert!(!paused.is_running);
        assert_eq!(paused.started_at, None);
        assert_eq!(paused.paused_at, Some(t0()));
    }

    #[test]
    fn pause_prefers_smaller_client_value() {
        let state = running(100, 30, TimerMode::Focus);
        assert_eq!(pause(&state, t0(), Some(65)).time_remaining, 65);
    }

    #[test]
    fn pause_without_suggestion_uses_reconciled_value() {
        let state = running(100, 30, TimerMode::Focus);
        assert_eq!(pause(&state, t0(), None).time_remaining, 70);
    }

    #[test]
    fn pause_floors_negative_suggestion_at_zero() {
        let state = running(100, 30, TimerMode::Focus);
        assert_eq!(pause(&state, t0(), Some(-12)).time_remaining, 0);
    }

    #[test]
    fn pause_of_stopped_timer_cannot_raise_remaining() {
        let state = TimerState {
            time_remaining: 50,
            ..TimerState::default()
        };
        let paused = pause(&state, t0(), Some(400));
        assert_eq!(paused.time_remaining, 50);
        assert!(paused.is_consistent());
    }

    #[test]
    fn reset_restores_current_mode_duration() {
        let settings = TimerSettings {
            short_break_duration: Some(420),
            ..TimerSettings::default()
        };
        let mut state = running(12, 3, TimerMode::ShortBreak);
        state.cycle_count = 5;
        state.paused_at = Some(t0());

        let reset = reset(&state, &settings);
        assert_eq!(reset.time_remaining, 420);
        assert_eq!(reset.mode, TimerMode::ShortBreak);
        assert_eq!(reset.cycle_count, 5);
        assert!(!reset.is_running);
        assert_eq!(reset.started_at, None);
        assert_eq!(reset.paused_at, None);
    }

    #[test]
    fn focus_to_break_increments_cycle_once() {
        let settings = TimerSettings::default();
        let state = TimerState::default();
        let next = change_mode(&state, &settings, TimerMode::ShortBreak);
        assert_eq!(next.cycle_count, 1);
        assert_eq!(next.mode, TimerMode::ShortBreak);
        assert_eq!(next.time_remaining, 300);
    }

    #[test]
    fn break_to_same_break_does_not_increment() {
        let settings = TimerSettings::default();
        let state = TimerState {
            mode: TimerMode::ShortBreak,
            cycle_count: 3,
            ..TimerState::default()
        };
        let next = change_mode(&state, &settings, TimerMode::ShortBreak);
        assert_eq!(next.cycle_count, 3);
    }

    #[test]
    fn break_to_focus_does_not_increment() {
        let settings = TimerSettings::default();
        let state = TimerState {
            mode: TimerMode::LongBreak,
            cycle_count: 4,
            ..TimerState::default()
        };
        let next = change_mode(&state, &settings, TimerMode::Focus);
        assert_eq!(next.cycle_count, 4);
        assert_eq!(next.time_remaining, 1500);
    }

    #[test]
    fn change_mode_stops_running_timer() {
        let state = running(200, 10, TimerMode::Focus);
        let next = change_mode(&state, &TimerSettings::default(), TimerMode::LongBreak);
        assert!(!next.is_running);
        assert_eq!(next.started_at, None);
        assert_eq!(next.paused_at, None);
        assert_eq!(next.time_remaining, 900);
    }

    #[test]
    fn invalid_mode_is_rejected_without_change() {
        let state = TimerState {
            cycle_count: 2,
            ..TimerState::default()
        };
        let command = TimerCommand::ChangeMode {
            mode: "siesta".to_string(),
        };
        let err = apply(&state, &TimerSettings::default(), t0(), &command).unwrap_err();
        assert!(matches!(err, RoomError::InvalidMode(mode) if mode == "siesta"));
        assert_eq!(state.cycle_count, 2);
    }

    #[test]
    fn complete_third_focus_suggests_long_break() {
        let mut state = running(0, 1500, TimerMode::Focus);
        state.cycle_count = 2;

        let payload = complete(&state).unwrap();
        assert_eq!(payload.cycle_count, 3);
        assert_eq!(payload.completed_mode, TimerMode::Focus);
        assert_eq!(payload.suggested_next_mode, TimerMode::LongBreak);
        assert_eq!(payload.timer_state.mode, TimerMode::Focus);
        assert_eq!(payload.timer_state.time_remaining, 0);
        assert!(!payload.timer_state.is_running);
        assert_eq!(payload.timer_state.started_at, None);
    }

    #[test]
    fn complete_focus_otherwise_suggests_short_break() {
        let mut state = running(0, 1500, TimerMode::Focus);
        state.cycle_count = 3;
        let payload = complete(&state).unwrap();
        assert_eq!(payload.cycle_count, 4);
        assert_eq!(payload.suggested_next_mode, TimerMode::ShortBreak);
    }

    #[test]
    fn complete_break_suggests_focus_without_increment() {
        let mut state = running(0, 300, TimerMode::ShortBreak);
        state.cycle_count = 1;
        let payload = complete(&state).unwrap();
        assert_eq!(payload.cycle_count, 1);
        assert_eq!(payload.suggested_next_mode, TimerMode::Focus);
    }

    #[test]
    fn second_complete_for_same_interval_is_rejected() {
        let state = running(0, 1500, TimerMode::Focus);
        let first = complete(&state).unwrap();
        assert!(matches!(
            complete(&first.timer_state),
            Err(RoomError::CompletionNotPending)
        ));
    }

    #[test]
    fn complete_accepted_after_pause_at_zero() {
        let state = running(10, 15, TimerMode::Focus);
        let paused = pause(&state, t0(), None);
        assert_eq!(paused.time_remaining, 0);
        assert_eq!(complete(&paused).unwrap().cycle_count, 1);
    }

    #[test]
    fn cycle_count_saturates_at_max() {
        let settings = TimerSettings::default();
        let state = TimerState {
            cycle_count: u32::MAX,
            ..TimerState::default()
        };
        assert_eq!(change_mode(&state, &settings, TimerMode::LongBreak).cycle_count, u32::MAX);

        let finished = TimerState {
            cycle_count: u32::MAX,
            ..running(0, 1500, TimerMode::Focus)
        };
        assert_eq!(complete(&finished).unwrap().cycle_count, u32::MAX);
    }

    #[test]
    fn complete_rejected_on_fresh_timer() {
        assert!(matches!(
            complete(&TimerState::default()),
            Err(RoomError::CompletionNotPending)
        ));
    }

    #[test]
    fn every_transition_keeps_running_and_started_at_in_step() {
        let settings = TimerSettings::default();
        let commands = [
            TimerCommand::Start,
            TimerCommand::Pause { time_remaining: Some(10) },
            TimerCommand::Start,
            TimerCommand::ChangeMode { mode: "longBreak".to_string() },
            TimerCommand::Start,
            TimerCommand::Complete,
            TimerCommand::Reset,
        ];
        let mut state = TimerState::default();
        for (i, command) in commands.iter().enumerate() {
            let now = t0() + Duration::seconds(i as i64 * 7);
            state = apply(&state, &settings, now, command).unwrap().state;
            assert!(state.is_consistent(), "inconsistent after {}", command.name());
        }
    }

    #[test]
    fn apply_emits_matching_event() {
        let settings = TimerSettings::default();
        let transition = apply(&TimerState::default(), &settings, t0(), &TimerCommand::Start).unwrap();
        assert_eq!(transition.event, RoomEvent::Started(transition.state.clone()));

        let transition = apply(&transition.state, &settings, t0(), &TimerCommand::Complete).unwrap();
        assert_eq!(transition.event.name(), "completed");
        assert_eq!(transition.event.timer_state(), Some(&transition.state));
    }
}

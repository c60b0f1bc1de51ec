use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Match clock.
///
/// `elapsed_millis` holds the time accumulated up to the last pause.
/// `start_time` is the reference point of the current running stretch and is
/// only set while running, so a paused interval is never counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchTimer {
    pub state: TimerState,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_millis: i64,
    pub current_round: u8,
    pub total_rounds: u8,
}

impl MatchTimer {
    pub fn new(total_rounds: u8) -> Self {
        Self {
            state: TimerState::Stopped,
            start_time: None,
            elapsed_millis: 0,
            current_round: 1,
            total_rounds: total_rounds.max(1),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_state(TimerState::Stopped, "start")?;
        self.state = TimerState::Running;
        self.start_time = Some(now);
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_state(TimerState::Running, "pause")?;
        self.accumulate(now);
        self.state = TimerState::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_state(TimerState::Paused, "resume")?;
        self.state = TimerState::Running;
        self.start_time = Some(now);
        Ok(())
    }

    /// Freezes the clock for good. Accepted from any state.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.is_running() {
            self.accumulate(now);
        }
        self.state = TimerState::Stopped;
        self.start_time = None;
    }

    pub fn advance_round(&mut self) -> Result<u8, DomainError> {
        if self.current_round >= self.total_rounds {
            return Err(DomainError::RoundLimitExceeded {
                total_rounds: self.total_rounds,
            });
        }
        self.current_round += 1;
        Ok(self.current_round)
    }

    pub fn elapsed_millis_at(&self, now: DateTime<Utc>) -> i64 {
        match (self.state, self.start_time) {
            (TimerState::Running, Some(start)) => {
                self.elapsed_millis + (now - start).num_milliseconds().max(0)
            }
            _ => self.elapsed_millis,
        }
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.elapsed_millis_at(now) / 1000
    }

    fn accumulate(&mut self, now: DateTime<Utc>) {
        self.elapsed_millis = self.elapsed_millis_at(now);
        self.start_time = None;
    }

    fn expect_state(&self, expected: TimerState, action: &'static str) -> Result<(), DomainError> {
        if self.state != expected {
            return Err(DomainError::InvalidTimerTransition {
                state: self.state,
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut timer = MatchTimer::new(3);
        timer.start(t0()).unwrap();
        timer.pause(t0() + Duration::seconds(5)).unwrap();

        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(5)), 5);
        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(60)), 5);
    }

    #[test]
    fn test_resume_does_not_count_paused_time() {
        let mut timer = MatchTimer::new(3);
        timer.start(t0()).unwrap();
        timer.pause(t0() + Duration::seconds(5)).unwrap();
        timer.resume(t0() + Duration::seconds(20)).unwrap();
        timer.pause(t0() + Duration::seconds(23)).unwrap();

        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(100)), 8);
    }

    #[test]
    fn test_elapsed_advances_only_while_running() {
        let mut timer = MatchTimer::new(3);
        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(30)), 0);

        timer.start(t0()).unwrap();
        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(2)), 2);
        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(7)), 7);
    }

    #[test]
    fn test_stop_keeps_accumulated_time() {
        let mut timer = MatchTimer::new(3);
        timer.start(t0()).unwrap();
        timer.stop(t0() + Duration::milliseconds(4500));
        assert_eq!(timer.state, TimerState::Stopped);
        assert_eq!(timer.elapsed_millis, 4500);
        assert_eq!(timer.elapsed_seconds(t0() + Duration::seconds(90)), 4);
    }

    #[test]
    fn test_illegal_timer_transitions() {
        let mut timer = MatchTimer::new(3);
        assert!(timer.pause(t0()).is_err());
        assert!(timer.resume(t0()).is_err());
        timer.start(t0()).unwrap();
        assert!(matches!(
            timer.start(t0()),
            Err(DomainError::InvalidTimerTransition { state: TimerState::Running, .. })
        ));
    }

    #[test]
    fn test_advance_round_stops_at_total() {
        let mut timer = MatchTimer::new(2);
        assert_eq!(timer.advance_round().unwrap(), 2);
        assert_eq!(
            timer.advance_round(),
            Err(DomainError::RoundLimitExceeded { total_rounds: 2 })
        );
        assert_eq!(timer.current_round, 2);
    }
}

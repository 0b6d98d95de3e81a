//! Simulation clock: wall-clock seconds → simulated days.
//!
//! The single source of time for both the instance shader and the picker.

use orrery_orbit::DAYS_PER_SECOND;

/// Errors from clock commands.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClockError {
    /// Speed multipliers must be finite and non-negative.
    #[error("invalid speed multiplier {0}")]
    InvalidSpeed(f64),
}

/// Run state. Both variants carry the speed so it survives a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockState {
    Running { speed: f64 },
    Paused { speed: f64 },
}

impl ClockState {
    pub fn speed(&self) -> f64 {
        match *self {
            ClockState::Running { speed } | ClockState::Paused { speed } => speed,
        }
    }
}

/// Maps elapsed wall time to simulation time `t` (days).
///
/// `t` advances by `dt × speed × days_per_second` per [`advance`](Self::advance)
/// while running and never moves while paused.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: ClockState,
    time_days: f64,
    days_per_second: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DAYS_PER_SECOND)
    }
}

impl SimulationClock {
    /// Running at speed 1, `t = 0`.
    pub fn new(days_per_second: f64) -> Self {
        Self {
            state: ClockState::Running { speed: 1.0 },
            time_days: 0.0,
            days_per_second,
        }
    }

    /// Current simulation time in days.
    pub fn time(&self) -> f64 {
        self.time_days
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn speed(&self) -> f64 {
        self.state.speed()
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, ClockState::Paused { .. })
    }

    /// Advance by `dt_seconds` of wall time. Returns the new `t`.
    pub fn advance(&mut self, dt_seconds: f64) -> f64 {
        if let ClockState::Running { speed } = self.state
            && dt_seconds > 0.0
        {
            self.time_days += dt_seconds * speed * self.days_per_second;
        }
        self.time_days
    }

    pub fn pause(&mut self) {
        if let ClockState::Running { speed } = self.state {
            tracing::debug!(t = self.time_days, "clock paused");
            self.state = ClockState::Paused { speed };
        }
    }

    pub fn resume(&mut self) {
        if let ClockState::Paused { speed } = self.state {
            tracing::debug!(t = self.time_days, speed, "clock resumed");
            self.state = ClockState::Running { speed };
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Change the multiplier, keeping the run state. Affects only future
    /// advancement; `t` does not jump.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ClockError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(ClockError::InvalidSpeed(speed));
        }
        self.state = match self.state {
            ClockState::Running { .. } => ClockState::Running { speed },
            ClockState::Paused { .. } => ClockState::Paused { speed },
        };
        tracing::debug!(speed, paused = self.is_paused(), "clock speed set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_scales_by_speed_and_days_per_second() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.advance(1.0), 50.0);
        clock.set_speed(10.0).unwrap();
        assert_eq!(clock.advance(0.5), 300.0);
    }

    #[test]
    fn test_paused_time_never_advances() {
        let mut clock = SimulationClock::default();
        clock.advance(2.0);
        clock.pause();
        for _ in 0..100 {
            clock.advance(0.016);
        }
        assert_eq!(clock.time(), 100.0);
    }

    #[test]
    fn test_set_speed_while_paused_waits_for_resume() {
        let mut clock = SimulationClock::default();
        clock.pause();
        clock.set_speed(100.0).unwrap();
        assert!(clock.is_paused());
        assert_eq!(clock.advance(1.0), 0.0);

        clock.resume();
        assert_eq!(clock.state(), ClockState::Running { speed: 100.0 });
        assert_eq!(clock.advance(1.0), 5000.0);
    }

    #[test]
    fn test_speed_change_does_not_jump_time() {
        let mut clock = SimulationClock::default();
        clock.advance(1.0);
        clock.set_speed(50.0).unwrap();
        assert_eq!(clock.time(), 50.0);
    }

    #[test]
    fn test_invalid_speed_rejected_and_state_kept() {
        let mut clock = SimulationClock::default();
        clock.set_speed(10.0).unwrap();
        assert_eq!(clock.set_speed(-1.0), Err(ClockError::InvalidSpeed(-1.0)));
        assert!(clock.set_speed(f64::INFINITY).is_err());
        assert!(clock.set_speed(f64::NAN).is_err());
        assert_eq!(clock.speed(), 10.0);
    }

    #[test]
    fn test_zero_speed_holds_time_while_running() {
        let mut clock = SimulationClock::default();
        clock.set_speed(0.0).unwrap();
        assert!(!clock.is_paused());
        assert_eq!(clock.advance(5.0), 0.0);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut clock = SimulationClock::default();
        clock.advance(1.0);
        assert_eq!(clock.advance(-0.5), 50.0);
    }

    #[test]
    fn test_toggle_pause() {
        let mut clock = SimulationClock::default();
        clock.toggle_pause();
        assert!(clock.is_paused());
        assert_eq!(clock.advance(1.0), 0.0);
        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert_eq!(clock.advance(1.0), 50.0);
    }
}

use crate::{
    core::{
        time::{DateTime, Duration},
        unit::Percent,
    },
    t,
};

use super::PowerState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// First known state after `Unknown`. Starts the clock, does not count.
    Initial,
    Unchanged,
    Transition { elapsed: Duration },
}

/// On/off bookkeeping of a device. Durations are only accumulated when the state flips, so time spent in the
/// current state is not included until the next transition.
#[derive(Debug, Clone)]
pub struct TransitionTracker {
    state: PowerState,
    last_change: DateTime,
    transitions: u64,
    on_time: Duration,
    off_time: Duration,
    total_time: Duration,
    utilization: Percent,
}

impl TransitionTracker {
    pub fn new(now: DateTime) -> Self {
        Self {
            state: PowerState::Unknown,
            last_change: now,
            transitions: 0,
            on_time: Duration::zero(),
            off_time: Duration::zero(),
            //seeded to never divide by zero
            total_time: t!(1 millis),
            utilization: Percent(0.0),
        }
    }

    pub fn observe(&mut self, state: PowerState, now: DateTime) -> Observation {
        match (self.state, state) {
            (_, PowerState::Unknown) => Observation::Unchanged,
            (PowerState::Unknown, _) => {
                self.state = state;
                self.last_change = now;
                Observation::Initial
            }
            (previous, current) if previous == current => Observation::Unchanged,
            (previous, current) => {
                let elapsed = now.elapsed_since(self.last_change);
                let elapsed = if elapsed.is_negative() { Duration::zero() } else { elapsed };

                self.total_time += elapsed;
                if previous == PowerState::On {
                    self.on_time += elapsed;
                } else {
                    self.off_time += elapsed;
                }

                self.transitions += 1;
                self.last_change = now;
                self.state = current;
                self.utilization = Percent::of(self.on_time.as_secs_f64(), self.total_time.as_secs_f64()).clamp();

                Observation::Transition { elapsed }
            }
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> PowerState {
        self.state
    }

    #[cfg(test)]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn on_time(&self) -> Duration {
        self.on_time
    }

    pub fn off_time(&self) -> Duration {
        self.off_time
    }

    pub fn utilization(&self) -> Percent {
        self.utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime {
        DateTime::from_iso("2025-03-01T12:00:00Z").unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_first_observation_is_not_a_transition() {
        let mut tracker = TransitionTracker::new(at(0));

        assert_eq!(tracker.observe(PowerState::On, at(5)), Observation::Initial);
        assert_eq!(tracker.transitions(), 0);
        assert_eq!(tracker.state(), PowerState::On);
        assert_eq!(tracker.utilization(), Percent(0.0));
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut tracker = TransitionTracker::new(at(0));
        tracker.observe(PowerState::Off, at(0));

        assert_eq!(tracker.observe(PowerState::Off, at(30)), Observation::Unchanged);
        assert_eq!(tracker.transitions(), 0);
        assert_eq!(tracker.off_time(), Duration::zero());
    }

    #[test]
    fn test_utilization_after_on_then_off() {
        let mut tracker = TransitionTracker::new(at(0));

        tracker.observe(PowerState::On, at(0));
        assert_eq!(
            tracker.observe(PowerState::Off, at(10)),
            Observation::Transition { elapsed: t!(10 seconds) }
        );
        tracker.observe(PowerState::On, at(30));

        assert_eq!(tracker.transitions(), 2);
        assert_eq!(tracker.on_time(), t!(10 seconds));
        assert_eq!(tracker.off_time(), t!(20 seconds));
        assert!((tracker.utilization().0 - 33.33).abs() < 0.01, "was {}", tracker.utilization());
    }

    #[test]
    fn test_unknown_is_ignored() {
        let mut tracker = TransitionTracker::new(at(0));
        tracker.observe(PowerState::On, at(0));

        assert_eq!(tracker.observe(PowerState::Unknown, at(10)), Observation::Unchanged);
        assert_eq!(tracker.state(), PowerState::On);

        assert!(matches!(tracker.observe(PowerState::Off, at(20)), Observation::Transition { .. }));
        assert_eq!(tracker.on_time(), t!(20 seconds));
    }
}

use std::collections::VecDeque;

use crate::{
    core::{
        time::{DateTime, Duration},
        timeseries::DataPoint,
        unit::Watt,
    },
    t,
};

/// Power samples of a single device, limited to the trailing 24 hours.
#[derive(Debug, Clone, Default)]
pub struct PowerHistory {
    samples: VecDeque<DataPoint<Watt>>,
}

impl PowerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn retention() -> Duration {
        t!(24 hours)
    }

    /// Appends the sample and drops everything older than 24 hours relative to it.
    pub fn append(&mut self, sample: DataPoint<Watt>) {
        let cutoff = sample.timestamp - Self::retention();
        self.samples.push_back(sample);
        self.samples.retain(|dp| dp.timestamp >= cutoff);
    }

    /// Mean over the samples of the last hour before `now`. `None` if there are none.
    pub fn hourly_average(&self, now: DateTime) -> Option<Watt> {
        let since = now - t!(1 hours);
        mean(self.samples.iter().filter(|dp| dp.timestamp >= since && dp.timestamp <= now))
    }

    /// Mean over all retained samples. `None` if there are none.
    pub fn daily_average(&self) -> Option<Watt> {
        mean(self.samples.iter())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn oldest(&self) -> Option<&DataPoint<Watt>> {
        self.samples.front()
    }
}

fn mean<'a>(samples: impl Iterator<Item = &'a DataPoint<Watt>>) -> Option<Watt> {
    let (count, sum) = samples.fold((0usize, 0.0), |(count, sum), dp| (count + 1, sum + dp.value.0));

    if count == 0 {
        None
    } else {
        Some(Watt(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime {
        DateTime::from_iso("2025-03-01T12:00:00Z").unwrap()
    }

    fn history_of(samples: &[(i64, f64)]) -> PowerHistory {
        let mut history = PowerHistory::new();
        for (secs, watts) in samples {
            history.append(DataPoint::new(Watt(*watts), start() + Duration::seconds(*secs)));
        }
        history
    }

    #[test]
    fn test_hourly_average() {
        let history = history_of(&[(0, 10.0), (30, 20.0), (60, 30.0)]);

        assert_eq!(history.hourly_average(start() + t!(60 seconds)), Some(Watt(20.0)));
    }

    #[test]
    fn test_hourly_average_ignores_older_samples() {
        let history = history_of(&[(0, 1000.0), (7200, 20.0), (7230, 40.0)]);

        assert_eq!(history.hourly_average(start() + t!(7230 seconds)), Some(Watt(30.0)));
        assert_eq!(history.daily_average(), Some(Watt(1060.0 / 3.0)));
    }

    #[test]
    fn test_empty_window_yields_no_average() {
        let history = history_of(&[(0, 50.0)]);

        assert_eq!(history.hourly_average(start() + t!(2 hours)), None);
        assert_eq!(PowerHistory::new().hourly_average(start()), None);
        assert_eq!(PowerHistory::new().daily_average(), None);
    }

    #[test]
    fn test_append_prunes_samples_older_than_a_day() {
        let history = history_of(&[(0, 10.0), (3600, 20.0), (25 * 3600, 30.0)]);

        assert_eq!(history.len(), 2);
        assert_eq!(history.oldest().map(|dp| dp.value), Some(Watt(20.0)));
        assert_eq!(history.daily_average(), Some(Watt(25.0)));
    }

    #[test]
    fn test_sample_exactly_a_day_old_is_kept() {
        let history = history_of(&[(0, 10.0), (24 * 3600, 30.0)]);

        assert_eq!(history.len(), 2);
    }
}

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    pub(super) delegate: chrono::Duration,
}

impl Duration {
    pub(super) fn new(delegate: chrono::Duration) -> Self {
        Self { delegate }
    }

    pub fn zero() -> Self {
        Self::new(chrono::Duration::zero())
    }

    pub fn hours(hours: i64) -> Self {
        Self::new(chrono::Duration::hours(hours))
    }

    #[cfg(test)]
    pub fn minutes(minutes: i64) -> Self {
        Self::new(chrono::Duration::minutes(minutes))
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::new(chrono::Duration::seconds(seconds))
    }

    pub fn millis(millis: i64) -> Self {
        Self::new(chrono::Duration::milliseconds(millis))
    }

    pub fn as_secs(&self) -> i64 {
        self.delegate.num_seconds()
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.delegate.num_milliseconds() as f64 / 1000.0
    }

    pub fn as_hours_f64(&self) -> f64 {
        self.as_secs_f64() / 3600.0
    }

    pub fn is_negative(&self) -> bool {
        self.delegate < chrono::Duration::zero()
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

impl std::ops::Add<Duration> for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate + rhs.delegate)
    }
}

impl std::ops::AddAssign<Duration> for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.delegate = self.delegate + rhs.delegate;
    }
}

impl std::ops::Sub<Duration> for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate - rhs.delegate)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(val: Duration) -> Self {
        val.delegate.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = chrono::OutOfRangeError;

    fn try_from(value: std::time::Duration) -> Result<Self, Self::Error> {
        Ok(Self::new(chrono::Duration::from_std(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t;

    #[test]
    fn test_negative_duration_converts_to_zero() {
        let negative = t!(5 seconds) - t!(10 seconds);

        assert!(negative.is_negative());
        assert_eq!(std::time::Duration::from(negative), std::time::Duration::ZERO);
    }

    #[test]
    fn test_add_assign() {
        let mut total = Duration::zero();
        total += t!(90 seconds);
        total += t!(30 seconds);

        assert_eq!(total, t!(2 minutes));
        assert_eq!(total.as_hours_f64(), 2.0 / 60.0);
    }

    #[test]
    fn test_from_std() {
        let duration = Duration::try_from(std::time::Duration::from_secs(30)).unwrap();

        assert_eq!(duration, t!(30 seconds));
    }
}

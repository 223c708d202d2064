use derive_more::derive::AsRef;
use std::fmt::Display;

use crate::core::time::Duration;

use super::WattHours;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, AsRef)]
pub struct Watt(pub f64);

impl Watt {
    /// Energy consumed when drawing this power for the given time. Negative readings (feed-in) count as zero.
    pub fn over(self, duration: Duration) -> WattHours {
        WattHours(self.0.max(0.0) * duration.as_hours_f64().max(0.0))
    }
}

impl Display for Watt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} W", self.0)
    }
}

impl std::ops::Add for Watt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Watt(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Watt {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Watt::default(), |acc, w| acc + w)
    }
}

use std::fmt::Display;

use derive_more::derive::AsRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, AsRef, Serialize, Deserialize)]
pub struct Percent(pub f64);

impl Percent {
    pub fn of(part: f64, whole: f64) -> Self {
        if whole <= 0.0 {
            return Percent(0.0);
        }

        Percent(part / whole * 100.0)
    }

    pub fn clamp(self) -> Self {
        Self(self.0.clamp(0.0, 100.0))
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} %", self.0)
    }
}

use std::fmt::Display;

use derive_more::derive::AsRef;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, AsRef)]
pub struct WattHours(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, AsRef)]
pub struct KiloWattHours(pub f64);

impl Display for WattHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Wh", self.0)
    }
}

impl Display for KiloWattHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kWh", self.0)
    }
}

impl From<WattHours> for KiloWattHours {
    fn from(value: WattHours) -> Self {
        KiloWattHours(value.0 / 1000.0)
    }
}

mod energy;
mod percent;
mod watt;

pub use energy::{KiloWattHours, WattHours};
pub use percent::Percent;
pub use watt::Watt;

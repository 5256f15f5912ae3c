mod ability;
mod damage;
mod effect;
mod simulator;
mod snapshot;
mod stats;
mod targeting;
mod unit;

#[cfg(test)]
pub mod testkit;

pub use ability::*;
pub use damage::*;
pub use effect::*;
pub use simulator::*;
pub use snapshot::*;
pub use stats::*;
pub use targeting::*;
pub use unit::*;

mod client;
mod gateway;
mod pending;
pub mod wire;

pub use client::*;
pub use gateway::*;
pub use pending::*;
pub use wire::*;

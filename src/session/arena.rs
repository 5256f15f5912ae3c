use crate::Tick;
use crate::combat::Simulator;
use crate::intervention::InterventionEngine;

/// One live fight: the simulator, its energy meters, and the snapshot
/// cadence bookkeeping. Ghost-side seats simply never receive mail.
pub struct Arena {
    pub sim: Simulator,
    pub energy: InterventionEngine,
    pub timer: f64,
    pub last_tick: Tick,
    pub settled: bool,
}

impl Arena {
    pub fn new(sim: Simulator, energy: InterventionEngine, first_batch_in: f64) -> Self {
        Self {
            sim,
            energy,
            timer: first_batch_in,
            last_tick: 0,
            settled: false,
        }
    }
}

use crate::config::PhaseSettings;
use serde::Deserialize;
use serde::Serialize;

/// Round lifecycle states. The wire encoding is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    WaitingForPlayers,
    Preparation,
    Combat,
    Reward,
    MutationChoice,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One committed transition, ready to broadcast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub phase: Phase,
    pub duration_secs: f64,
}

/// Server-timed round lifecycle. Time-driven transitions run off the
/// orchestrator tick delta; lobby start, all-combats-done and game
/// over arrive as external triggers.
#[derive(Debug, Clone)]
pub struct Scheduler {
    phase: Phase,
    remaining: f64,
    round: u32,
    settings: PhaseSettings,
}

impl Scheduler {
    pub fn new(settings: PhaseSettings) -> Self {
        Self {
            phase: Phase::WaitingForPlayers,
            remaining: 0.0,
            round: 0,
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn round(&self) -> u32 {
        self.round
    }
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// lobby countdown elapsed: round one begins
    pub fn begin(&mut self) -> Option<PhaseChange> {
        match self.phase {
            Phase::WaitingForPlayers => {
                self.round = 1;
                Some(self.enter(Phase::Preparation))
            }
            _ => None,
        }
    }

    /// wall-clock tick; fires at most one transition per call
    pub fn advance(&mut self, delta: f64) -> Option<PhaseChange> {
        match self.phase {
            Phase::WaitingForPlayers | Phase::GameOver => return None,
            _ => self.remaining -= delta,
        }
        if self.remaining > 0.0 {
            return None;
        }
        match self.phase {
            Phase::Preparation => Some(self.enter(Phase::Combat)),
            // safety timer: combat that never reported done is forced out
            Phase::Combat => Some(self.enter(Phase::Reward)),
            Phase::Reward => Some(self.enter(Phase::MutationChoice)),
            Phase::MutationChoice => {
                self.round += 1;
                Some(self.enter(Phase::Preparation))
            }
            Phase::WaitingForPlayers | Phase::GameOver => None,
        }
    }

    /// every combat in the round resolved before the safety timer
    pub fn combats_done(&mut self) -> Option<PhaseChange> {
        match self.phase {
            Phase::Combat => Some(self.enter(Phase::Reward)),
            _ => None,
        }
    }

    pub fn game_over(&mut self) -> Option<PhaseChange> {
        match self.phase {
            Phase::GameOver => None,
            _ => Some(self.enter(Phase::GameOver)),
        }
    }

    fn enter(&mut self, phase: Phase) -> PhaseChange {
        let duration = match phase {
            Phase::WaitingForPlayers | Phase::GameOver => 0.0,
            Phase::Preparation => self.settings.preparation_secs,
            Phase::Combat => self.settings.combat_max_secs,
            Phase::Reward => self.settings.reward_secs,
            Phase::MutationChoice => self.settings.mutation_secs,
        };
        self.phase = phase;
        self.remaining = duration;
        log::info!("phase -> {} ({}s) round {}", phase, duration, self.round);
        PhaseChange {
            phase,
            duration_secs: duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> Scheduler {
        Scheduler::new(PhaseSettings::default())
    }

    #[test]
    fn lobby_holds_until_begin() {
        let mut s = scheduler();
        assert!(s.advance(1_000.0).is_none());
        let change = s.begin().expect("first round");
        assert!(change.phase == Phase::Preparation);
        assert!(s.round() == 1);
        assert!(s.begin().is_none());
    }

    #[test]
    fn full_round_trip_increments_the_round() {
        let mut s = scheduler();
        s.begin().expect("start");
        assert!(s.advance(100.0).expect("prep over").phase == Phase::Combat);
        assert!(s.combats_done().expect("fights over").phase == Phase::Reward);
        assert!(s.advance(100.0).expect("reward over").phase == Phase::MutationChoice);
        let change = s.advance(100.0).expect("mutation over");
        assert!(change.phase == Phase::Preparation);
        assert!(s.round() == 2);
    }

    #[test]
    fn combat_safety_timer_forces_reward() {
        let mut s = scheduler();
        s.begin().expect("start");
        s.advance(100.0).expect("prep over");
        let change = s.advance(PhaseSettings::default().combat_max_secs + 1.0);
        assert!(change.expect("forced out").phase == Phase::Reward);
        assert!(s.combats_done().is_none());
    }

    #[test]
    fn game_over_is_terminal() {
        let mut s = scheduler();
        s.begin().expect("start");
        assert!(s.game_over().expect("over").phase == Phase::GameOver);
        assert!(s.game_over().is_none());
        assert!(s.advance(1_000.0).is_none());
    }
}

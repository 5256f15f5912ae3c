use super::InterventionKind;
use crate::Energy;
use crate::InstanceId;
use crate::Tick;
use crate::config::InterventionSettings;
use crate::roster::Reject;

/// A validated card waiting for the simulator's next batch. Duration
/// and magnitude are resolved from configuration at submission so the
/// simulator stays ignorant of intervention tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedIntervention {
    pub team: u8,
    pub kind: InterventionKind,
    pub target: InstanceId,
    pub duration: Tick,
    pub magnitude: i32,
}

/// One team's meter: energy, the damage-received carry, and the five
/// card cooldowns in wall-clock seconds.
#[derive(Debug, Clone)]
struct Meter {
    energy: Energy,
    damage_pool: i32,
    passive_pool: Tick,
    cooldowns: [f64; 5],
}

impl Meter {
    fn new(start: Energy) -> Self {
        Self {
            energy: start,
            damage_pool: 0,
            passive_pool: 0,
            cooldowns: [0.0; 5],
        }
    }
}

/// Per-combat energy and cooldown bookkeeping for both teams.
/// Cooldowns decay on wall-clock delta, independent of combat ticks;
/// energy only ever moves on simulated events.
pub struct InterventionEngine {
    teams: [Meter; 2],
    queue: Vec<QueuedIntervention>,
    settings: InterventionSettings,
}

impl InterventionEngine {
    pub fn new(settings: InterventionSettings) -> Self {
        Self {
            teams: [Meter::new(0), Meter::new(0)],
            queue: Vec::new(),
            settings,
        }
    }

    pub fn energy(&self, team: u8) -> Energy {
        self.teams[team as usize].energy
    }
    pub fn max_energy(&self) -> Energy {
        self.settings.max_energy
    }

    /// validation order is the user-facing contract: energy first,
    /// then cooldown; success deducts, arms the cooldown and enqueues
    pub fn submit(
        &mut self,
        team: u8,
        kind: InterventionKind,
        target: InstanceId,
    ) -> Result<(), Reject> {
        let card = self.settings.card(kind);
        let meter = &mut self.teams[team as usize];
        if meter.energy < card.cost {
            return Err(Reject::InsufficientEnergy {
                have: meter.energy,
                cost: card.cost,
            });
        }
        let cooling = meter.cooldowns[kind.index()];
        if cooling > 0.0 {
            return Err(Reject::Cooldown {
                secs: cooling.ceil() as u32,
            });
        }
        meter.energy -= card.cost;
        meter.cooldowns[kind.index()] = card.cooldown_secs;
        self.queue.push(QueuedIntervention {
            team,
            kind,
            target,
            duration: self.duration(kind),
            magnitude: self.magnitude(kind),
        });
        Ok(())
    }

    pub fn drain(&mut self) -> Vec<QueuedIntervention> {
        std::mem::take(&mut self.queue)
    }

    /// wall-clock cooldown decay
    pub fn tick_cooldowns(&mut self, delta: f64) {
        for meter in self.teams.iter_mut() {
            for cooldown in meter.cooldowns.iter_mut() {
                *cooldown = (*cooldown - delta).max(0.0);
            }
        }
    }

    /// passive trickle from simulated time
    pub fn on_ticks(&mut self, elapsed: Tick) {
        for meter in self.teams.iter_mut() {
            meter.passive_pool += elapsed;
            while meter.passive_pool >= self.settings.passive_interval_ticks {
                meter.passive_pool -= self.settings.passive_interval_ticks;
                meter.energy = (meter.energy + 1).min(self.settings.max_energy);
            }
        }
    }

    /// kills feed the opposing team
    pub fn on_deaths(&mut self, deaths: [u32; 2]) {
        for team in 0..2usize {
            let gained = deaths[1 - team] as Energy * self.settings.kill_gain;
            let meter = &mut self.teams[team];
            meter.energy = (meter.energy + gained).min(self.settings.max_energy);
        }
    }

    /// damage received converts at a fixed rate; the remainder carries
    pub fn on_damage(&mut self, taken: [i32; 2]) {
        for team in 0..2usize {
            let meter = &mut self.teams[team];
            meter.damage_pool += taken[team];
            while meter.damage_pool >= self.settings.damage_per_energy {
                meter.damage_pool -= self.settings.damage_per_energy;
                meter.energy = (meter.energy + 1).min(self.settings.max_energy);
            }
        }
    }

    fn duration(&self, kind: InterventionKind) -> Tick {
        match kind {
            InterventionKind::Focus => self.settings.focus_duration,
            InterventionKind::Accelerate => self.settings.accelerate_duration,
            InterventionKind::TacticalRetreat => self.settings.retreat_duration,
            _ => 0,
        }
    }

    fn magnitude(&self, kind: InterventionKind) -> i32 {
        match kind {
            InterventionKind::Barrier => self.settings.barrier_shield_hp,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> InterventionEngine {
        InterventionEngine::new(InterventionSettings::default())
    }

    #[test]
    fn empty_meter_rejects_with_the_bill() {
        let mut engine = engine();
        let err = engine.submit(0, InterventionKind::Barrier, 1000).expect_err("broke");
        assert!(err == Reject::InsufficientEnergy { have: 0, cost: 3 });
        assert!(format!("{}", err) == "Energia insufficiente (0/3)");
    }

    #[test]
    fn cooldown_rejects_with_seconds_left() {
        let mut engine = engine();
        engine.on_deaths([0, 5]); // 10 energy to team 0
        engine.submit(0, InterventionKind::Barrier, 1000).expect("charged");
        engine.on_damage([200, 0]); // recharge
        let err = engine.submit(0, InterventionKind::Barrier, 1000).expect_err("cooling");
        assert!(matches!(err, Reject::Cooldown { secs: 10 }));
        engine.tick_cooldowns(10.0);
        engine.submit(0, InterventionKind::Barrier, 1000).expect("cooled off");
    }

    #[test]
    fn passive_trickle_respects_the_interval() {
        let mut engine = engine();
        let interval = InterventionSettings::default().passive_interval_ticks;
        engine.on_ticks(interval - 1);
        assert!(engine.energy(0) == 0);
        engine.on_ticks(1);
        assert!(engine.energy(0) == 1);
        assert!(engine.energy(1) == 1);
    }

    #[test]
    fn damage_overflow_carries() {
        let mut engine = engine();
        let rate = InterventionSettings::default().damage_per_energy;
        engine.on_damage([rate + rate / 2, 0]);
        assert!(engine.energy(0) == 1);
        engine.on_damage([rate / 2, 0]);
        assert!(engine.energy(0) == 2);
        assert!(engine.energy(1) == 0);
    }

    #[test]
    fn kills_pay_the_opposing_team() {
        let mut engine = engine();
        engine.on_deaths([3, 0]);
        assert!(engine.energy(0) == 0);
        assert!(engine.energy(1) == 6);
    }

    #[test]
    fn energy_clamps_at_the_max()  {
        let mut engine = engine();
        engine.on_damage([100_000, 0]);
        assert!(engine.energy(0) == InterventionSettings::default().max_energy);
    }

    #[test]
    fn queue_drains_resolved_cards() {
        let mut engine = engine();
        engine.on_deaths([0, 5]);
        engine.submit(0, InterventionKind::Barrier, 1000).expect("charged");
        let queue = engine.drain();
        assert!(queue.len() == 1);
        assert!(queue[0].magnitude == InterventionSettings::default().barrier_shield_hp);
        assert!(engine.drain().is_empty());
    }
}

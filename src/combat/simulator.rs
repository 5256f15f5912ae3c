use super::*;
use crate::COMBAT_COLS;
use crate::COMBAT_ROWS;
use crate::BOARD_COLS;
use crate::InstanceId;
use crate::PlayerId;
use crate::Tick;
use crate::catalog::Catalog;
use crate::catalog::Class;
use crate::config::CombatSettings;
use crate::config::ResonanceSettings;
use crate::intervention::QueuedIntervention;
use crate::intervention::InterventionKind;
use crate::resonance::ResonanceBonus;
use crate::roster::Slot;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Deterministic fixed-timestep battle between two boards. Identical
/// inputs (boards, catalog, settings, seed, round) produce
/// byte-identical snapshots: one RNG seeded at construction, units
/// iterated in ascending instance id, integer arithmetic throughout,
/// and no wall-clock reads anywhere inside.
pub struct Simulator {
    units: Vec<CombatUnit>,
    tick: Tick,
    rng: SmallRng,
    done: bool,
    round: u32,
    players: [PlayerId; 2],
    settings: CombatSettings,
    events: Vec<CombatEvent>,
    damage_taken: [i32; 2],
}

impl Simulator {
    pub fn new(
        players: [PlayerId; 2],
        boards: [&[Slot]; 2],
        resonances: [&[ResonanceBonus]; 2],
        catalog: &Catalog,
        settings: CombatSettings,
        resonance_settings: &ResonanceSettings,
        seed: u64,
        round: u32,
    ) -> Self {
        let mut units = Vec::new();
        for (team, board) in boards.iter().enumerate() {
            for (index, slot) in board.iter().enumerate().filter(|(_, s)| !s.is_empty()) {
                let Some(def) = catalog.by_instance(slot.id) else {
                    log::error!("combat spawn: unknown catalog for instance {}", slot.id);
                    continue;
                };
                let col = (index % BOARD_COLS) as i32;
                let row = (index / BOARD_COLS) as i32;
                let col = match team {
                    0 => col,
                    _ => COMBAT_COLS as i32 - 1 - col,
                };
                let base = Stats::forge(def, slot.star, &settings, resonance_settings, resonances[team]);
                let instance = untaken(&units, slot.id);
                units.push(CombatUnit {
                    instance,
                    team: team as u8,
                    col,
                    row,
                    hp: base.max_hp,
                    mana: 0,
                    shield: 0,
                    base,
                    cooldown: base.attack_cooldown,
                    stride: 0,
                    effects: Vec::new(),
                    strategy: match def.class {
                        Class::Sniper | Class::Arcanist => Strategy::Farthest,
                        _ => Strategy::Nearest,
                    },
                    retreat: None,
                    focus: None,
                    abilities: def.abilities.clone(),
                    next_cast: 0,
                    alive: true,
                });
            }
        }
        units.sort_by_key(|u| u.instance);
        Self {
            units,
            tick: 0,
            rng: SmallRng::seed_from_u64(seed),
            done: false,
            round,
            players,
            settings,
            events: Vec::new(),
            damage_taken: [0, 0],
        }
    }

    pub fn done(&self) -> bool {
        self.done
    }
    /// safety-timer exit: close the fight on current standing
    pub fn finish(&mut self) {
        self.done = true;
    }
    pub fn tick(&self) -> Tick {
        self.tick
    }
    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }
    pub fn team_of(&self, instance: InstanceId) -> Option<u8> {
        self.units.iter().find(|u| u.instance == instance).map(|u| u.team)
    }

    /// Apply queued interventions, advance one snapshot interval (or
    /// less if the fight closes), and report the batch.
    pub fn step_batch(&mut self, pending: Vec<QueuedIntervention>) -> Snapshot {
        for intervention in pending {
            self.apply_intervention(intervention);
        }
        for _ in 0..self.settings.snapshot_interval_ticks {
            if self.done {
                break;
            }
            self.advance_tick();
            let alive0 = self.units.iter().any(|u| u.team == 0 && u.fighting());
            let alive1 = self.units.iter().any(|u| u.team == 1 && u.fighting());
            if self.tick >= self.settings.max_ticks || !alive0 || !alive1 {
                self.done = true;
            }
        }
        self.snapshot()
    }

    /// Final outcome; cap ties go to the bigger surviving side, then
    /// to the lower player id.
    pub fn result(&self) -> Option<CombatResult> {
        if !self.done {
            return None;
        }
        let survivors = |team: u8| {
            self.units
                .iter()
                .filter(move |u| u.team == team && u.alive)
                .map(|u| u.instance)
                .collect::<Vec<InstanceId>>()
        };
        let zero = survivors(0);
        let one = survivors(1);
        let holds0 = self.units.iter().any(|u| u.team == 0 && u.fighting());
        let holds1 = self.units.iter().any(|u| u.team == 1 && u.fighting());
        // a side still holding the field beats one that broke; the
        // tick cap falls back to head count, then the lower player id
        let winner_team = match (holds0, holds1) {
            (true, false) => 0,
            (false, true) => 1,
            _ => match zero.len().cmp(&one.len()) {
                std::cmp::Ordering::Greater => 0,
                std::cmp::Ordering::Less => 1,
                std::cmp::Ordering::Equal => match self.players[0] <= self.players[1] {
                    true => 0,
                    false => 1,
                },
            },
        };
        let standing = match winner_team {
            0 => zero,
            _ => one,
        };
        let damage = self.settings.base_damage + self.round as i32 + standing.len() as i32;
        Some(CombatResult {
            winner: self.players[winner_team],
            loser: self.players[1 - winner_team],
            damage,
            survivors: standing,
        })
    }
}

// the tick itself
impl Simulator {
    fn advance_tick(&mut self) {
        self.tick += 1;
        for i in 0..self.units.len() {
            if !self.units[i].alive {
                continue;
            }
            if self.step_retreat(i) {
                continue;
            }
            if self.units[i].stunned() {
                self.tick_effects(i);
                continue;
            }
            self.step_cooldown(i);
            let Some(target) = select(&self.units, i) else {
                self.tick_effects(i);
                continue;
            };
            let range = self.units[i].stats().range;
            let distance = self.units[i].chebyshev(&self.units[target]);
            if distance <= range {
                if self.units[i].cooldown == 0 {
                    self.engage(i, target);
                }
            } else {
                self.step_move(i, target);
            }
            self.tick_effects(i);
        }
    }

    fn step_retreat(&mut self, i: usize) -> bool {
        let Some(retreat) = &mut self.units[i].retreat else {
            return false;
        };
        retreat.ticks = retreat.ticks.saturating_sub(1);
        if retreat.ticks == 0 {
            let (col, row) = retreat.home;
            self.units[i].retreat = None;
            self.units[i].col = col;
            self.units[i].row = row;
        }
        true
    }

    fn step_cooldown(&mut self, i: usize) {
        self.units[i].cooldown = self.units[i].cooldown.saturating_sub(1);
        if self.units[i].hastened() {
            self.units[i].cooldown = self.units[i].cooldown.saturating_sub(1);
        }
    }

    fn engage(&mut self, i: usize, target: usize) {
        let stats = self.units[i].stats();
        let roll = self.rng.random_range(0..100);
        let crit = roll < stats.crit_chance;
        let damage = resolve(
            &mut self.units,
            i,
            target,
            stats.attack,
            DamageKind::Physical,
            crit,
            &mut self.events,
        );
        self.events.push(CombatEvent::Attack {
            attacker: self.units[i].instance,
            target: self.units[target].instance,
            damage,
            crit,
        });
        self.damage_taken[self.units[target].team as usize] += damage;
        // on-attack hooks: the ambush is spent
        if self.units[i].stealthed() {
            self.units[i].shed(EffectKind::Stealth);
        }
        self.units[i].cooldown = stats.attack_cooldown;
        self.units[i].gain_mana(self.settings.mana_per_attack);
        self.units[target].gain_mana(self.settings.mana_per_hit);
        if self.units[i].charged() {
            let ability = self.units[i].next_ability();
            cast(ability, i, &mut self.units, &mut self.events);
            self.units[i].mana = 0;
        }
    }

    /// one cell per filled accumulator, column before row
    fn step_move(&mut self, i: usize, target: usize) {
        self.units[i].stride += self.units[i].stats().move_speed;
        while self.units[i].stride >= 100 {
            self.units[i].stride -= 100;
            let dcol = self.units[target].col - self.units[i].col;
            let drow = self.units[target].row - self.units[i].row;
            if dcol != 0 {
                self.units[i].col += dcol.signum();
            } else if drow != 0 {
                self.units[i].row += drow.signum();
            }
        }
    }

    fn tick_effects(&mut self, i: usize) {
        let team = self.units[i].team as usize;
        let pulses = self.units[i]
            .effects
            .iter()
            .filter_map(|e| e.pulse())
            .collect::<Vec<i32>>();
        for damage in pulses {
            self.damage_taken[team] += damage;
            let unit = &mut self.units[i];
            unit.hp -= damage;
            if unit.hp <= 0 && unit.alive {
                unit.alive = false;
                self.events.push(CombatEvent::Death {
                    instance: unit.instance,
                });
            }
        }
        for effect in self.units[i].effects.iter_mut() {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        self.units[i].effects.retain(|e| e.remaining > 0);
        if let Some((_, ticks)) = &mut self.units[i].focus {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                self.units[i].focus = None;
            }
        }
    }
}

// interventions, applied at batch start
impl Simulator {
    fn apply_intervention(&mut self, q: QueuedIntervention) {
        self.events.push(CombatEvent::InterventionApplied {
            team: q.team,
            kind: q.kind.name().to_string(),
            target: q.target,
        });
        match q.kind {
            InterventionKind::Reposition => self.reposition(q.target),
            InterventionKind::Focus => {
                for unit in self.units.iter_mut() {
                    if unit.team == q.team && unit.fighting() {
                        unit.focus = Some((q.target, q.duration));
                    }
                }
            }
            InterventionKind::Barrier => {
                if let Some(unit) = self.units.iter_mut().find(|u| u.instance == q.target) {
                    unit.shield += q.magnitude;
                }
            }
            InterventionKind::Accelerate => {
                for unit in self.units.iter_mut() {
                    if unit.team == q.team && unit.alive {
                        unit.afflict(Effect::new(EffectKind::Haste, q.duration, 0));
                    }
                }
            }
            InterventionKind::TacticalRetreat => {
                let back = match q.team {
                    0 => 0,
                    _ => COMBAT_COLS as i32 - 1,
                };
                if let Some(unit) = self.units.iter_mut().find(|u| u.instance == q.target) {
                    unit.retreat = Some(Retreat {
                        ticks: q.duration,
                        home: (unit.col, unit.row),
                    });
                    unit.col = back;
                }
            }
        }
    }

    /// nudge the ally into the first free adjacent cell, scanning a
    /// fixed neighbor order so replays agree
    fn reposition(&mut self, target: InstanceId) {
        const NEIGHBORS: [(i32, i32); 8] = [
            (-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1),
        ];
        let Some(index) = self.units.iter().position(|u| u.instance == target) else {
            return;
        };
        let (col, row) = (self.units[index].col, self.units[index].row);
        for (dc, dr) in NEIGHBORS {
            let (c, r) = (col + dc, row + dr);
            if c < 0 || r < 0 || c >= COMBAT_COLS as i32 || r >= COMBAT_ROWS as i32 {
                continue;
            }
            let occupied = self
                .units
                .iter()
                .any(|u| u.alive && u.col == c && u.row == r);
            if !occupied {
                self.units[index].col = c;
                self.units[index].row = r;
                return;
            }
        }
    }
}

// snapshots
impl Simulator {
    fn snapshot(&mut self) -> Snapshot {
        let events = std::mem::take(&mut self.events);
        let mut deaths = [0u32; 2];
        for event in events.iter() {
            if let CombatEvent::Death { instance } = event {
                if let Some(team) = self.team_of(*instance) {
                    deaths[team as usize] += 1;
                }
            }
        }
        let damage_taken = std::mem::take(&mut self.damage_taken);
        Snapshot {
            tick: self.tick,
            units: self.units.iter().map(UnitView::from).collect(),
            events,
            done: self.done,
            deaths,
            damage_taken,
        }
    }
}

/// ghost boards can mirror live ones; nudge the copy digits until the
/// id is unique inside this combat
fn untaken(units: &[CombatUnit], wanted: InstanceId) -> InstanceId {
    let catalog = wanted / crate::INSTANCE_STRIDE;
    let mut copy = wanted % crate::INSTANCE_STRIDE;
    let mut id = wanted;
    while units.iter().any(|u| u.instance == id) {
        copy = (copy + 1) % crate::INSTANCE_STRIDE;
        id = catalog * crate::INSTANCE_STRIDE + copy;
    }
    id
}

impl std::fmt::Display for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use colored::Colorize;
        for row in 0..COMBAT_ROWS as i32 {
            for col in 0..COMBAT_COLS as i32 {
                let cell = self
                    .units
                    .iter()
                    .find(|u| u.alive && u.col == col && u.row == row);
                match cell {
                    Some(u) if u.team == 0 => write!(f, "{}", "o".green())?,
                    Some(_) => write!(f, "{}", "x".red())?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "t{:>5}", self.tick)
    }
}

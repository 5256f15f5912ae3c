use super::CombatUnit;
use super::EffectKind;
use crate::AbilityId;
use crate::Health;
use crate::InstanceId;
use crate::PlayerId;
use crate::Tick;
use serde::Deserialize;
use serde::Serialize;

/// Everything a batch can report. Clients render purely from these;
/// the server also folds Death and Attack into intervention energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    Attack {
        attacker: InstanceId,
        target: InstanceId,
        damage: i32,
        crit: bool,
    },
    Death {
        instance: InstanceId,
    },
    AbilityCast {
        caster: InstanceId,
        ability: AbilityId,
        name: String,
    },
    Healed {
        target: InstanceId,
        amount: i32,
    },
    Shielded {
        target: InstanceId,
        amount: i32,
    },
    EffectApplied {
        target: InstanceId,
        kind: EffectKind,
    },
    Reflected {
        target: InstanceId,
        amount: i32,
    },
    InterventionApplied {
        team: u8,
        kind: String,
        target: InstanceId,
    },
}

/// Per-unit render state inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: InstanceId,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub shield: i32,
    pub col: i32,
    pub row: i32,
    pub alive: bool,
}

impl From<&CombatUnit> for UnitView {
    fn from(unit: &CombatUnit) -> Self {
        Self {
            id: unit.instance,
            hp: unit.hp,
            max_hp: unit.base.max_hp,
            mana: unit.mana,
            max_mana: unit.base.max_mana,
            shield: unit.shield,
            col: unit.col,
            row: unit.row,
            alive: unit.alive,
        }
    }
}

/// Value-type batch output: tick counter, unit views, the events the
/// batch produced, and the per-team death/damage tallies the
/// intervention engine feeds on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub units: Vec<UnitView>,
    pub events: Vec<CombatEvent>,
    pub done: bool,
    pub deaths: [u32; 2],
    pub damage_taken: [i32; 2],
}

/// Final outcome, emitted exactly once when a combat closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatResult {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub damage: Health,
    pub survivors: Vec<InstanceId>,
}

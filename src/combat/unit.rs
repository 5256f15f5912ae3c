use super::Effect;
use super::EffectKind;
use super::Stats;
use crate::AbilityId;
use crate::InstanceId;
use crate::Tick;

/// Targeting strategy assigned at spawn by class: frontline classes
/// hunt the nearest enemy, backline classes the farthest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Nearest,
    Farthest,
}

/// Tactical retreat in flight: ticks left and the cell to restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retreat {
    pub ticks: Tick,
    pub home: (i32, i32),
}

/// One live combatant. Created fresh when a combat starts, never
/// outlives it. The stat snapshot in `base` is immutable; effective
/// stats are re-derived through the effect modifiers on every query.
#[derive(Debug, Clone)]
pub struct CombatUnit {
    pub instance: InstanceId,
    pub team: u8,
    pub col: i32,
    pub row: i32,
    pub hp: i32,
    pub mana: i32,
    pub shield: i32,
    pub base: Stats,
    pub cooldown: Tick,
    pub stride: i32,
    pub effects: Vec<Effect>,
    pub strategy: Strategy,
    pub retreat: Option<Retreat>,
    pub focus: Option<(InstanceId, Tick)>,
    pub abilities: Vec<AbilityId>,
    pub next_cast: usize,
    pub alive: bool,
}

impl CombatUnit {
    /// effective stats right now: pure composition over active effects
    pub fn stats(&self) -> Stats {
        self.effects
            .iter()
            .fold(self.base, |stats, effect| effect.modify_stats(stats))
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }
    pub fn stunned(&self) -> bool {
        self.effects.iter().any(|e| e.prevents_action())
    }
    pub fn stealthed(&self) -> bool {
        self.has(EffectKind::Stealth)
    }
    pub fn hastened(&self) -> bool {
        self.has(EffectKind::Haste)
    }
    pub fn retreating(&self) -> bool {
        self.retreat.is_some()
    }
    /// a unit counts toward its side while alive and not in retreat
    pub fn fighting(&self) -> bool {
        self.alive && !self.retreating()
    }

    /// reapplying a kind keeps the longer run and the new magnitude
    pub fn afflict(&mut self, effect: Effect) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(active) => {
                active.remaining = active.remaining.max(effect.remaining);
                active.magnitude = effect.magnitude;
            }
            None => self.effects.push(effect),
        }
    }

    pub fn shed(&mut self, kind: EffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.col - other.col).abs().max((self.row - other.row).abs())
    }

    pub fn gain_mana(&mut self, amount: i32) {
        self.mana = (self.mana + amount).min(self.base.max_mana);
    }

    /// ready to cast: mana full and at least one ability known
    pub fn charged(&self) -> bool {
        !self.abilities.is_empty() && self.base.max_mana > 0 && self.mana >= self.base.max_mana
    }

    /// abilities rotate; multi-caster units alternate their kit
    pub fn next_ability(&mut self) -> crate::AbilityId {
        let ability = self.abilities[self.next_cast % self.abilities.len()];
        self.next_cast += 1;
        ability
    }
}

use super::Stats;
use crate::Tick;
use serde::Deserialize;
use serde::Serialize;

/// Closed set of status effects. Each variant participates in a fixed
/// set of hooks: action gating, pure stat modification, the two damage
/// pipeline stages, the per-tick pulse and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Stun,
    Freeze,
    Haste,
    Venom,
    Stealth,
    Reflect,
    Vulnerable,
    Invulnerable,
}

/// One active effect on one unit. `magnitude` is kind-specific:
/// Venom damage per pulse, Reflect and Vulnerable percentages,
/// unused elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    pub remaining: Tick,
    pub magnitude: i32,
}

impl Effect {
    pub fn new(kind: EffectKind, remaining: Tick, magnitude: i32) -> Self {
        Self {
            kind,
            remaining,
            magnitude,
        }
    }

    /// stun and freeze suspend the whole action step
    pub fn prevents_action(&self) -> bool {
        matches!(self.kind, EffectKind::Stun | EffectKind::Freeze)
    }

    /// pure: reads a stat bundle, returns the adjusted one. The
    /// simulator composes the full pipeline fresh on every query, so
    /// nothing accumulates across ticks.
    pub fn modify_stats(&self, stats: Stats) -> Stats {
        match self.kind {
            EffectKind::Vulnerable => Stats {
                defense: (stats.defense - self.magnitude).max(0),
                ..stats
            },
            _ => stats,
        }
    }

    /// venom pulses once a second
    pub fn pulse(&self) -> Option<i32> {
        match self.kind {
            EffectKind::Venom if self.remaining % crate::TICKS_PER_SECOND == 0 => {
                Some(self.magnitude)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            max_hp: 100,
            max_mana: 0,
            attack: 10,
            defense: 20,
            magic_resist: 0,
            range: 1,
            crit_chance: 0,
            crit_multiplier_x100: 150,
            attack_cooldown: 30,
            move_speed: 25,
        }
    }

    #[test]
    fn vulnerable_shreds_defense_without_mutating() {
        let effect = Effect::new(EffectKind::Vulnerable, 60, 25);
        let base = stats();
        let shredded = effect.modify_stats(base);
        assert!(shredded.defense == 0);
        assert!(base.defense == 20);
        // composing twice from the same base gives the same answer
        assert!(effect.modify_stats(base) == shredded);
    }

    #[test]
    fn only_stun_and_freeze_gate_actions() {
        assert!(Effect::new(EffectKind::Stun, 10, 0).prevents_action());
        assert!(Effect::new(EffectKind::Freeze, 10, 0).prevents_action());
        assert!(!Effect::new(EffectKind::Haste, 10, 0).prevents_action());
        assert!(!Effect::new(EffectKind::Stealth, 10, 0).prevents_action());
    }

    #[test]
    fn venom_pulses_on_the_second() {
        let hot = Effect::new(EffectKind::Venom, 120, 7);
        assert!(hot.pulse() == Some(7));
        let cold = Effect::new(EffectKind::Venom, 119, 7);
        assert!(cold.pulse().is_none());
    }
}

use crate::Tick;
use crate::catalog::EchoDefinition;
use crate::config::CombatSettings;
use crate::config::ResonanceSettings;
use crate::resonance::ResonanceBonus;

/// Effective stat bundle of one combat unit. Built once at spawn from
/// the catalog entry, star level, class tables and the owning board's
/// resonance tiers, then re-derived each query through the pure
/// status-effect modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub max_hp: i32,
    pub max_mana: i32,
    pub attack: i32,
    pub defense: i32,
    pub magic_resist: i32,
    pub range: i32,
    pub crit_chance: i32,
    pub crit_multiplier_x100: i32,
    pub attack_cooldown: Tick,
    pub move_speed: i32,
}

impl Stats {
    /// spawn-time snapshot: base stats, star multipliers, class tables,
    /// resonance tier bonus for the unit's own kind
    pub fn forge(
        def: &EchoDefinition,
        star: u8,
        combat: &CombatSettings,
        resonance: &ResonanceSettings,
        active: &[ResonanceBonus],
    ) -> Self {
        let mut hp = def.stats.hp;
        let mut attack = def.stats.attack;
        if star >= 2 {
            let index = (star as usize - 2).min(1);
            hp = hp * combat.star_hp_multiplier_x100[index] / 100;
            attack = attack * combat.star_attack_multiplier_x100[index] / 100;
        }
        if let Some(tier) = tier_for(def, active) {
            hp += resonance.tier_hp_bonus[tier as usize - 1];
            attack += resonance.tier_attack_bonus[tier as usize - 1];
        }
        let class = def.class.index();
        let cooldown = combat.class_cooldown[class] * 100 / def.stats.attack_speed.max(1) as Tick;
        let range = match def.stats.attack_range {
            0 => combat.class_range[class],
            r => r,
        };
        Self {
            max_hp: hp,
            max_mana: def.stats.mana,
            attack,
            defense: def.stats.defense,
            magic_resist: def.stats.magic_resist,
            range,
            crit_chance: def.stats.crit_chance,
            crit_multiplier_x100: def.stats.crit_multiplier_x100,
            attack_cooldown: cooldown.max(1),
            move_speed: combat.move_speed,
        }
    }
}

/// a unit enjoys its own kind's active tier; Prism rides the highest
fn tier_for(def: &EchoDefinition, active: &[ResonanceBonus]) -> Option<u8> {
    use crate::catalog::ResonanceKind;
    match def.resonance {
        ResonanceKind::Prism => active.iter().map(|b| b.tier).max(),
        kind => active.iter().find(|b| b.kind == kind).map(|b| b.tier),
    }
    .filter(|t| *t > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn stars_scale_hp_and_attack() {
        let catalog = Catalog::standard();
        let combat = CombatSettings::default();
        let resonance = ResonanceSettings::default();
        let def = catalog.by_id(1).expect("catalog id 1");
        let one = Stats::forge(def, 1, &combat, &resonance, &[]);
        let two = Stats::forge(def, 2, &combat, &resonance, &[]);
        let three = Stats::forge(def, 3, &combat, &resonance, &[]);
        assert!(one.max_hp == def.stats.hp);
        assert!(two.max_hp == def.stats.hp * combat.star_hp_multiplier_x100[0] / 100);
        assert!(three.attack == def.stats.attack * combat.star_attack_multiplier_x100[1] / 100);
    }

    #[test]
    fn attack_speed_shortens_the_cooldown() {
        let catalog = Catalog::standard();
        let combat = CombatSettings::default();
        let resonance = ResonanceSettings::default();
        // Emberblade carries 110 attack speed
        let def = catalog.by_id(6).expect("catalog id 6");
        let stats = Stats::forge(def, 1, &combat, &resonance, &[]);
        let class = def.class.index();
        assert!(stats.attack_cooldown < combat.class_cooldown[class]);
    }
}

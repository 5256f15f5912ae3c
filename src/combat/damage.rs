use super::CombatEvent;
use super::CombatUnit;
use super::EffectKind;

/// Which mitigation stat the first pipeline stage subtracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Physical,
    Magical,
}

/// The ordered damage pipeline. Every point of damage in the game
/// flows through here, ability handlers included, so reflect,
/// invulnerability and shields behave the same everywhere:
///
///   1. mitigation: max(1, dmg - defense | magic resist)
///   2. crit multiplier
///   3. attacker on-deal hooks, then target on-receive hooks
///   4. shield absorption
///   5. hp application + death event
///
/// Returns the post-hook damage (the number an attack event reports).
pub fn resolve(
    units: &mut [CombatUnit],
    attacker: usize,
    target: usize,
    base: i32,
    kind: DamageKind,
    crit: bool,
    events: &mut Vec<CombatEvent>,
) -> i32 {
    debug_assert!(attacker != target);
    let mitigation = match kind {
        DamageKind::Physical => units[target].stats().defense,
        DamageKind::Magical => units[target].stats().magic_resist,
    };
    let mut damage = (base - mitigation).max(1);
    if crit {
        damage = damage * units[attacker].stats().crit_multiplier_x100 / 100;
    }
    // attacker hooks: striking out of stealth hits half again as hard
    if units[attacker].stealthed() {
        damage += damage / 2;
    }
    // target hooks
    let mut reflected = 0;
    for effect in units[target].effects.clone() {
        match effect.kind {
            EffectKind::Invulnerable => damage = 0,
            EffectKind::Reflect => reflected = damage * effect.magnitude / 100,
            _ => {}
        }
    }
    let absorbed = damage.min(units[target].shield);
    units[target].shield -= absorbed;
    apply(units, target, damage - absorbed, events);
    if reflected > 0 {
        events.push(CombatEvent::Reflected {
            target: units[attacker].instance,
            amount: reflected,
        });
        apply(units, attacker, reflected, events);
    }
    damage
}

/// raw hp application with the death check; pipeline stage five
fn apply(units: &mut [CombatUnit], index: usize, damage: i32, events: &mut Vec<CombatEvent>) {
    let unit = &mut units[index];
    unit.hp -= damage;
    if unit.hp <= 0 && unit.alive {
        unit.alive = false;
        events.push(CombatEvent::Death {
            instance: unit.instance,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Effect;
    use crate::combat::testkit::dummy;

    #[test]
    fn mitigation_floors_at_one() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].base.defense = 50;
        let mut events = Vec::new();
        let dealt = resolve(&mut units, 0, 1, 10, DamageKind::Physical, false, &mut events);
        assert!(dealt == 1);
        assert!(units[1].hp == 99);
    }

    #[test]
    fn crits_multiply_after_mitigation() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].base.defense = 4;
        let mut events = Vec::new();
        // (10 - 4) * 150 / 100 = 9
        let dealt = resolve(&mut units, 0, 1, 10, DamageKind::Physical, true, &mut events);
        assert!(dealt == 9);
    }

    #[test]
    fn shields_absorb_before_hp() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].shield = 6;
        let mut events = Vec::new();
        let dealt = resolve(&mut units, 0, 1, 10, DamageKind::Physical, false, &mut events);
        assert!(dealt == 10);
        assert!(units[1].shield == 0);
        assert!(units[1].hp == 96);
    }

    #[test]
    fn invulnerability_zeroes_everything() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].afflict(Effect::new(EffectKind::Invulnerable, 30, 0));
        let mut events = Vec::new();
        resolve(&mut units, 0, 1, 100, DamageKind::Physical, false, &mut events);
        assert!(units[1].hp == 100);
        assert!(events.is_empty());
    }

    #[test]
    fn reflect_returns_a_share_to_the_attacker() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].afflict(Effect::new(EffectKind::Reflect, 60, 30));
        let mut events = Vec::new();
        resolve(&mut units, 0, 1, 20, DamageKind::Physical, false, &mut events);
        assert!(units[1].hp == 80);
        assert!(units[0].hp == 94);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::Reflected { amount: 6, .. })));
    }

    #[test]
    fn lethal_damage_emits_exactly_one_death() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        units[1].hp = 5;
        let mut events = Vec::new();
        resolve(&mut units, 0, 1, 50, DamageKind::Physical, false, &mut events);
        resolve(&mut units, 0, 1, 50, DamageKind::Physical, false, &mut events);
        let deaths = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::Death { instance: 2000 }))
            .count();
        assert!(deaths == 1);
        assert!(!units[1].alive);
    }
}

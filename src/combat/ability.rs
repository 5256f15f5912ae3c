use super::*;
use crate::AbilityId;
use crate::catalog;

/// Ability dispatch: the extension point for the game's mechanical
/// variety. A handler reads the whole unit list, may mutate hp,
/// shields, positions and effects, and must route damage through the
/// pipeline so reflects and shields keep their meaning. Every handler
/// emits at least the cast event.
pub fn cast(ability: AbilityId, caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    events.push(CombatEvent::AbilityCast {
        caster: units[caster].instance,
        ability,
        name: catalog::ability_name(ability).to_string(),
    });
    match ability {
        catalog::MEND => mend(caster, units, events),
        catalog::SHOCKWAVE => shockwave(caster, units, events),
        catalog::CHAIN_STRIKE => chain_strike(caster, units, events),
        catalog::BULWARK => bulwark(caster, units, events),
        catalog::RALLY => rally(caster, units, events),
        catalog::VENOM => venom(caster, units, events),
        catalog::PIERCING_SHOT => piercing_shot(caster, units, events),
        catalog::VEIL => veil(caster, units, events),
        unknown => log::error!("unknown ability id {}", unknown),
    }
}

/// top up the most wounded living ally by 30% of their own max hp
fn mend(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let team = units[caster].team;
    let Some(target) = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.team == team && u.alive)
        .min_by_key(|(_, u)| (u.hp * 100 / u.base.max_hp.max(1), u.instance))
        .map(|(i, _)| i)
    else {
        return;
    };
    let amount = units[target].base.max_hp * 30 / 100;
    units[target].hp = (units[target].hp + amount).min(units[target].base.max_hp);
    events.push(CombatEvent::Healed {
        target: units[target].instance,
        amount,
    });
}

/// slam every adjacent enemy: magic damage plus a one second stun
fn shockwave(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let attack = units[caster].stats().attack;
    for target in enemies_by_distance(units, caster) {
        if units[caster].chebyshev(&units[target]) > 1 {
            break;
        }
        resolve(units, caster, target, attack, DamageKind::Magical, false, events);
        units[target].afflict(Effect::new(EffectKind::Stun, 60, 0));
        events.push(CombatEvent::EffectApplied {
            target: units[target].instance,
            kind: EffectKind::Stun,
        });
    }
}

/// arc through the three nearest enemies at 80% attack
fn chain_strike(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let attack = units[caster].stats().attack * 80 / 100;
    for target in enemies_by_distance(units, caster).into_iter().take(3) {
        resolve(units, caster, target, attack, DamageKind::Physical, false, events);
    }
}

/// wall up: shields for caster and adjacent allies, thorns on caster
fn bulwark(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let team = units[caster].team;
    let amount = units[caster].base.max_hp * 25 / 100;
    let wall = units
        .iter()
        .enumerate()
        .filter(|(i, u)| u.team == team && u.alive && units[caster].chebyshev(u) <= 1 || *i == caster)
        .map(|(i, _)| i)
        .collect::<Vec<usize>>();
    for index in wall {
        units[index].shield += amount;
        events.push(CombatEvent::Shielded {
            target: units[index].instance,
            amount,
        });
    }
    units[caster].afflict(Effect::new(EffectKind::Reflect, 180, 20));
    events.push(CombatEvent::EffectApplied {
        target: units[caster].instance,
        kind: EffectKind::Reflect,
    });
}

/// three seconds of haste for the whole line
fn rally(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let team = units[caster].team;
    for unit in units.iter_mut().filter(|u| u.team == team && u.alive) {
        unit.afflict(Effect::new(EffectKind::Haste, 180, 0));
        events.push(CombatEvent::EffectApplied {
            target: unit.instance,
            kind: EffectKind::Haste,
        });
    }
}

/// bite the nearest enemy, then leave it rotting for three seconds
fn venom(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let Some(target) = enemies_by_distance(units, caster).into_iter().next() else {
        return;
    };
    let attack = units[caster].stats().attack;
    resolve(units, caster, target, attack / 2, DamageKind::Magical, false, events);
    units[target].afflict(Effect::new(EffectKind::Venom, 180, (attack / 4).max(1)));
    events.push(CombatEvent::EffectApplied {
        target: units[target].instance,
        kind: EffectKind::Venom,
    });
}

/// snipe the farthest enemy at double attack and shred its armor
fn piercing_shot(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    let Some(target) = enemies_by_distance(units, caster).into_iter().next_back() else {
        return;
    };
    let attack = units[caster].stats().attack * 2;
    resolve(units, caster, target, attack, DamageKind::Physical, false, events);
    units[target].afflict(Effect::new(EffectKind::Vulnerable, 120, 25));
    events.push(CombatEvent::EffectApplied {
        target: units[target].instance,
        kind: EffectKind::Vulnerable,
    });
}

/// fade out: untargetable for two seconds, untouchable for half of one
fn veil(caster: usize, units: &mut [CombatUnit], events: &mut Vec<CombatEvent>) {
    units[caster].afflict(Effect::new(EffectKind::Stealth, 120, 0));
    units[caster].afflict(Effect::new(EffectKind::Invulnerable, 30, 0));
    events.push(CombatEvent::EffectApplied {
        target: units[caster].instance,
        kind: EffectKind::Stealth,
    });
}

/// living enemies sorted by (chebyshev, instance id)
fn enemies_by_distance(units: &[CombatUnit], caster: usize) -> Vec<usize> {
    let me = &units[caster];
    let mut enemies = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.team != me.team && u.alive)
        .map(|(i, u)| (me.chebyshev(u), u.instance, i))
        .collect::<Vec<(i32, crate::InstanceId, usize)>>();
    enemies.sort();
    enemies.into_iter().map(|(_, _, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::testkit::dummy;

    #[test]
    fn mend_heals_the_most_wounded_ally() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(1001, 0, 1, 0), dummy(2000, 1, 7, 0)];
        units[1].hp = 40;
        let mut events = Vec::new();
        cast(catalog::MEND, 0, &mut units, &mut events);
        assert!(units[1].hp == 70);
        assert!(units[2].hp == 100);
    }

    #[test]
    fn shockwave_only_reaches_adjacent_enemies() {
        let mut units = vec![dummy(1000, 0, 3, 0), dummy(2000, 1, 4, 0), dummy(2001, 1, 7, 0)];
        let mut events = Vec::new();
        cast(catalog::SHOCKWAVE, 0, &mut units, &mut events);
        assert!(units[1].hp < 100);
        assert!(units[1].stunned());
        assert!(units[2].hp == 100);
        assert!(!units[2].stunned());
    }

    #[test]
    fn chain_strike_caps_at_three_links() {
        let mut units = vec![dummy(1000, 0, 0, 0)];
        for i in 0..4 {
            units.push(dummy(2000 + i, 1, 1 + i, 0));
        }
        let mut events = Vec::new();
        cast(catalog::CHAIN_STRIKE, 0, &mut units, &mut events);
        let hit = units.iter().filter(|u| u.hp < 100).count();
        assert!(hit == 3);
        assert!(units[4].hp == 100);
    }

    #[test]
    fn bulwark_shields_the_neighborhood() {
        let mut units = vec![dummy(1000, 0, 3, 1), dummy(1001, 0, 3, 2), dummy(1002, 0, 0, 3)];
        units.push(dummy(2000, 1, 7, 0));
        let mut events = Vec::new();
        cast(catalog::BULWARK, 0, &mut units, &mut events);
        assert!(units[0].shield == 25);
        assert!(units[1].shield == 25);
        assert!(units[2].shield == 0);
        assert!(units[0].has(EffectKind::Reflect));
    }

    #[test]
    fn veil_makes_the_caster_unpickable() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        let mut events = Vec::new();
        cast(catalog::VEIL, 0, &mut units, &mut events);
        assert!(crate::combat::select(&units, 1).is_none());
    }

    #[test]
    fn every_cast_announces_itself() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0)];
        for ability in [
            catalog::MEND,
            catalog::SHOCKWAVE,
            catalog::CHAIN_STRIKE,
            catalog::BULWARK,
            catalog::RALLY,
            catalog::VENOM,
            catalog::PIERCING_SHOT,
            catalog::VEIL,
        ] {
            let mut events = Vec::new();
            cast(ability, 0, &mut units, &mut events);
            assert!(matches!(events.first(), Some(CombatEvent::AbilityCast { .. })));
        }
    }
}

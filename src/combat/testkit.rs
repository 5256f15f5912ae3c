use super::*;
use crate::InstanceId;

/// bare melee body for pipeline and targeting tests
pub fn dummy(instance: InstanceId, team: u8, col: i32, row: i32) -> CombatUnit {
    CombatUnit {
        instance,
        team,
        col,
        row,
        hp: 100,
        mana: 0,
        shield: 0,
        base: Stats {
            max_hp: 100,
            max_mana: 0,
            attack: 10,
            defense: 0,
            magic_resist: 0,
            range: 1,
            crit_chance: 0,
            crit_multiplier_x100: 150,
            attack_cooldown: 30,
            move_speed: 25,
        },
        cooldown: 0,
        stride: 0,
        effects: Vec::new(),
        strategy: Strategy::Nearest,
        retreat: None,
        focus: None,
        abilities: Vec::new(),
        next_cast: 0,
        alive: true,
    }
}

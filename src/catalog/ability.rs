use crate::AbilityId;

// ability identifiers, dispatched by the combat simulator
pub const MEND: AbilityId = 1;
pub const SHOCKWAVE: AbilityId = 2;
pub const CHAIN_STRIKE: AbilityId = 3;
pub const BULWARK: AbilityId = 4;
pub const RALLY: AbilityId = 5;
pub const VENOM: AbilityId = 6;
pub const PIERCING_SHOT: AbilityId = 7;
pub const VEIL: AbilityId = 8;

pub fn ability_name(id: AbilityId) -> &'static str {
    match id {
        MEND => "Mend",
        SHOCKWAVE => "Shockwave",
        CHAIN_STRIKE => "Chain Strike",
        BULWARK => "Bulwark",
        RALLY => "Rally",
        VENOM => "Venom",
        PIERCING_SHOT => "Piercing Shot",
        VEIL => "Veil",
        _ => "Unknown",
    }
}

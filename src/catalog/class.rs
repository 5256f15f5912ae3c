use serde::Deserialize;
use serde::Serialize;

/// Combat archetype. Indexes the per-class cooldown and range tables
/// in CombatSettings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    Vanguard,
    Striker,
    Arcanist,
    Warden,
    Sniper,
}

impl Class {
    pub fn index(&self) -> usize {
        match self {
            Self::Vanguard => 0,
            Self::Striker => 1,
            Self::Arcanist => 2,
            Self::Warden => 3,
            Self::Sniper => 4,
        }
    }
}

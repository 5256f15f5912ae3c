use crate::Gold;
use serde::Deserialize;
use serde::Serialize;

/// Echo rarity. Cost doubles as the sell refund, no discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    pub fn cost(&self) -> Gold {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::Epic => 4,
            Self::Legendary => 5,
        }
    }

    /// next rarity down for the exhausted-pool cascade
    pub fn below(&self) -> Option<Self> {
        match self {
            Self::Common => None,
            Self::Uncommon => Some(Self::Common),
            Self::Rare => Some(Self::Uncommon),
            Self::Epic => Some(Self::Rare),
            Self::Legendary => Some(Self::Epic),
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Common => write!(f, "C"),
            Self::Uncommon => write!(f, "U"),
            Self::Rare => write!(f, "R"),
            Self::Epic => write!(f, "E"),
            Self::Legendary => write!(f, "L"),
        }
    }
}

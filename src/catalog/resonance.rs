use serde::Deserialize;
use serde::Serialize;

/// Categorical tag on every echo. Enough copies of one kind on the
/// board unlock tiered bonuses; Prism is the wildcard that counts
/// toward every other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResonanceKind {
    Ember,
    Frost,
    Storm,
    Verdant,
    Umbral,
    Prism,
}

impl ResonanceKind {
    pub const TANGIBLE: [Self; 5] = [
        Self::Ember,
        Self::Frost,
        Self::Storm,
        Self::Verdant,
        Self::Umbral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ember => "Ember",
            Self::Frost => "Frost",
            Self::Storm => "Storm",
            Self::Verdant => "Verdant",
            Self::Umbral => "Umbral",
            Self::Prism => "Prism",
        }
    }
}

impl std::fmt::Display for ResonanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

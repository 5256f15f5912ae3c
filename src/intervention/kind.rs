use serde::Deserialize;
use serde::Serialize;

/// The five mid-combat cards. Accelerate is the only targetless one;
/// the rest name one ally or one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionKind {
    Reposition,
    Focus,
    Barrier,
    Accelerate,
    TacticalRetreat,
}

impl InterventionKind {
    pub const ALL: [Self; 5] = [
        Self::Reposition,
        Self::Focus,
        Self::Barrier,
        Self::Accelerate,
        Self::TacticalRetreat,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Reposition => 0,
            Self::Focus => 1,
            Self::Barrier => 2,
            Self::Accelerate => 3,
            Self::TacticalRetreat => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reposition => "Reposition",
            Self::Focus => "Focus",
            Self::Barrier => "Barrier",
            Self::Accelerate => "Accelerate",
            Self::TacticalRetreat => "TacticalRetreat",
        }
    }

    /// an enemy unit for Focus, an ally for the single-target rest
    pub fn targets_enemy(&self) -> bool {
        matches!(self, Self::Focus)
    }
    pub fn targetless(&self) -> bool {
        matches!(self, Self::Accelerate)
    }
}

impl TryFrom<&str> for InterventionKind {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown intervention card: {}", s))
    }
}

impl std::fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

use crate::Energy;

/// Every way the server says no. The Display strings are the exact
/// user-facing reasons carried by ActionRejected; the connection stays
/// open and state stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    BenchFull,
    InsufficientGold,
    EmptySlot,
    SlotOccupied,
    OutOfBounds,
    BoardLimit,
    UnknownInstance,
    UnknownPlayer,
    InsufficientEnergy { have: Energy, cost: Energy },
    Cooldown { secs: u32 },
    NoActiveCombat,
    UnknownCard,
    MatchOver,
}

impl std::fmt::Display for Reject {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BenchFull => write!(f, "Panchina piena"),
            Self::InsufficientGold => write!(f, "Oro insufficiente"),
            Self::EmptySlot => write!(f, "Slot vuoto"),
            Self::SlotOccupied => write!(f, "Slot occupato"),
            Self::OutOfBounds => write!(f, "Posizione fuori dalla griglia"),
            Self::BoardLimit => write!(f, "Limite di schieramento raggiunto"),
            Self::UnknownInstance => write!(f, "Unita sconosciuta"),
            Self::UnknownPlayer => write!(f, "Giocatore sconosciuto"),
            Self::InsufficientEnergy { have, cost } => {
                write!(f, "Energia insufficiente ({}/{})", have, cost)
            }
            Self::Cooldown { secs } => write!(f, "Cooldown: {}s", secs),
            Self::NoActiveCombat => write!(f, "Nessun combattimento attivo"),
            Self::UnknownCard => write!(f, "Carta sconosciuta"),
            Self::MatchOver => write!(f, "Partita terminata"),
        }
    }
}

impl std::error::Error for Reject {}

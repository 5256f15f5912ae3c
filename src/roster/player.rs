use crate::EMPTY;
use crate::Experience;
use crate::Gold;
use crate::Health;
use crate::InstanceId;
use crate::PlayerId;
use crate::config::PlayerSettings;
use crate::resonance::ResonanceBonus;
use serde::Deserialize;
use serde::Serialize;

/// One cell of a board or bench array. Either empty (sentinel id -1,
/// star 0) or holding a single echo instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: InstanceId,
    pub star: u8,
}

impl Slot {
    pub const EMPTY: Self = Self { id: EMPTY, star: 0 };

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY
    }
    pub fn holds(&self, instance: InstanceId) -> bool {
        self.id == instance
    }
}

/// Where a seat stands while a round is active. Exactly one of these
/// is true between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Preparing,
    Fighting,
    Eliminated,
}

/// Authoritative per-seat state. Mutated only through PlayerStore
/// transforms; every published copy is a full snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRuntime {
    pub id: PlayerId,
    pub name: String,
    pub is_ready: bool,
    pub health: Health,
    pub gold: Gold,
    pub level: u8,
    pub xp: Experience,
    pub board: Vec<Slot>,
    pub bench: Vec<Slot>,
    pub resonances: Vec<ResonanceBonus>,
    pub mutations: Vec<i32>,
    pub win_streak: u32,
    pub loss_streak: u32,
    pub standing: Standing,
}

impl PlayerRuntime {
    pub fn new(id: PlayerId, name: String, settings: &PlayerSettings) -> Self {
        Self {
            id,
            name,
            is_ready: false,
            health: settings.starting_health,
            gold: settings.starting_gold,
            level: 1,
            xp: 0,
            board: vec![Slot::EMPTY; crate::BOARD_SLOTS],
            bench: vec![Slot::EMPTY; crate::BENCH_SLOTS],
            resonances: Vec::new(),
            mutations: Vec::new(),
            win_streak: 0,
            loss_streak: 0,
            standing: Standing::Preparing,
        }
    }

    pub fn alive(&self) -> bool {
        self.health > 0 && self.standing != Standing::Eliminated
    }
    pub fn board_count(&self) -> usize {
        self.board.iter().filter(|s| !s.is_empty()).count()
    }
    pub fn first_empty_bench(&self) -> Option<usize> {
        self.bench.iter().position(|s| s.is_empty())
    }

    /// locate an instance: Ok(true, i) on board, Ok(false, i) on bench
    pub fn find(&self, instance: InstanceId) -> Option<(bool, usize)> {
        self.board
            .iter()
            .position(|s| s.holds(instance))
            .map(|i| (true, i))
            .or_else(|| self.bench.iter().position(|s| s.holds(instance)).map(|i| (false, i)))
    }

    /// streak length feeding the end-of-round bonus table
    pub fn streak(&self) -> u32 {
        self.win_streak.max(self.loss_streak)
    }
}

impl std::fmt::Display for PlayerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "P{} hp{:>3} g{:>3} lv{:>2} ({} schierati)",
            self.id,
            self.health,
            self.gold,
            self.level,
            self.board_count(),
        )
    }
}

use crate::CatalogId;
use crate::EMPTY;

/// One player's shop window plus their pity counters. Slots hold
/// catalog ids checked out of the pool, or the empty sentinel.
#[derive(Debug, Clone)]
pub struct ShopRack {
    pub slots: Vec<CatalogId>,
    pub no_rare: u32,
    pub no_epic: u32,
    pub no_legendary: u32,
}

impl ShopRack {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![EMPTY; slots],
            no_rare: 0,
            no_epic: 0,
            no_legendary: 0,
        }
    }

    pub fn occupied(&self) -> impl Iterator<Item = CatalogId> {
        self.slots.iter().copied().filter(|id| *id != EMPTY)
    }

    /// wire shape: always five ids, empty slots as the sentinel
    pub fn window(&self) -> [CatalogId; 5] {
        let mut window = [EMPTY; 5];
        for (i, id) in self.slots.iter().take(5).enumerate() {
            window[i] = *id;
        }
        window
    }

    pub fn bump_pity(&mut self) {
        self.no_rare += 1;
        self.no_epic += 1;
        self.no_legendary += 1;
    }
}

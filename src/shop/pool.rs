use crate::CatalogId;
use crate::catalog::Catalog;
use crate::config::PoolSettings;
use std::collections::HashMap;

/// Session-wide bag of echo copies, one count per catalog id. Shops
/// check copies out at generation time; sells and refreshes put them
/// back. Session scoped, never shared across sessions.
#[derive(Debug, Clone)]
pub struct PoolBank {
    counts: HashMap<CatalogId, u32>,
}

impl PoolBank {
    pub fn seeded(catalog: &Catalog, settings: &PoolSettings) -> Self {
        let counts = catalog
            .ids()
            .map(|id| {
                let rarity = catalog.by_id(id).expect("listed id resolves").rarity;
                (id, settings.copies(rarity))
            })
            .collect();
        Self { counts }
    }

    /// true iff a copy was available and checked out
    pub fn take(&mut self, id: CatalogId) -> bool {
        match self.counts.get_mut(&id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn restock(&mut self, id: CatalogId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    pub fn remaining(&self, id: CatalogId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

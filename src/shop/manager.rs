use super::PoolBank;
use super::ShopRack;
use crate::CatalogId;
use crate::EMPTY;
use crate::INSTANCE_STRIDE;
use crate::InstanceId;
use crate::PlayerId;
use crate::catalog::Catalog;
use crate::catalog::Rarity;
use crate::config::PoolSettings;
use crate::config::RarityRow;
use crate::config::ShopSettings;
use crate::fusion::FusionEvent;
use crate::roster::PlayerStore;
use crate::roster::PlayerRuntime;
use crate::roster::Reject;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Shop-side of the economy: the shared pool bank, one rack per seat,
/// instance minting, and the pity-gated generation roll. The RNG here
/// is session scoped and never shared with any combat simulator.
pub struct ShopManager {
    pool: PoolBank,
    racks: HashMap<PlayerId, ShopRack>,
    copies: HashMap<CatalogId, InstanceId>,
    rng: SmallRng,
    settings: ShopSettings,
}

impl ShopManager {
    pub fn new(catalog: &Catalog, pool: &PoolSettings, settings: ShopSettings, seed: u64) -> Self {
        Self {
            pool: PoolBank::seeded(catalog, pool),
            racks: HashMap::new(),
            copies: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
            settings,
        }
    }

    pub fn seat(&mut self, player: PlayerId) {
        self.racks
            .entry(player)
            .or_insert_with(|| ShopRack::new(self.settings.slots));
    }

    /// seat leaves: their window goes back in the bag
    pub fn unseat(&mut self, player: PlayerId) {
        if let Some(rack) = self.racks.remove(&player) {
            for id in rack.occupied() {
                self.pool.restock(id);
            }
        }
    }

    pub fn rack(&self, player: PlayerId) -> Option<&ShopRack> {
        self.racks.get(&player)
    }
    pub fn pool(&self) -> &PoolBank {
        &self.pool
    }
    pub fn pool_mut(&mut self) -> &mut PoolBank {
        &mut self.pool
    }

    /// next instance id for a catalog id; low digits are the copy tag
    fn mint(&mut self, id: CatalogId) -> InstanceId {
        let copy = self.copies.entry(id).or_insert(0);
        *copy = (*copy + 1) % INSTANCE_STRIDE;
        id * INSTANCE_STRIDE + *copy
    }
}

// player-facing operations
impl ShopManager {
    /// Buy: slot must be stocked, then bench+gold commit as a single
    /// store transform so rejection leaves no partial effect. The pool
    /// was debited when the window was stocked, so the bag is
    /// untouched here.
    pub fn buy(
        &mut self,
        player: PlayerId,
        slot: usize,
        store: &PlayerStore,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<(PlayerRuntime, Vec<FusionEvent>), Reject> {
        let rack = self.racks.get(&player).ok_or(Reject::UnknownPlayer)?;
        let id = rack.slots.get(slot).copied().ok_or(Reject::OutOfBounds)?;
        if id == EMPTY {
            return Err(Reject::EmptySlot);
        }
        let cost = catalog.by_id(id).ok_or(Reject::UnknownInstance)?.rarity.cost();
        let instance = self.mint(id);
        let bought = store.try_buy(player, instance, cost, catalog, thresholds)?;
        self.racks.get_mut(&player).expect("rack checked above").slots[slot] = EMPTY;
        Ok(bought)
    }

    /// Sell: full rarity cost back, no star discount; every embodied
    /// copy returns to the pool (a 2-star gives three back).
    pub fn sell(
        &mut self,
        player: PlayerId,
        instance: InstanceId,
        store: &PlayerStore,
        catalog: &Catalog,
        thresholds: &[usize; 3],
        gold_cap: crate::Gold,
    ) -> Result<PlayerRuntime, Reject> {
        let id = instance / INSTANCE_STRIDE;
        let rarity = catalog.by_id(id).ok_or(Reject::UnknownInstance)?.rarity;
        let (_, removed) = store.try_remove(player, instance, catalog, thresholds)?;
        let state = store.add_gold(player, rarity.cost(), gold_cap)?;
        for _ in 0..3u32.pow(removed.star.max(1) as u32 - 1) {
            self.pool.restock(id);
        }
        Ok(state)
    }

    /// Refresh: pay the fee, return the window, bump all three pity
    /// counters, restock.
    pub fn refresh(
        &mut self,
        player: PlayerId,
        level: u8,
        store: &PlayerStore,
        catalog: &Catalog,
    ) -> Result<[CatalogId; 5], Reject> {
        self.racks.get(&player).ok_or(Reject::UnknownPlayer)?;
        store.try_deduct_gold(player, self.settings.refresh_cost)?;
        self.racks.get_mut(&player).expect("rack checked above").bump_pity();
        Ok(self.generate(player, level, catalog))
    }

    /// Stock a fresh five-slot window. Unsold goods go back to the bag
    /// first; each slot then rolls independently through the pity gate,
    /// the rarity row, and the downward cascade.
    pub fn generate(&mut self, player: PlayerId, level: u8, catalog: &Catalog) -> [CatalogId; 5] {
        let Some(rack) = self.racks.get_mut(&player) else {
            return [EMPTY; 5];
        };
        for id in std::mem::take(&mut rack.slots) {
            if id != EMPTY {
                self.pool.restock(id);
            }
        }
        let row = *bucket(&self.settings.rows, level);
        let mut slots = vec![EMPTY; self.settings.slots];
        for slot in slots.iter_mut() {
            let rack = self.racks.get_mut(&player).expect("rack still seated");
            let (target, forced) = gate(rack, &self.settings, &mut self.rng, &row);
            let Some((id, drawn)) = self.draw(target, catalog) else {
                continue;
            };
            *slot = id;
            if !forced {
                natural_reset(self.racks.get_mut(&player).expect("rack still seated"), drawn);
            }
        }
        let rack = self.racks.get_mut(&player).expect("rack still seated");
        rack.slots = slots;
        rack.window()
    }

    /// shuffled walk of the target rarity, cascading down when a bag
    /// runs dry; None only when every rarity is exhausted
    fn draw(&mut self, target: Rarity, catalog: &Catalog) -> Option<(CatalogId, Rarity)> {
        let mut rarity = Some(target);
        while let Some(current) = rarity {
            let mut candidates = catalog.of_rarity(current);
            candidates.shuffle(&mut self.rng);
            for id in candidates {
                if self.pool.take(id) {
                    return Some((id, current));
                }
            }
            rarity = current.below();
        }
        None
    }
}

/// pity gate: highest starved tier wins and resets itself plus
/// everything below
fn gate(rack: &mut ShopRack, settings: &ShopSettings, rng: &mut SmallRng, row: &RarityRow) -> (Rarity, bool) {
    if rack.no_legendary >= settings.pity_legendary {
        rack.no_legendary = 0;
        rack.no_epic = 0;
        rack.no_rare = 0;
        (Rarity::Legendary, true)
    } else if rack.no_epic >= settings.pity_epic {
        rack.no_epic = 0;
        rack.no_rare = 0;
        (Rarity::Epic, true)
    } else if rack.no_rare >= settings.pity_rare {
        rack.no_rare = 0;
        (Rarity::Rare, true)
    } else {
        (roll(rng, row), false)
    }
}

/// uniform pick over the bucket row's weights
fn roll(rng: &mut SmallRng, row: &RarityRow) -> Rarity {
    let mut ticket = rng.random_range(0..row.total());
    for rarity in Rarity::ALL {
        let weight = row.weight(rarity);
        if ticket < weight {
            return rarity;
        }
        ticket -= weight;
    }
    Rarity::Common
}

/// an unforced lucky draw quiets the matching counters
fn natural_reset(rack: &mut ShopRack, drawn: Rarity) {
    match drawn {
        Rarity::Legendary => {
            rack.no_legendary = 0;
            rack.no_epic = 0;
            rack.no_rare = 0;
        }
        Rarity::Epic => {
            rack.no_epic = 0;
            rack.no_rare = 0;
        }
        Rarity::Rare => {
            rack.no_rare = 0;
        }
        _ => {}
    }
}

fn bucket(rows: &[((u8, u8), RarityRow)], level: u8) -> &RarityRow {
    rows.iter()
        .find(|((lo, hi), _)| *lo <= level && level <= *hi)
        .map(|(_, row)| row)
        .unwrap_or(&rows.last().expect("at least one bucket row").1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;

    const THRESHOLDS: [usize; 3] = [2, 4, 6];

    fn fixture(settings: ShopSettings) -> (ShopManager, PlayerStore, Catalog, PlayerSettings) {
        let catalog = Catalog::standard();
        let players = PlayerSettings::default();
        let store = PlayerStore::default();
        store.init_seat(1, "test".into(), &players).expect("fresh seat");
        let mut shop = ShopManager::new(&catalog, &PoolSettings::default(), settings, 7);
        shop.seat(1);
        (shop, store, catalog, players)
    }

    #[test]
    fn buy_then_sell_is_gold_and_pool_neutral() {
        let (mut shop, store, catalog, players) = fixture(ShopSettings::default());
        store.try_deduct_gold(1, 2).expect("seated"); // gold: 3
        shop.generate(1, 1, &catalog);
        let stocked = shop.pool().total();
        let (bought, _) = shop.buy(1, 0, &store, &catalog, &THRESHOLDS).expect("level one shop is commons");
        assert!(bought.gold == 2);
        assert!(bought.bench[0].star == 1);
        assert!(shop.pool().total() == stocked);
        let instance = bought.bench[0].id;
        let sold = shop
            .sell(1, instance, &store, &catalog, &THRESHOLDS, players.max_gold)
            .expect("owned instance");
        assert!(sold.gold == 3);
        assert!(sold.bench.iter().all(|s| s.is_empty()));
        assert!(shop.pool().total() == stocked + 1);
    }

    #[test]
    fn empty_slot_rejects() {
        let (mut shop, store, catalog, _) = fixture(ShopSettings::default());
        assert!(shop.buy(1, 0, &store, &catalog, &THRESHOLDS) == Err(Reject::EmptySlot));
    }

    #[test]
    fn buy_with_full_bench_rejects_and_keeps_gold() {
        let (mut shop, store, catalog, _) = fixture(ShopSettings::default());
        store
            .transform(1, |p| {
                let mut next = p.clone();
                for (i, slot) in next.bench.iter_mut().enumerate() {
                    // distinct catalog ids so nothing fuses away
                    *slot = crate::roster::Slot { id: (i as i32 + 1) * INSTANCE_STRIDE, star: 1 };
                }
                Ok(next)
            })
            .expect("seated");
        shop.generate(1, 1, &catalog);
        let gold = store.get(1).expect("seated").gold;
        assert!(shop.buy(1, 0, &store, &catalog, &THRESHOLDS) == Err(Reject::BenchFull));
        assert!(store.get(1).expect("seated").gold == gold);
    }

    #[test]
    fn starred_sell_returns_every_copy() {
        let (mut shop, store, catalog, players) = fixture(ShopSettings::default());
        store
            .transform(1, |p| {
                let mut next = p.clone();
                next.bench[0] = crate::roster::Slot { id: 1000, star: 2 };
                Ok(next)
            })
            .expect("seated");
        let before = shop.pool().remaining(1);
        shop.sell(1, 1000, &store, &catalog, &THRESHOLDS, players.max_gold).expect("owned");
        assert!(shop.pool().remaining(1) == before + 3);
    }

    #[test]
    fn pity_ladder_guarantees_epic_then_legendary() {
        let settings = ShopSettings {
            pity_rare: 2,
            pity_epic: 3,
            pity_legendary: 4,
            rows: vec![((1, 10), RarityRow { common: 100, uncommon: 0, rare: 0, epic: 0, legendary: 0 })],
            ..ShopSettings::default()
        };
        let (mut shop, store, catalog, players) = fixture(settings);
        store.add_gold(1, 50, players.max_gold).expect("seated");
        let rarities = |window: [CatalogId; 5], catalog: &Catalog| {
            window
                .iter()
                .filter(|id| **id != EMPTY)
                .map(|id| catalog.by_id(*id).expect("stocked id").rarity)
                .collect::<Vec<Rarity>>()
        };
        let first = shop.refresh(1, 1, &store, &catalog).expect("afford");
        assert!(rarities(first, &catalog).iter().all(|r| *r < Rarity::Epic));
        let second = shop.refresh(1, 1, &store, &catalog).expect("afford");
        assert!(rarities(second, &catalog).iter().any(|r| *r == Rarity::Rare));
        assert!(rarities(second, &catalog).iter().all(|r| *r < Rarity::Epic));
        let third = shop.refresh(1, 1, &store, &catalog).expect("afford");
        assert!(rarities(third, &catalog).iter().any(|r| *r == Rarity::Epic));
        assert!(rarities(third, &catalog).iter().all(|r| *r < Rarity::Legendary));
        let fourth = shop.refresh(1, 1, &store, &catalog).expect("afford");
        assert!(rarities(fourth, &catalog).iter().any(|r| *r == Rarity::Legendary));
    }

    #[test]
    fn pool_conservation_across_buys_and_sells() {
        let (mut shop, store, catalog, players) = fixture(ShopSettings::default());
        let initial = shop.pool().total();
        store.add_gold(1, 50, players.max_gold).expect("seated");
        shop.generate(1, 1, &catalog);
        shop.buy(1, 0, &store, &catalog, &THRESHOLDS).expect("stocked");
        shop.buy(1, 1, &store, &catalog, &THRESHOLDS).expect("stocked");
        shop.refresh(1, 1, &store, &catalog).expect("afford");
        let player = store.get(1).expect("seated");
        let fielded = player
            .board
            .iter()
            .chain(player.bench.iter())
            .filter(|s| !s.is_empty())
            .map(|s| 3u32.pow(s.star as u32 - 1))
            .sum::<u32>();
        let stocked = shop.rack(1).expect("seated").occupied().count() as u32;
        assert!(initial == shop.pool().total() + fielded + stocked);
    }
}

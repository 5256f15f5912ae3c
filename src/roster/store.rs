use super::*;
use crate::Experience;
use crate::Gold;
use crate::Health;
use crate::InstanceId;
use crate::PlayerId;
use crate::catalog::Catalog;
use crate::config::PlayerSettings;
use crate::fusion;
use crate::fusion::FusionEvent;
use crate::resonance;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::RwLock;

/// Published after a successful commit. Changed always fires;
/// Eliminated follows it when the commit drove health to zero.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Changed(PlayerId, Box<PlayerRuntime>),
    Eliminated(PlayerId),
}

/// Keyed map of seats. The only mutation path is an atomic transform:
/// read a snapshot, compute the next one (or abort with a Reject),
/// commit iff the map still holds the original, retry otherwise. In
/// steady state only the orchestrator writes here; the CAS loop guards
/// the incidental tasks that also touch state (disconnect hooks).
pub struct PlayerStore {
    seats: RwLock<HashMap<PlayerId, PlayerRuntime>>,
    events: Mutex<VecDeque<StoreEvent>>,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self {
            seats: RwLock::new(HashMap::new()),
            events: Mutex::new(VecDeque::new()),
        }
    }
}

// transform machinery
impl PlayerStore {
    pub fn transform(
        &self,
        id: PlayerId,
        op: impl Fn(&PlayerRuntime) -> Result<PlayerRuntime, Reject>,
    ) -> Result<PlayerRuntime, Reject> {
        self.transform_with(id, |p| op(p).map(|next| (next, ())))
            .map(|(next, _)| next)
    }

    /// transform that also yields a side product computed inside the
    /// committed attempt (fusion events, removed slots)
    pub fn transform_with<T>(
        &self,
        id: PlayerId,
        op: impl Fn(&PlayerRuntime) -> Result<(PlayerRuntime, T), Reject>,
    ) -> Result<(PlayerRuntime, T), Reject> {
        loop {
            let before = self.get(id).ok_or(Reject::UnknownPlayer)?;
            let (after, product) = op(&before)?;
            let mut seats = self.seats.write().expect("seat lock");
            match seats.get(&id) {
                Some(current) if *current == before => {
                    seats.insert(id, after.clone());
                    drop(seats);
                    self.publish(&before, &after);
                    return Ok((after, product));
                }
                Some(_) => continue,
                None => return Err(Reject::UnknownPlayer),
            }
        }
    }

    fn publish(&self, before: &PlayerRuntime, after: &PlayerRuntime) {
        let mut events = self.events.lock().expect("event lock");
        events.push_back(StoreEvent::Changed(after.id, Box::new(after.clone())));
        if before.health > 0 && after.health <= 0 {
            events.push_back(StoreEvent::Eliminated(after.id));
        }
    }

    pub fn drain_events(&self) -> Vec<StoreEvent> {
        self.events.lock().expect("event lock").drain(..).collect()
    }
}

// seat lifecycle & access
impl PlayerStore {
    /// seat a new player; None when the id is already taken
    pub fn init_seat(
        &self,
        id: PlayerId,
        name: String,
        settings: &PlayerSettings,
    ) -> Option<PlayerRuntime> {
        let seat = PlayerRuntime::new(id, name, settings);
        let mut seats = self.seats.write().expect("seat lock");
        match seats.contains_key(&id) {
            true => None,
            false => {
                seats.insert(id, seat.clone());
                drop(seats);
                let mut events = self.events.lock().expect("event lock");
                events.push_back(StoreEvent::Changed(id, Box::new(seat.clone())));
                Some(seat)
            }
        }
    }

    pub fn remove(&self, id: PlayerId) -> Option<PlayerRuntime> {
        self.seats.write().expect("seat lock").remove(&id)
    }
    pub fn get(&self, id: PlayerId) -> Option<PlayerRuntime> {
        self.seats.read().expect("seat lock").get(&id).cloned()
    }
    pub fn contains(&self, id: PlayerId) -> bool {
        self.seats.read().expect("seat lock").contains_key(&id)
    }
    pub fn len(&self) -> usize {
        self.seats.read().expect("seat lock").len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn players(&self) -> Vec<PlayerRuntime> {
        let mut all = self
            .seats
            .read()
            .expect("seat lock")
            .values()
            .cloned()
            .collect::<Vec<PlayerRuntime>>();
        all.sort_by_key(|p| p.id);
        all
    }
    pub fn alive(&self) -> Vec<PlayerRuntime> {
        self.players().into_iter().filter(|p| p.alive()).collect()
    }
}

// resource operations
impl PlayerStore {
    pub fn try_deduct_gold(&self, id: PlayerId, amount: Gold) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| match p.gold >= amount {
            false => Err(Reject::InsufficientGold),
            true => {
                let mut next = p.clone();
                next.gold -= amount;
                Ok(next)
            }
        })
    }

    pub fn add_gold(&self, id: PlayerId, amount: Gold, cap: Gold) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            next.gold = (next.gold + amount).min(cap);
            Ok(next)
        })
    }

    pub fn modify_health(&self, id: PlayerId, delta: Health) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            next.health = (next.health + delta).clamp(0, 100);
            if next.health == 0 {
                next.standing = Standing::Eliminated;
            }
            Ok(next)
        })
    }

    pub fn add_xp(
        &self,
        id: PlayerId,
        amount: Experience,
        settings: &PlayerSettings,
    ) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            level_up(&mut next, amount, settings);
            Ok(next)
        })
    }

    /// BuyXP: one transform so a failed deduction leaves xp untouched
    pub fn buy_xp(&self, id: PlayerId, settings: &PlayerSettings) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| match p.gold >= settings.xp_buy_cost {
            false => Err(Reject::InsufficientGold),
            true => {
                let mut next = p.clone();
                next.gold -= settings.xp_buy_cost;
                level_up(&mut next, settings.xp_buy_amount, settings);
                Ok(next)
            }
        })
    }

    pub fn update_streak(&self, id: PlayerId, won: bool) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            match won {
                true => {
                    next.win_streak += 1;
                    next.loss_streak = 0;
                }
                false => {
                    next.loss_streak += 1;
                    next.win_streak = 0;
                }
            }
            Ok(next)
        })
    }

    /// end-of-round payout: base + interest + streak bonus
    pub fn grant_income(&self, id: PlayerId, settings: &PlayerSettings) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let interest = (p.gold / 10).min(settings.interest_cap);
            let streak = match p.streak() {
                s if s >= 2 => {
                    let index = (s as usize - 2).min(settings.streak_bonus.len() - 1);
                    settings.streak_bonus[index]
                }
                _ => 0,
            };
            let mut next = p.clone();
            next.gold = (next.gold + settings.base_income + interest + streak).min(settings.max_gold);
            Ok(next)
        })
    }

    pub fn grant_auto_xp(&self, id: PlayerId, settings: &PlayerSettings) -> Result<PlayerRuntime, Reject> {
        self.add_xp(id, settings.xp_per_round, settings)
    }

    pub fn grant_mutation(&self, id: PlayerId, token: i32) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            next.mutations.push(token);
            Ok(next)
        })
    }

    pub fn toggle_ready(&self, id: PlayerId, is_ready: bool) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            next.is_ready = is_ready;
            Ok(next)
        })
    }

    pub fn set_standing(&self, id: PlayerId, standing: Standing) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let mut next = p.clone();
            next.standing = standing;
            Ok(next)
        })
    }

    /// disconnect mid-match: zero the nexus through the normal path so
    /// elimination bookkeeping stays consistent
    pub fn eliminate(&self, id: PlayerId) -> Result<PlayerRuntime, Reject> {
        self.modify_health(id, -100)
    }
}

// board & bench operations
impl PlayerStore {
    /// Buy path: gold and bench are checked and committed as one
    /// transform, so a rejection leaves no partial effect. Fusion runs
    /// inside the attempt and its events ride out with the commit.
    pub fn try_buy(
        &self,
        id: PlayerId,
        instance: InstanceId,
        cost: Gold,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<(PlayerRuntime, Vec<FusionEvent>), Reject> {
        catalog.by_instance(instance).ok_or(Reject::UnknownInstance)?;
        self.transform_with(id, |p| {
            let index = p.first_empty_bench().ok_or(Reject::BenchFull)?;
            match p.gold >= cost {
                false => Err(Reject::InsufficientGold),
                true => {
                    let mut next = p.clone();
                    next.gold -= cost;
                    next.bench[index] = Slot { id: instance, star: 1 };
                    let fused = fusion::fuse(&mut next.board, &mut next.bench);
                    next.resonances = resonance::active(&next.board, catalog, thresholds);
                    Ok((next, fused))
                }
            }
        })
    }

    /// free-standing bench add (rewards, tests): same fusion coupling
    pub fn try_add_to_bench(
        &self,
        id: PlayerId,
        instance: InstanceId,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<(PlayerRuntime, Vec<FusionEvent>), Reject> {
        self.try_buy(id, instance, 0, catalog, thresholds)
    }

    /// bench to board (counts against the level), or a slide between
    /// two board cells
    pub fn try_place(
        &self,
        id: PlayerId,
        instance: InstanceId,
        index: usize,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let target = p.board.get(index).ok_or(Reject::OutOfBounds)?;
            if !target.is_empty() {
                return Err(Reject::SlotOccupied);
            }
            if let Some(from) = p.bench.iter().position(|s| s.holds(instance)) {
                if p.board_count() >= p.level as usize {
                    return Err(Reject::BoardLimit);
                }
                let mut next = p.clone();
                next.board[index] = next.bench[from];
                next.bench[from] = Slot::EMPTY;
                next.resonances = resonance::active(&next.board, catalog, thresholds);
                return Ok(next);
            }
            let from = p
                .board
                .iter()
                .position(|s| s.holds(instance))
                .ok_or(Reject::UnknownInstance)?;
            let mut next = p.clone();
            next.board[index] = next.board[from];
            next.board[from] = Slot::EMPTY;
            next.resonances = resonance::active(&next.board, catalog, thresholds);
            Ok(next)
        })
    }

    pub fn try_recall(
        &self,
        id: PlayerId,
        instance: InstanceId,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<PlayerRuntime, Reject> {
        self.transform(id, |p| {
            let from = p
                .board
                .iter()
                .position(|s| s.holds(instance))
                .ok_or(Reject::UnknownInstance)?;
            let target = p.first_empty_bench().ok_or(Reject::BenchFull)?;
            let mut next = p.clone();
            next.bench[target] = next.board[from];
            next.board[from] = Slot::EMPTY;
            next.resonances = resonance::active(&next.board, catalog, thresholds);
            Ok(next)
        })
    }

    /// clear the slot holding an instance; yields the removed slot so
    /// the shop can refund and restock
    pub fn try_remove(
        &self,
        id: PlayerId,
        instance: InstanceId,
        catalog: &Catalog,
        thresholds: &[usize; 3],
    ) -> Result<(PlayerRuntime, Slot), Reject> {
        self.transform_with(id, |p| {
            let (on_board, index) = p.find(instance).ok_or(Reject::UnknownInstance)?;
            let mut next = p.clone();
            let removed = match on_board {
                true => std::mem::replace(&mut next.board[index], Slot::EMPTY),
                false => std::mem::replace(&mut next.bench[index], Slot::EMPTY),
            };
            next.resonances = resonance::active(&next.board, catalog, thresholds);
            Ok((next, removed))
        })
    }
}

fn level_up(player: &mut PlayerRuntime, amount: Experience, settings: &PlayerSettings) {
    if player.level >= settings.level_cap {
        player.xp = 0;
        return;
    }
    player.xp += amount;
    while player.level < settings.level_cap {
        let need = settings.xp_thresholds[player.level as usize - 1];
        if player.xp < need {
            break;
        }
        player.xp -= need;
        player.level += 1;
    }
    if player.level >= settings.level_cap {
        player.xp = 0;
    }
}

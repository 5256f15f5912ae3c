use super::Arena;
use crate::PlayerId;
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::matchmaker::Matchmaker;
use crate::net::Gateway;
use crate::net::NetEvent;
use crate::phase::Phase;
use crate::phase::Scheduler;
use crate::protocol::Envelope;
use crate::protocol::MessageKind;
use crate::protocol::payloads::*;
use crate::roster::PlayerRuntime;
use crate::roster::PlayerStore;
use crate::roster::Reject;
use crate::roster::StoreEvent;
use crate::shop::ShopManager;
use std::collections::HashMap;
use tokio::time::Duration;
use tokio::time::Instant;

/// Central coordinator for one match. Owns every subsystem by value
/// (store, shop, matchmaker, scheduler, simulators, transport handles)
/// and is the only place game state mutates.
///
/// Runs a ~16ms wall-clock tick:
/// - drain the transport queue and dispatch by message kind
/// - advance the phase scheduler and the lobby countdown
/// - step active combats on their snapshot cadence
/// - publish store changes and eliminations
/// - sweep the reliable-message retry track
pub struct Session {
    pub(super) settings: Settings,
    pub(super) catalog: Catalog,
    pub(super) store: PlayerStore,
    pub(super) shop: ShopManager,
    pub(super) matchmaker: Matchmaker,
    pub(super) scheduler: Scheduler,
    pub(super) gateway: Gateway,
    pub(super) arenas: Vec<Arena>,
    pub(super) seats: HashMap<i32, PlayerId>,
    pub(super) countdown: Option<f64>,
    pub(super) placements: Vec<PlayerId>,
    pub(super) total_seated: usize,
    pub(super) over: bool,
    pub(super) linger: Option<f64>,
}

impl Session {
    pub async fn start(settings: Settings) -> anyhow::Result<Self> {
        let catalog = Catalog::standard();
        anyhow::ensure!(!catalog.is_empty(), "catalog must load before accepting");
        let shop = ShopManager::new(
            &catalog,
            &settings.pool,
            settings.shop.clone(),
            settings.seed ^ 0x53484F50,
        );
        let scheduler = Scheduler::new(settings.phase.clone());
        let gateway = Gateway::bind(settings.net.clone()).await?;
        Ok(Self {
            settings,
            catalog,
            store: PlayerStore::default(),
            shop,
            matchmaker: Matchmaker::default(),
            scheduler,
            gateway,
            arenas: Vec::new(),
            seats: HashMap::new(),
            countdown: None,
            placements: Vec::new(),
            total_seated: 0,
            over: false,
            linger: None,
        })
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut pacer = tokio::time::interval(Duration::from_millis(16));
        pacer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            pacer.tick().await;
            let now = Instant::now();
            let delta = now.duration_since(last).as_secs_f64();
            last = now;
            self.tick(delta);
            if let Some(linger) = &mut self.linger {
                *linger -= delta;
                if *linger <= 0.0 {
                    log::info!("session complete");
                    return Ok(());
                }
            }
        }
    }

    /// one orchestrator tick; every inbound message is handled in its
    /// own self-contained unit, so one bad apple never poisons the
    /// rest of the batch
    pub fn tick(&mut self, delta: f64) {
        for event in self.gateway.poll() {
            match event {
                NetEvent::Connected(handle) => log::debug!("client {} awaiting join", handle.id),
                NetEvent::Message(client, envelope) => self.dispatch(client, envelope),
                NetEvent::Disconnected(client) => self.on_disconnect(client),
            }
        }
        self.tick_countdown(delta);
        if let Some(change) = self.scheduler.advance(delta) {
            self.apply_phase(change);
        }
        if self.scheduler.phase() == Phase::Combat {
            self.step_arenas(delta);
        }
        self.pump_store_events();
        if !self.over && self.scheduler.round() > self.settings.round_cap {
            log::info!("round cap reached");
            self.end_game();
        }
        self.gateway.sweep();
    }

    fn tick_countdown(&mut self, delta: f64) {
        let Some(mut remaining) = self.countdown else {
            return;
        };
        let before = remaining.ceil();
        remaining -= delta;
        if remaining <= 0.0 {
            self.countdown = None;
            self.total_seated = self.store.len();
            if let Some(change) = self.scheduler.begin() {
                self.apply_phase(change);
            }
        } else {
            self.countdown = Some(remaining);
            if remaining.ceil() < before {
                self.broadcast_lobby();
            }
        }
    }

    /// store events become mail: the owner gets their full snapshot,
    /// the table gets the public digest, eliminations get placements.
    /// Consecutive changes to one seat within a tick collapse into the
    /// final snapshot.
    pub(super) fn pump_store_events(&mut self) {
        let mut coalesced: Vec<StoreEvent> = Vec::new();
        for event in self.store.drain_events() {
            match event {
                StoreEvent::Changed(id, state) => {
                    let known = coalesced.iter_mut().find(
                        |e| matches!(e, StoreEvent::Changed(seen, _) if *seen == id),
                    );
                    match known {
                        Some(slot) => *slot = StoreEvent::Changed(id, state),
                        None => coalesced.push(StoreEvent::Changed(id, state)),
                    }
                }
                eliminated => coalesced.push(eliminated),
            }
        }
        for event in coalesced {
            match event {
                StoreEvent::Changed(id, state) => {
                    self.unicast(
                        id,
                        &Envelope::reliable(
                            MessageKind::PlayerStateUpdate,
                            &PlayerStateUpdate { state: *state.clone() },
                        ),
                    );
                    let info = OtherPlayerInfo {
                        player_id: id,
                        nexus_health: state.health,
                        level: state.level,
                        win_streak: state.win_streak,
                        loss_streak: state.loss_streak,
                    };
                    for other in self.seats.values().copied().collect::<Vec<PlayerId>>() {
                        if other != id {
                            self.unicast(other, &Envelope::fire(MessageKind::OtherPlayerInfo, &info));
                        }
                    }
                }
                StoreEvent::Eliminated(id) => self.on_eliminated(id),
            }
        }
    }

    fn on_eliminated(&mut self, id: PlayerId) {
        if self.placements.contains(&id) {
            return;
        }
        self.placements.push(id);
        let placement = (self.total_seated.max(self.placements.len()) - self.placements.len() + 1) as u32;
        log::info!("player {} eliminated, placement {}", id, placement);
        self.gateway.broadcast(&Envelope::reliable(
            MessageKind::PlayerEliminated,
            &PlayerEliminated {
                player_id: id,
                final_placement: placement,
            },
        ));
        if !self.over && self.store.alive().len() <= 1 {
            self.end_game();
        }
    }

    pub(super) fn end_game(&mut self) {
        let winner = self
            .store
            .alive()
            .into_iter()
            .max_by_key(|p| (p.health, -p.id))
            .map(|p| p.id)
            .unwrap_or(self.placements.last().copied().unwrap_or(-1));
        if let Some(change) = self.scheduler.game_over() {
            self.apply_phase(change);
        }
        let mut placements = vec![winner];
        placements.extend(self.placements.iter().rev().filter(|p| **p != winner));
        log::info!("game over, winner {} placements {:?}", winner, placements);
        self.gateway.broadcast(&Envelope::reliable(
            MessageKind::GameEnded,
            &GameEnded {
                winner_id: winner,
                placements,
            },
        ));
        self.over = true;
        self.linger = Some(5.0);
    }

    pub(super) fn on_disconnect(&mut self, client: i32) {
        let Some(player) = self.seats.remove(&client) else {
            return;
        };
        log::info!("player {} disconnected", player);
        match self.scheduler.phase() {
            Phase::WaitingForPlayers => {
                self.store.remove(player);
                self.shop.unseat(player);
                self.broadcast_lobby();
                self.countdown = None;
            }
            _ if !self.over => {
                // mid-match: the seat dies quietly through the normal
                // elimination path and the matchmaker stops seeing it
                let _ = self.store.eliminate(player);
            }
            _ => {}
        }
    }
}

// messaging helpers
impl Session {
    pub(super) fn client_of(&self, player: PlayerId) -> Option<i32> {
        self.seats
            .iter()
            .find(|(_, seated)| **seated == player)
            .map(|(client, _)| *client)
    }

    pub(super) fn unicast(&mut self, player: PlayerId, envelope: &Envelope) {
        if player == crate::GHOST {
            return;
        }
        match self.client_of(player) {
            Some(client) => self.gateway.send(client, envelope),
            None => log::debug!("no connection for player {}", player),
        }
    }

    pub(super) fn reject(&mut self, client: i32, kind: MessageKind, why: Reject) {
        log::debug!("rejecting {} from client {}: {}", kind, client, why);
        self.gateway.send(
            client,
            &Envelope::fire(
                MessageKind::ActionRejected,
                &ActionRejected {
                    action: kind.to_string(),
                    reason: why.to_string(),
                },
            ),
        );
    }

    pub(super) fn broadcast_lobby(&mut self) {
        let players = self
            .store
            .players()
            .iter()
            .map(|p| LobbyPlayer {
                id: p.id,
                name: p.name.clone(),
                is_ready: p.is_ready,
            })
            .collect::<Vec<LobbyPlayer>>();
        let all_ready = !players.is_empty() && players.iter().all(|p| p.is_ready);
        let state = LobbyState {
            players,
            all_ready,
            countdown_remaining: self.countdown.unwrap_or(0.0).max(0.0),
        };
        self.gateway.broadcast(&Envelope::fire(MessageKind::LobbyState, &state));
    }

    /// synthetic seat handed to clients as the ghost's "state"
    pub(super) fn ghost_runtime(&self, board: &[crate::roster::Slot]) -> PlayerRuntime {
        let mut ghost = PlayerRuntime::new(crate::GHOST, "Spettro".into(), &self.settings.player);
        ghost.board = board.to_vec();
        ghost.resonances = crate::resonance::active(
            &ghost.board,
            &self.catalog,
            &self.settings.resonance.thresholds,
        );
        ghost
    }
}

use super::Arena;
use super::Session;
use crate::GHOST;
use crate::PlayerId;
use crate::TICKS_PER_SECOND;
use crate::combat::Simulator;
use crate::fusion::FusionEvent;
use crate::intervention::InterventionEngine;
use crate::phase::Phase;
use crate::phase::PhaseChange;
use crate::protocol::Envelope;
use crate::protocol::MessageKind;
use crate::protocol::payloads;
use crate::roster::PlayerRuntime;
use crate::roster::Standing;

// phase transitions and their side effects
impl Session {
    pub(super) fn apply_phase(&mut self, change: PhaseChange) {
        self.gateway.broadcast(&Envelope::reliable(
            MessageKind::PhaseChanged,
            &payloads::PhaseChanged {
                new_phase: change.phase,
                phase_duration_secs: change.duration_secs,
            },
        ));
        match change.phase {
            Phase::Preparation => self.enter_preparation(),
            Phase::Combat => self.enter_combat(),
            Phase::Reward => self.enter_reward(),
            Phase::MutationChoice => self.enter_mutation(),
            Phase::WaitingForPlayers | Phase::GameOver => {}
        }
    }

    /// payouts, auto xp and fresh shops for everyone still standing
    fn enter_preparation(&mut self) {
        let round = self.scheduler.round();
        self.gateway.broadcast(&Envelope::reliable(
            MessageKind::StartRound,
            &payloads::StartRound {
                round_number: round,
            },
        ));
        for player in self.store.alive() {
            let _ = self.store.set_standing(player.id, Standing::Preparing);
            let _ = self.store.grant_income(player.id, &self.settings.player);
            let _ = self.store.grant_auto_xp(player.id, &self.settings.player);
            let level = self.store.get(player.id).map(|p| p.level).unwrap_or(1);
            let window = self.shop.generate(player.id, level, &self.catalog);
            self.unicast(
                player.id,
                &Envelope::reliable(
                    MessageKind::ShopRefreshed,
                    &payloads::ShopRefreshed {
                        echo_definition_ids: window,
                    },
                ),
            );
        }
    }

    /// pair the field, spawn a simulator per table, announce openers
    fn enter_combat(&mut self) {
        let alive = self.store.alive();
        let pairings = self.matchmaker.pair(&alive);
        let round = self.scheduler.round();
        let cadence = self.settings.combat.snapshot_interval_ticks as f64 / TICKS_PER_SECOND as f64;
        self.arenas.clear();
        for (index, pairing) in pairings.iter().enumerate() {
            let Some(host) = self.store.get(pairing.a) else {
                continue;
            };
            let rival = match &pairing.ghost {
                Some(board) => self.ghost_runtime(board),
                None => match self.store.get(pairing.b) {
                    Some(state) => state,
                    None => continue,
                },
            };
            let seed = self.settings.seed ^ (index as u64).wrapping_mul(0x9E3779B9);
            let sim = Simulator::new(
                [pairing.a, pairing.b],
                [&host.board, &rival.board],
                [&host.resonances, &rival.resonances],
                &self.catalog,
                self.settings.combat.clone(),
                &self.settings.resonance,
                seed,
                round,
            );
            let _ = self.store.set_standing(pairing.a, Standing::Fighting);
            if !pairing.is_ghost() {
                let _ = self.store.set_standing(pairing.b, Standing::Fighting);
            }
            self.unicast(
                pairing.a,
                &Envelope::reliable(
                    MessageKind::CombatStarted,
                    &payloads::CombatStarted {
                        opponent_id: pairing.b,
                        opponent_state: rival.clone(),
                    },
                ),
            );
            self.unicast(
                pairing.b,
                &Envelope::reliable(
                    MessageKind::CombatStarted,
                    &payloads::CombatStarted {
                        opponent_id: pairing.a,
                        opponent_state: host,
                    },
                ),
            );
            self.arenas.push(Arena::new(
                sim,
                InterventionEngine::new(self.settings.intervention.clone()),
                cadence,
            ));
        }
        if let Some(featured) = self.matchmaker.featured(&pairings, &alive, self.settings.at_risk_hp) {
            self.gateway.broadcast(&Envelope::fire(
                MessageKind::FeaturedMatch,
                &payloads::FeaturedMatch {
                    player1_id: featured.a,
                    player2_id: featured.b,
                    reason: featured.reason.to_string(),
                },
            ));
        }
    }

    /// the safety timer can force this entry with fights still open;
    /// they settle on current standing
    fn enter_reward(&mut self) {
        for index in 0..self.arenas.len() {
            if !self.arenas[index].settled {
                self.arenas[index].sim.finish();
                self.settle_arena(index);
            }
        }
    }

    /// one mutation token per survivor, tagged with the round
    fn enter_mutation(&mut self) {
        let round = self.scheduler.round() as i32;
        for player in self.store.alive() {
            let _ = self.store.grant_mutation(player.id, round);
        }
    }
}

// combat stepping
impl Session {
    pub(super) fn step_arenas(&mut self, delta: f64) {
        let cadence = self.settings.combat.snapshot_interval_ticks as f64 / TICKS_PER_SECOND as f64;
        for index in 0..self.arenas.len() {
            let Some((snapshot, players, energies)) = ({
                let arena = &mut self.arenas[index];
                match arena.settled {
                    true => None,
                    false => {
                        arena.energy.tick_cooldowns(delta);
                        arena.timer -= delta;
                        match arena.timer > 0.0 {
                            true => None,
                            false => {
                                arena.timer += cadence;
                                let queue = arena.energy.drain();
                                let snapshot = arena.sim.step_batch(queue);
                                let elapsed = snapshot.tick - arena.last_tick;
                                arena.last_tick = snapshot.tick;
                                arena.energy.on_ticks(elapsed);
                                arena.energy.on_deaths(snapshot.deaths);
                                arena.energy.on_damage(snapshot.damage_taken);
                                Some((
                                    snapshot,
                                    arena.sim.players(),
                                    [arena.energy.energy(0), arena.energy.energy(1)],
                                ))
                            }
                        }
                    }
                }
            }) else {
                continue;
            };
            let update = Envelope::fire(
                MessageKind::CombatUpdate,
                &payloads::CombatUpdate {
                    event_json: serde_json::to_string(&snapshot).expect("snapshot serializes"),
                },
            );
            let max_energy = self.settings.intervention.max_energy;
            for (team, player) in players.iter().enumerate() {
                self.unicast(*player, &update);
                self.unicast(
                    *player,
                    &Envelope::fire(
                        MessageKind::EnergyUpdate,
                        &payloads::EnergyUpdate {
                            energy: energies[team],
                            max_energy,
                        },
                    ),
                );
            }
            if snapshot.done {
                self.settle_arena(index);
            }
        }
        if !self.arenas.is_empty() && self.arenas.iter().all(|a| a.settled) {
            if let Some(change) = self.scheduler.combats_done() {
                self.apply_phase(change);
            }
        }
    }

    /// apply the verdict: nexus damage, streaks, matchmaker memory,
    /// and the closing announcement to both real seats
    pub(super) fn settle_arena(&mut self, index: usize) {
        let Some(result) = self.arenas[index].sim.result() else {
            log::error!("settling an unfinished combat");
            return;
        };
        self.arenas[index].settled = true;
        log::info!(
            "combat {}: {} beats {}, {} damage",
            index,
            result.winner,
            result.loser,
            result.damage,
        );
        log::trace!("final grid\n{}", self.arenas[index].sim);
        if result.loser != GHOST {
            let _ = self.store.update_streak(result.loser, false);
            let _ = self.store.modify_health(result.loser, -result.damage);
        }
        if result.winner != GHOST {
            let _ = self.store.update_streak(result.winner, true);
        }
        let winner_board = self
            .store
            .get(result.winner)
            .map(|p| p.board)
            .unwrap_or_default();
        self.matchmaker
            .record_result(result.winner, result.loser, winner_board);
        for player in self.arenas[index].sim.players() {
            self.unicast(
                player,
                &Envelope::reliable(
                    MessageKind::CombatEnded,
                    &payloads::CombatEnded {
                        winner_id: result.winner,
                        damage_dealt: result.damage,
                    },
                ),
            );
        }
    }
}

// fusion announcements
impl Session {
    /// Cascades stay internal: the client hears one EchoFused per
    /// surviving instance, at its final star.
    pub(super) fn announce_fusions(
        &mut self,
        player: PlayerId,
        state: &PlayerRuntime,
        fused: Vec<FusionEvent>,
    ) {
        let mut finals: Vec<FusionEvent> = Vec::new();
        for event in fused {
            match finals.iter_mut().find(|e| e.instance == event.instance) {
                Some(known) => *known = event,
                None => finals.push(event),
            }
        }
        for event in finals.into_iter().filter(|e| state.find(e.instance).is_some()) {
            self.unicast(
                player,
                &Envelope::reliable(
                    MessageKind::EchoFused,
                    &payloads::EchoFused {
                        result_instance_id: event.instance,
                        new_star_level: event.star,
                        definition_id: event.catalog,
                        is_on_board: event.on_board,
                        slot_index: event.slot,
                    },
                ),
            );
        }
    }
}

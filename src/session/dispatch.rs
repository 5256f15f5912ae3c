use super::Session;
use crate::BOARD_COLS;
use crate::BOARD_ROWS;
use crate::PlayerId;
use crate::intervention::InterventionKind;
use crate::phase::Phase;
use crate::protocol::Envelope;
use crate::protocol::MessageKind;
use crate::protocol::payloads::*;
use crate::roster::Reject;

// inbound dispatch: one self-contained unit per message
impl Session {
    pub(super) fn dispatch(&mut self, client: i32, envelope: Envelope) {
        if envelope.requires_ack {
            self.gateway.send(
                client,
                &Envelope::fire(
                    MessageKind::Ack,
                    &Ack {
                        acknowledged_sequence_id: envelope.sequence_id,
                    },
                ),
            );
        }
        match envelope.kind {
            MessageKind::Ack => self.on_ack(&envelope),
            MessageKind::Ping => self.on_ping(client, &envelope),
            MessageKind::JoinLobby => self.on_join(client, &envelope),
            MessageKind::ReadyUp => self.on_ready(client, &envelope),
            MessageKind::BuyEcho => self.on_buy(client, &envelope),
            MessageKind::SellEcho => self.on_sell(client, &envelope),
            MessageKind::RefreshShop => self.on_refresh(client),
            MessageKind::BuyXp => self.on_buy_xp(client),
            MessageKind::PositionEcho => self.on_position(client, &envelope),
            MessageKind::RemoveFromBoard => self.on_remove(client, &envelope),
            MessageKind::UseIntervention => self.on_intervention(client, &envelope),
            kind => log::warn!("client {} sent server-only kind {}", client, kind),
        }
    }

    /// the sender's seat; messages before the join handshake go nowhere
    fn seat_of(&self, client: i32) -> Option<PlayerId> {
        self.seats.get(&client).copied()
    }

    fn on_ack(&mut self, envelope: &Envelope) {
        match envelope.decode::<Ack>() {
            Ok(ack) => self.gateway.settle(ack.acknowledged_sequence_id),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// answered inline, no fanout; doubles as a liveness probe
    fn on_ping(&mut self, client: i32, envelope: &Envelope) {
        let Ok(ping) = envelope.decode::<Ping>() else {
            return;
        };
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        self.gateway.send(
            client,
            &Envelope::fire(
                MessageKind::Pong,
                &Pong {
                    original_timestamp: ping.timestamp,
                    server_received_at: now,
                },
            ),
        );
    }

    fn on_join(&mut self, client: i32, envelope: &Envelope) {
        let Ok(join) = envelope.decode::<JoinLobby>() else {
            return;
        };
        if self.over || self.scheduler.phase() != Phase::WaitingForPlayers {
            return self.reject(client, MessageKind::JoinLobby, Reject::MatchOver);
        }
        let player = client as PlayerId;
        let Some(_) = self.store.init_seat(player, join.player_name.clone(), &self.settings.player) else {
            log::error!("seat {} already taken", player);
            return;
        };
        self.shop.seat(player);
        self.seats.insert(client, player);
        log::info!("{} joined as player {}", join.player_name, player);
        self.gateway.send(
            client,
            &Envelope::reliable(
                MessageKind::JoinLobbyResponse,
                &JoinLobbyResponse {
                    player_name: join.player_name,
                },
            ),
        );
        self.broadcast_lobby();
    }

    fn on_ready(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(ready)) = (self.seat_of(client), envelope.decode::<ReadyUp>()) else {
            return;
        };
        if self.scheduler.phase() != Phase::WaitingForPlayers {
            return;
        }
        let _ = self.store.toggle_ready(player, ready.is_ready);
        let seated = self.store.players();
        let all_ready = seated.len() >= 2 && seated.iter().all(|p| p.is_ready);
        self.countdown = match all_ready {
            true => self
                .countdown
                .or(Some(self.settings.player.lobby_countdown_secs)),
            false => None,
        };
        self.broadcast_lobby();
    }

    fn on_buy(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(buy)) = (self.seat_of(client), envelope.decode::<BuyEcho>()) else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::BuyEcho, Reject::MatchOver);
        }
        let thresholds = self.settings.resonance.thresholds;
        match self.shop.buy(player, buy.shop_slot, &self.store, &self.catalog, &thresholds) {
            Err(why) => self.reject(client, MessageKind::BuyEcho, why),
            Ok((state, fused)) => {
                self.announce_fusions(player, &state, fused);
                let window = self.shop.rack(player).map(|r| r.window()).unwrap_or_default();
                self.unicast(
                    player,
                    &Envelope::reliable(
                        MessageKind::ShopRefreshed,
                        &ShopRefreshed {
                            echo_definition_ids: window,
                        },
                    ),
                );
            }
        }
    }

    fn on_sell(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(sell)) = (self.seat_of(client), envelope.decode::<SellEcho>()) else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::SellEcho, Reject::MatchOver);
        }
        let thresholds = self.settings.resonance.thresholds;
        if let Err(why) = self.shop.sell(
            player,
            sell.echo_instance_id,
            &self.store,
            &self.catalog,
            &thresholds,
            self.settings.player.max_gold,
        ) {
            self.reject(client, MessageKind::SellEcho, why);
        }
    }

    fn on_refresh(&mut self, client: i32) {
        let Some(player) = self.seat_of(client) else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::RefreshShop, Reject::MatchOver);
        }
        let level = self.store.get(player).map(|p| p.level).unwrap_or(1);
        match self.shop.refresh(player, level, &self.store, &self.catalog) {
            Err(why) => self.reject(client, MessageKind::RefreshShop, why),
            Ok(window) => self.unicast(
                player,
                &Envelope::reliable(
                    MessageKind::ShopRefreshed,
                    &ShopRefreshed {
                        echo_definition_ids: window,
                    },
                ),
            ),
        }
    }

    fn on_buy_xp(&mut self, client: i32) {
        let Some(player) = self.seat_of(client) else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::BuyXp, Reject::MatchOver);
        }
        if let Err(why) = self.store.buy_xp(player, &self.settings.player) {
            self.reject(client, MessageKind::BuyXp, why);
        }
    }

    fn on_position(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(position)) = (self.seat_of(client), envelope.decode::<PositionEcho>())
        else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::PositionEcho, Reject::MatchOver);
        }
        let (x, y) = (position.board_x, position.board_y);
        if x < 0 || y < 0 || x >= BOARD_COLS as i32 || y >= BOARD_ROWS as i32 {
            return self.reject(client, MessageKind::PositionEcho, Reject::OutOfBounds);
        }
        let index = y as usize * BOARD_COLS + x as usize;
        let thresholds = self.settings.resonance.thresholds;
        if let Err(why) = self.store.try_place(
            player,
            position.echo_instance_id,
            index,
            &self.catalog,
            &thresholds,
        ) {
            self.reject(client, MessageKind::PositionEcho, why);
        }
    }

    fn on_remove(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(remove)) = (self.seat_of(client), envelope.decode::<RemoveFromBoard>())
        else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::RemoveFromBoard, Reject::MatchOver);
        }
        let thresholds = self.settings.resonance.thresholds;
        if let Err(why) =
            self.store
                .try_recall(player, remove.echo_instance_id, &self.catalog, &thresholds)
        {
            self.reject(client, MessageKind::RemoveFromBoard, why);
        }
    }

    fn on_intervention(&mut self, client: i32, envelope: &Envelope) {
        let (Some(player), Ok(play)) = (self.seat_of(client), envelope.decode::<UseIntervention>())
        else {
            return;
        };
        if self.over {
            return self.reject(client, MessageKind::UseIntervention, Reject::MatchOver);
        }
        let Ok(kind) = InterventionKind::try_from(play.card_id.as_str()) else {
            return self.reject(client, MessageKind::UseIntervention, Reject::UnknownCard);
        };
        let Some(index) = self
            .arenas
            .iter()
            .position(|a| !a.settled && a.sim.players().contains(&player))
        else {
            return self.reject(client, MessageKind::UseIntervention, Reject::NoActiveCombat);
        };
        let (team, valid_target) = {
            let arena = &self.arenas[index];
            let team = match arena.sim.players()[0] == player {
                true => 0u8,
                false => 1u8,
            };
            let valid = kind.targetless() || {
                let expected = match kind.targets_enemy() {
                    true => 1 - team,
                    false => team,
                };
                arena.sim.team_of(play.target_id) == Some(expected)
            };
            (team, valid)
        };
        if !valid_target {
            return self.reject(client, MessageKind::UseIntervention, Reject::UnknownInstance);
        }
        match self.arenas[index].energy.submit(team, kind, play.target_id) {
            Err(why) => self.reject(client, MessageKind::UseIntervention, why),
            Ok(()) => {
                let energy = self.arenas[index].energy.energy(team);
                let max_energy = self.arenas[index].energy.max_energy();
                self.gateway.broadcast(&Envelope::fire(
                    MessageKind::InterventionActivated,
                    &InterventionActivated {
                        player_id: player,
                        intervention_type: kind.name().to_string(),
                        target_unit_id: play.target_id,
                    },
                ));
                self.unicast(
                    player,
                    &Envelope::fire(MessageKind::EnergyUpdate, &EnergyUpdate { energy, max_energy }),
                );
            }
        }
    }
}

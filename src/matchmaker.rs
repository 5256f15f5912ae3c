use crate::GHOST;
use crate::Health;
use crate::PlayerId;
use crate::roster::PlayerRuntime;
use crate::roster::Slot;
use std::collections::HashMap;

/// One scheduled fight. `ghost` carries the synthetic opponent's board
/// when `b` is the ghost sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub a: PlayerId,
    pub b: PlayerId,
    pub ghost: Option<Vec<Slot>>,
}

impl Pairing {
    pub fn is_ghost(&self) -> bool {
        self.b == GHOST
    }
}

/// Why a pairing was put on the marquee.
#[derive(Debug, Clone, PartialEq)]
pub struct Featured {
    pub a: PlayerId,
    pub b: PlayerId,
    pub reason: &'static str,
}

/// Per-round pairing: closest nexus health first, last-round rematches
/// avoided when any alternative exists, ghosts for whoever is left
/// over. The ghost bank remembers, per player, the board that last
/// beat them.
#[derive(Debug, Default)]
pub struct Matchmaker {
    last_opponent: HashMap<PlayerId, PlayerId>,
    ghost_bank: HashMap<PlayerId, Vec<Slot>>,
}

impl Matchmaker {
    pub fn pair(&self, alive: &[PlayerRuntime]) -> Vec<Pairing> {
        let mut order = alive.iter().collect::<Vec<&PlayerRuntime>>();
        order.sort_by_key(|p| (-p.health, p.id));
        let mut paired = Vec::<PlayerId>::new();
        let mut pairings = Vec::new();
        for player in order.iter() {
            if paired.contains(&player.id) {
                continue;
            }
            let candidates = order
                .iter()
                .filter(|c| c.id != player.id && !paired.contains(&c.id))
                .collect::<Vec<&&PlayerRuntime>>();
            let fresh = candidates
                .iter()
                .filter(|c| self.last_opponent.get(&player.id) != Some(&c.id))
                .copied()
                .collect::<Vec<&&PlayerRuntime>>();
            let from = match fresh.is_empty() {
                true => candidates,
                false => fresh,
            };
            let Some(rival) = from
                .into_iter()
                .min_by_key(|c| ((c.health - player.health).abs(), c.id))
            else {
                continue;
            };
            paired.push(player.id);
            paired.push(rival.id);
            pairings.push(Pairing {
                a: player.id,
                b: rival.id,
                ghost: None,
            });
        }
        for player in order.iter().filter(|p| !paired.contains(&p.id)) {
            pairings.push(Pairing {
                a: player.id,
                b: GHOST,
                ghost: Some(self.ghost_for(player)),
            });
        }
        pairings
    }

    /// the board that last beat them, or their own reflection
    fn ghost_for(&self, player: &PlayerRuntime) -> Vec<Slot> {
        self.ghost_bank
            .get(&player.id)
            .cloned()
            .unwrap_or_else(|| player.board.clone())
    }

    /// called once per resolved fight; the winner's snapshot haunts
    /// the loser
    pub fn record_result(&mut self, winner: PlayerId, loser: PlayerId, winner_board: Vec<Slot>) {
        if winner != GHOST {
            self.last_opponent.insert(loser, winner);
            self.ghost_bank.insert(loser, winner_board);
        }
        if loser != GHOST {
            self.last_opponent.insert(winner, loser);
        }
    }

    /// marquee pick: anyone near death first, biggest combined pot of
    /// health second
    pub fn featured(
        &self,
        pairings: &[Pairing],
        alive: &[PlayerRuntime],
        at_risk: Health,
    ) -> Option<Featured> {
        let health = |id: PlayerId| {
            alive
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.health)
                .unwrap_or(0)
        };
        if let Some(pairing) = pairings.iter().find(|p| {
            health(p.a) < at_risk || (!p.is_ghost() && health(p.b) < at_risk)
        }) {
            return Some(Featured {
                a: pairing.a,
                b: pairing.b,
                reason: "AtRisk",
            });
        }
        pairings
            .iter()
            .filter(|p| !p.is_ghost())
            .max_by_key(|p| health(p.a) + health(p.b))
            .map(|pairing| Featured {
                a: pairing.a,
                b: pairing.b,
                reason: "HighHP",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;

    fn players(healths: &[(PlayerId, Health)]) -> Vec<PlayerRuntime> {
        let settings = PlayerSettings::default();
        healths
            .iter()
            .map(|(id, hp)| {
                let mut p = PlayerRuntime::new(*id, format!("p{}", id), &settings);
                p.health = *hp;
                p
            })
            .collect()
    }

    #[test]
    fn even_field_pairs_by_health() {
        let maker = Matchmaker::default();
        let alive = players(&[(1, 90), (2, 40), (3, 85), (4, 35)]);
        let pairings = maker.pair(&alive);
        assert!(pairings.len() == 2);
        assert!(pairings[0] == Pairing { a: 1, b: 3, ghost: None });
        assert!(pairings[1] == Pairing { a: 2, b: 4, ghost: None });
    }

    #[test]
    fn odd_player_gets_a_mirror_ghost() {
        let maker = Matchmaker::default();
        let alive = players(&[(1, 50), (2, 50), (3, 50)]);
        let pairings = maker.pair(&alive);
        assert!(pairings.len() == 2);
        let ghost = pairings.iter().find(|p| p.is_ghost()).expect("odd one out");
        assert!(ghost.a == 3);
        assert!(ghost.ghost.as_ref().expect("mirror board").len() == crate::BOARD_SLOTS);
    }

    #[test]
    fn rematches_are_avoided_when_possible() {
        let mut maker = Matchmaker::default();
        let alive = players(&[(1, 50), (2, 50), (3, 50), (4, 50)]);
        for _ in 0..3 {
            let pairings = maker.pair(&alive);
            for pairing in pairings.iter() {
                assert!(maker.last_opponent.get(&pairing.a) != Some(&pairing.b));
                // winner arbitrary: a beats b
                maker.record_result(pairing.a, pairing.b, Vec::new());
            }
        }
    }

    #[test]
    fn forced_rematch_when_only_the_last_opponent_remains() {
        let mut maker = Matchmaker::default();
        maker.record_result(1, 2, Vec::new());
        let alive = players(&[(1, 50), (2, 50)]);
        let pairings = maker.pair(&alive);
        assert!(pairings.len() == 1);
        assert!(pairings[0].a == 1 && pairings[0].b == 2);
    }

    #[test]
    fn ghost_bank_replays_the_conqueror() {
        let mut maker = Matchmaker::default();
        let board = vec![Slot { id: 4000, star: 2 }];
        maker.record_result(7, 3, board.clone());
        let alive = players(&[(3, 20)]);
        let pairings = maker.pair(&alive);
        assert!(pairings[0].is_ghost());
        assert!(pairings[0].ghost.as_ref().expect("banked board") == &board);
    }

    #[test]
    fn featured_prefers_the_at_risk_table() {
        let maker = Matchmaker::default();
        let alive = players(&[(1, 90), (2, 80), (3, 10), (4, 15)]);
        let pairings = maker.pair(&alive);
        let featured = maker.featured(&pairings, &alive, 20).expect("marquee");
        assert!(featured.reason == "AtRisk");
        assert!(featured.a == 3 || featured.b == 3 || featured.a == 4 || featured.b == 4);
    }

    #[test]
    fn featured_falls_back_to_the_richest_pairing() {
        let maker = Matchmaker::default();
        let alive = players(&[(1, 90), (2, 80), (3, 60), (4, 55)]);
        let pairings = maker.pair(&alive);
        let featured = maker.featured(&pairings, &alive, 20).expect("marquee");
        assert!(featured.reason == "HighHP");
        assert!(featured.a == 1);
    }
}

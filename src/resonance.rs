use crate::catalog::Catalog;
use crate::catalog::ResonanceKind;
use crate::roster::Slot;
use serde::Deserialize;
use serde::Serialize;

/// An unlocked resonance on a player's board: the kind, its effective
/// unit count, and the tier that count reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResonanceBonus {
    pub kind: ResonanceKind,
    pub count: usize,
    pub tier: u8,
}

/// Derive the active bonuses from a board. Prism units wildcard into
/// every tangible kind. Output is sorted by kind name so identical
/// boards always publish identical lists.
pub fn active(board: &[Slot], catalog: &Catalog, thresholds: &[usize; 3]) -> Vec<ResonanceBonus> {
    let occupied = board
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| catalog.by_instance(s.id))
        .map(|def| def.resonance)
        .collect::<Vec<ResonanceKind>>();
    let prisms = occupied.iter().filter(|k| **k == ResonanceKind::Prism).count();
    let mut bonuses = ResonanceKind::TANGIBLE
        .iter()
        .map(|kind| (kind, occupied.iter().filter(|k| *k == kind).count()))
        .map(|(kind, count)| (kind, count + prisms))
        .map(|(kind, count)| ResonanceBonus {
            kind: *kind,
            count,
            tier: tier(count, thresholds),
        })
        .filter(|bonus| bonus.tier > 0)
        .collect::<Vec<ResonanceBonus>>();
    bonuses.sort_by_key(|b| b.kind.name());
    bonuses
}

/// largest tier whose threshold the count reaches
fn tier(count: usize, thresholds: &[usize; 3]) -> u8 {
    thresholds
        .iter()
        .enumerate()
        .filter(|(_, need)| count >= **need)
        .map(|(i, _)| i as u8 + 1)
        .next_back()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::INSTANCE_STRIDE;

    const THRESHOLDS: [usize; 3] = [2, 4, 6];

    fn slot(catalog: i32, copy: i32) -> Slot {
        Slot {
            id: catalog * INSTANCE_STRIDE + copy,
            star: 1,
        }
    }

    #[test]
    fn pairs_unlock_tier_one() {
        let catalog = Catalog::standard();
        // two Ember units: Cinder Whelp + Emberblade
        let board = vec![slot(1, 0), slot(6, 0), Slot::EMPTY];
        let active = active(&board, &catalog, &THRESHOLDS);
        assert!(active.len() == 1);
        assert!(active[0].kind == ResonanceKind::Ember);
        assert!(active[0].count == 2);
        assert!(active[0].tier == 1);
    }

    #[test]
    fn singletons_stay_dormant() {
        let catalog = Catalog::standard();
        let board = vec![slot(1, 0), slot(2, 0)];
        assert!(active(&board, &catalog, &THRESHOLDS).is_empty());
    }

    #[test]
    fn prism_wildcards_into_every_kind() {
        let catalog = Catalog::standard();
        // one Ember + one Frost + one Prism: both reach count 2
        let board = vec![slot(1, 0), slot(2, 0), slot(15, 0)];
        let active = active(&board, &catalog, &THRESHOLDS);
        assert!(active.len() == 2);
        assert!(active.iter().all(|b| b.count == 2 && b.tier == 1));
        // sorted by kind name: Ember before Frost
        assert!(active[0].kind == ResonanceKind::Ember);
        assert!(active[1].kind == ResonanceKind::Frost);
    }

    #[test]
    fn prism_alone_activates_nothing() {
        let catalog = Catalog::standard();
        let board = vec![slot(15, 0)];
        assert!(active(&board, &catalog, &THRESHOLDS).is_empty());
    }

    #[test]
    fn a_prism_pair_lights_every_kind() {
        let catalog = Catalog::standard();
        // no native units anywhere, but two wildcards reach the first
        // threshold for every tangible kind
        let board = vec![slot(15, 0), slot(15, 1)];
        let active = active(&board, &catalog, &THRESHOLDS);
        assert!(active.len() == ResonanceKind::TANGIBLE.len());
        assert!(active.iter().all(|b| b.count == 2 && b.tier == 1));
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert!(tier(1, &THRESHOLDS) == 0);
        assert!(tier(2, &THRESHOLDS) == 1);
        assert!(tier(3, &THRESHOLDS) == 1);
        assert!(tier(4, &THRESHOLDS) == 2);
        assert!(tier(6, &THRESHOLDS) == 3);
        assert!(tier(9, &THRESHOLDS) == 3);
    }
}

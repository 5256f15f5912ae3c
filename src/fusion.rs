use crate::CatalogId;
use crate::INSTANCE_STRIDE;
use crate::InstanceId;
use crate::MAX_STAR;
use crate::roster::Slot;

/// One completed 3-into-1 upgrade. `slot` indexes the surviving copy
/// within its own array (board when `on_board`, bench otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionEvent {
    pub instance: InstanceId,
    pub catalog: CatalogId,
    pub star: u8,
    pub on_board: bool,
    pub slot: usize,
}

/// Scan board and bench for triplets of the same (catalog, star) and
/// collapse them until no triplet remains. The survivor prefers the
/// board, then the lowest slot index; consumed copies are cleared in
/// place. A fresh 2-star can immediately cascade into a 3-star, so the
/// scan restarts after every fusion.
pub fn fuse(board: &mut [Slot], bench: &mut [Slot]) -> Vec<FusionEvent> {
    let mut events = Vec::new();
    while let Some(event) = fuse_once(board, bench) {
        events.push(event);
    }
    events
}

fn fuse_once(board: &mut [Slot], bench: &mut [Slot]) -> Option<FusionEvent> {
    let group = candidates(board, bench)
        .iter()
        .copied()
        .find_map(|(catalog, star)| triplet(board, bench, catalog, star))?;
    let (survivor, eaten) = group.split_first().expect("triplet has three members");
    for position in eaten {
        *slot_mut(board, bench, *position) = Slot::EMPTY;
    }
    let winner = slot_mut(board, bench, *survivor);
    winner.star += 1;
    Some(FusionEvent {
        instance: winner.id,
        catalog: winner.id / INSTANCE_STRIDE,
        star: winner.star,
        on_board: survivor.0,
        slot: survivor.1,
    })
}

type Position = (bool, usize);

/// occupied (catalog, star) pairs in deterministic iteration order
fn candidates(board: &[Slot], bench: &[Slot]) -> Vec<(CatalogId, u8)> {
    let mut seen = Vec::new();
    for slot in board.iter().chain(bench.iter()) {
        if slot.is_empty() || slot.star >= MAX_STAR {
            continue;
        }
        let key = (slot.id / INSTANCE_STRIDE, slot.star);
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen
}

/// first three members of the group, board before bench, ascending index
fn triplet(board: &[Slot], bench: &[Slot], catalog: CatalogId, star: u8) -> Option<[Position; 3]> {
    let members = board
        .iter()
        .enumerate()
        .map(|(i, s)| ((true, i), s))
        .chain(bench.iter().enumerate().map(|(i, s)| ((false, i), s)))
        .filter(|(_, s)| !s.is_empty() && s.id / INSTANCE_STRIDE == catalog && s.star == star)
        .map(|(p, _)| p)
        .collect::<Vec<Position>>();
    match members.len() {
        n if n >= 3 => {
            let mut sorted = members;
            sorted.sort_by_key(|(on_board, index)| (!on_board, *index));
            Some([sorted[0], sorted[1], sorted[2]])
        }
        _ => None,
    }
}

fn slot_mut<'a>(board: &'a mut [Slot], bench: &'a mut [Slot], position: Position) -> &'a mut Slot {
    match position {
        (true, i) => &mut board[i],
        (false, i) => &mut bench[i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(catalog: CatalogId, copy: i32, star: u8) -> Slot {
        Slot {
            id: catalog * INSTANCE_STRIDE + copy,
            star,
        }
    }

    #[test]
    fn three_ones_make_a_two() {
        let mut board = vec![Slot::EMPTY; 4];
        let mut bench = vec![unit(7, 0, 1), unit(7, 1, 1), unit(7, 2, 1)];
        let events = fuse(&mut board, &mut bench);
        assert!(events.len() == 1);
        assert!(events[0].star == 2);
        assert!(events[0].on_board == false);
        assert!(events[0].slot == 0);
        assert!(bench[0].star == 2);
        assert!(bench[1].is_empty());
        assert!(bench[2].is_empty());
    }

    #[test]
    fn survivor_prefers_the_board() {
        let mut board = vec![Slot::EMPTY, unit(7, 0, 1)];
        let mut bench = vec![unit(7, 1, 1), unit(7, 2, 1)];
        let events = fuse(&mut board, &mut bench);
        assert!(events.len() == 1);
        assert!(events[0].on_board == true);
        assert!(events[0].slot == 1);
        assert!(board[1].star == 2);
        assert!(bench.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn nine_ones_cascade_to_a_three_in_one_call() {
        let mut board = vec![unit(3, 0, 1), Slot::EMPTY, Slot::EMPTY, Slot::EMPTY];
        let mut bench = (1..9).map(|c| unit(3, c, 1)).collect::<Vec<Slot>>();
        let events = fuse(&mut board, &mut bench);
        assert!(events.last().expect("cascade happened").star == 3);
        assert!(board[0].star == 3);
        assert!(bench.iter().all(|s| s.is_empty()));
        assert!(board.iter().filter(|s| !s.is_empty()).count() == 1);
    }

    #[test]
    fn max_star_does_not_fuse() {
        let mut board = vec![unit(3, 0, 3), unit(3, 1, 3), unit(3, 2, 3)];
        let mut bench = vec![Slot::EMPTY; 3];
        let events = fuse(&mut board, &mut bench);
        assert!(events.is_empty());
        assert!(board.iter().all(|s| s.star == 3));
    }

    #[test]
    fn six_at_one_star_leave_no_leftovers() {
        let mut board = vec![Slot::EMPTY; 2];
        let mut bench = (0..6).map(|c| unit(5, c, 1)).collect::<Vec<Slot>>();
        let events = fuse(&mut board, &mut bench);
        assert!(events.len() == 2);
        assert!(bench.iter().filter(|s| s.star == 2).count() == 2);
        assert!(bench.iter().filter(|s| s.is_empty()).count() == 4);
    }

    #[test]
    fn distinct_stars_do_not_mix() {
        let mut board = vec![Slot::EMPTY; 2];
        let mut bench = vec![unit(5, 0, 1), unit(5, 1, 1), unit(5, 2, 2)];
        assert!(fuse(&mut board, &mut bench).is_empty());
    }
}

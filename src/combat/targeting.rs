use super::CombatUnit;
use super::Strategy;

/// Pick a victim for `attacker`. A live, non-retreating focus
/// override wins outright; otherwise the unit's strategy scans every
/// live, unstealthed enemy by Chebyshev distance, ties broken by
/// ascending instance id so reruns agree.
pub fn select(units: &[CombatUnit], attacker: usize) -> Option<usize> {
    let me = &units[attacker];
    if let Some((focus, _)) = me.focus {
        if let Some(index) = units.iter().position(|u| u.instance == focus) {
            if units[index].alive && !units[index].retreating() {
                return Some(index);
            }
        }
    }
    let enemies = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.team != me.team && u.alive && !u.stealthed())
        .map(|(i, u)| (me.chebyshev(u), u.instance, i));
    match me.strategy {
        Strategy::Nearest => enemies.min_by_key(|(d, id, _)| (*d, *id)),
        Strategy::Farthest => enemies.max_by_key(|(d, id, _)| (*d, -id)),
    }
    .map(|(_, _, i)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Effect;
    use crate::combat::EffectKind;
    use crate::combat::testkit::dummy;

    #[test]
    fn nearest_breaks_ties_by_instance_id() {
        let units = vec![
            dummy(1000, 0, 0, 0),
            dummy(2001, 1, 1, 0),
            dummy(2000, 1, 0, 1),
        ];
        // both enemies at distance 1: lower instance id wins
        assert!(select(&units, 0) == Some(2));
    }

    #[test]
    fn farthest_prefers_distance_then_low_id() {
        let mut units = vec![
            dummy(1000, 0, 0, 0),
            dummy(2000, 1, 7, 0),
            dummy(2001, 1, 7, 0),
        ];
        units[0].strategy = Strategy::Farthest;
        assert!(select(&units, 0) == Some(1));
    }

    #[test]
    fn stealth_hides_from_selection() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0), dummy(2001, 1, 5, 0)];
        units[1].afflict(Effect::new(EffectKind::Stealth, 60, 0));
        assert!(select(&units, 0) == Some(2));
    }

    #[test]
    fn live_focus_override_wins() {
        let mut units = vec![dummy(1000, 0, 0, 0), dummy(2000, 1, 1, 0), dummy(2001, 1, 5, 0)];
        units[0].focus = Some((2001, 60));
        assert!(select(&units, 0) == Some(2));
        units[2].alive = false;
        assert!(select(&units, 0) == Some(1));
    }

    #[test]
    fn no_enemies_no_target() {
        let units = vec![dummy(1000, 0, 0, 0), dummy(1001, 0, 1, 0)];
        assert!(select(&units, 0).is_none());
    }
}

use crate::bits::Bitvector;
use crate::state::{Direction, SokobanState};

/// Iteratively prune every box that has at least one push axis with both
/// neighbours free (`can_push`); repeat until no further box can be pruned.
/// Boxes that never get pruned are "simple" deadlocks.
///
/// This is intentionally admissible-leaning-optimistic: a box trapped by a
/// more subtle configuration than "both neighbours along some axis are
/// blocked" will not be detected, but nothing free is ever miscounted as
/// stuck. See `heuristic.rs` for how the count feeds into `h(s)`.
pub fn deadlock_count(state: &SokobanState) -> usize {
    let boxes = state.box_positions();
    let n = boxes.len();
    if n == 0 || n > 64 {
        return 0;
    }

    let mut pruned = Bitvector::new();
    loop {
        let mut progressed = false;
        for (idx, &pos) in boxes.iter().enumerate() {
            let idx = idx as u8;
            if pruned.contains(idx) {
                continue;
            }
            if state.is_goal(pos) {
                pruned.add(idx);
                progressed = true;
                continue;
            }
            if state.can_push(pos, Direction::Up) || state.can_push(pos, Direction::Left) {
                pruned.add(idx);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    n - pruned.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;

    fn state(text: &str) -> SokobanState {
        let grid = Grid::from_text(text).unwrap();
        SokobanState::from_grid(&grid)
    }

    #[test]
    fn test_no_deadlock_in_open_room() {
        let s = state("######\n#    #\n# $$ #\n# .. #\n#  @ #\n######");
        assert_eq!(deadlock_count(&s), 0);
    }

    #[test]
    fn test_corner_box_off_goal_is_deadlocked() {
        let s = state("#####\n#$ @#\n#.  #\n#####");
        assert_eq!(deadlock_count(&s), 1);
    }

    #[test]
    fn test_box_on_goal_never_deadlocked_even_in_corner() {
        let s = state("####\n#+@#\n####");
        assert_eq!(deadlock_count(&s), 0);
    }

    #[test]
    fn test_one_free_axis_is_not_deadlocked() {
        // Box against the left wall but free to push up/down.
        let s = state("#####\n#   #\n#$ .#\n#@  #\n#####");
        assert_eq!(deadlock_count(&s), 0);
    }
}

//! The Sokoban heuristic (spec.md §4.3): an admissible-leaning-optimistic
//! estimate combining a minimum-cost box/goal assignment, the distance from
//! the player to its nearest box, and a flat penalty per apparent deadlock.
//! Grounded on `hungarian.rs`'s `hungarian_algorithm` (teacher's own
//! `GreedyHeuristic`/`SimpleHeuristic` matching machinery, generalized from
//! precomputed BFS distance tables to plain Manhattan distance per
//! `original_source/sealgo/sokoban.py::SokobanProblem.heuristic`) and
//! `state.rs`'s `deadlock_count`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::hungarian::{ArrayMatrix, MAX_BOXES, hungarian_algorithm};
use crate::state::SokobanState;

/// Flat penalty added once any box is detected as deadlocked. Large enough
/// to dominate any remaining assignment/player-distance term for levels
/// this solver targets, without overflowing `u32` arithmetic.
const DEADLOCK_PENALTY: u32 = 50;

fn manhattan(a: (usize, usize), b: (usize, usize)) -> u32 {
    (a.0 as i64 - b.0 as i64).unsigned_abs() as u32 + (a.1 as i64 - b.1 as i64).unsigned_abs() as u32
}

/// Minimum-cost assignment of boxes to goals under Manhattan distance.
fn min_cost_assign(boxes: &[(usize, usize)], goals: &[(usize, usize)]) -> u32 {
    let n = boxes.len();
    if n == 0 {
        return 0;
    }
    assert_eq!(n, goals.len(), "box/goal count mismatch");
    assert!(n <= MAX_BOXES, "too many boxes for the assignment matrix");

    let mut matrix: ArrayMatrix<u32, { MAX_BOXES * MAX_BOXES }> = ArrayMatrix::new(n, n);
    for &b in boxes {
        for &g in goals {
            matrix.push(manhattan(b, g));
        }
    }
    hungarian_algorithm(&matrix)
}

fn player_to_closest_box(state: &SokobanState, boxes: &[(usize, usize)]) -> u32 {
    boxes
        .iter()
        .map(|&b| manhattan(state.player(), b))
        .min()
        .unwrap_or(0)
}

/// `h(s) = MinCostAssign(boxes, goals) + PlayerToClosestBox(s) + 50 ·
/// [deadlock_count(s) > 0]` (spec.md §4.3.2).
pub fn heuristic(state: &SokobanState) -> u32 {
    let boxes = state.box_positions();
    let goals = state.goal_positions();

    let assign = min_cost_assign(&boxes, &goals);
    let player_term = player_to_closest_box(state, &boxes);
    let deadlock_term = if state.deadlock_count() > 0 {
        DEADLOCK_PENALTY
    } else {
        0
    };

    assign + player_term + deadlock_term
}

/// The symmetric backward heuristic (spec.md §4.3.3): `MinCostAssign(boxes(s),
/// init_boxes) + ManhattanDistance(player(s), init_player)`. A backward state
/// estimates its remaining distance to the original layout — box placement
/// *and* player position — not to the goals, so this does not reuse the
/// forward heuristic's player-to-closest-box or deadlock terms.
pub fn re_heuristic(
    state: &SokobanState,
    initial_boxes: &[(usize, usize)],
    initial_player: (usize, usize),
) -> u32 {
    let boxes = state.box_positions();
    let assign = min_cost_assign(&boxes, initial_boxes);
    let player_term = manhattan(state.player(), initial_player);

    assign + player_term
}

/// A memoizing cache over `heuristic`/`re_heuristic`, keyed by state
/// identity. Search loops call through this rather than the bare functions
/// so repeated visits to the same state (common once the frontier grows)
/// don't re-run the Hungarian algorithm.
#[derive(Default)]
pub struct HeuristicCache {
    forward: RefCell<HashMap<SokobanState, u32>>,
    backward: RefCell<HashMap<SokobanState, u32>>,
}

impl HeuristicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&self, state: &SokobanState) -> u32 {
        if let Some(&v) = self.forward.borrow().get(state) {
            return v;
        }
        let v = heuristic(state);
        self.forward.borrow_mut().insert(state.clone(), v);
        v
    }

    pub fn backward(
        &self,
        state: &SokobanState,
        initial_boxes: &[(usize, usize)],
        initial_player: (usize, usize),
    ) -> u32 {
        if let Some(&v) = self.backward.borrow().get(state) {
            return v;
        }
        let v = re_heuristic(state, initial_boxes, initial_player);
        self.backward.borrow_mut().insert(state.clone(), v);
        v
    }
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
    fn test_heuristic_zero_when_solved() {
        let s = state("####\n#@+#\n####");
        assert_eq!(heuristic(&s), 0);
    }

    #[test]
    fn test_heuristic_one_box_one_push_away() {
        let s = state("#####\n#@$.#\n#####");
        // box at (1,2) to goal at (1,3): distance 1; player at (1,1) to box: 1
        assert_eq!(heuristic(&s), 2);
    }

    #[test]
    fn test_heuristic_penalizes_deadlock() {
        let deadlocked = state("#####\n#$ @#\n#.  #\n#####");
        let open = state("#####\n#   #\n#$ .#\n#@  #\n#####");
        assert!(deadlocked.deadlock_count() > 0);
        assert_eq!(open.deadlock_count(), 0);
        assert!(heuristic(&deadlocked) >= DEADLOCK_PENALTY);
    }

    #[test]
    fn test_heuristic_cache_matches_bare_function() {
        let s = state("#####\n#@$.#\n#####");
        let cache = HeuristicCache::new();
        assert_eq!(cache.forward(&s), heuristic(&s));
        // second call exercises the cached path
        assert_eq!(cache.forward(&s), heuristic(&s));
    }

    #[test]
    fn test_min_cost_assign_picks_cheaper_pairing() {
        let boxes = [(0, 0), (0, 5)];
        let goals = [(0, 1), (0, 4)];
        assert_eq!(min_cost_assign(&boxes, &goals), 2);
    }

    #[test]
    fn test_re_heuristic_is_assignment_plus_player_to_start() {
        let s = state("#####\n#@$.#\n#####");
        // push the box onto the goal, walking the player along with it.
        let mut pushed = s.clone();
        pushed.p_move(crate::state::Direction::Right);
        // from `pushed`, box is at (1,3) == initial_boxes[0]: assignment 0;
        // player is now at (1,2), initial player was at (1,1): distance 1.
        let initial_boxes = s.box_positions();
        let initial_player = s.player();
        assert_eq!(re_heuristic(&pushed, &initial_boxes, initial_player), 1);
    }

    #[test]
    fn test_re_heuristic_matches_cache() {
        let s = state("#####\n#@$.#\n#####");
        let mut pushed = s.clone();
        pushed.p_move(crate::state::Direction::Right);
        let initial_boxes = s.box_positions();
        let initial_player = s.player();
        let cache = HeuristicCache::new();
        assert_eq!(
            cache.backward(&pushed, &initial_boxes, initial_player),
            re_heuristic(&pushed, &initial_boxes, initial_player)
        );
    }
}

//! Concrete `SearchProblem`/`HeuristicSearchProblem`/`BiSearchProblem`
//! implementations over `SokobanState`. Grounded on
//! `original_source/sealgo/sokoban.py::SokobanProblem`, translated from a
//! Python class with optional-override methods into two Rust trait impls
//! (see `problem.rs`'s module doc for why the split).

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::board::{Position, Tile};
use crate::heuristic::HeuristicCache;
use crate::problem::{BiSearchProblem, HeuristicSearchProblem, SearchProblem};
use crate::state::{Action, BackwardAction, SokobanState};

/// A single Sokoban level as a search problem. Bundles the initial state
/// with a heuristic cache shared across forward and backward queries, and a
/// fixed seed so repeated `goal_states` calls for the same level are
/// reproducible (spec.md §9 — resolved by reusing the teacher's seeded
/// `ChaCha8Rng` pattern, previously used for Zobrist table generation,
/// here for goal-state sampling instead).
pub struct SokobanProblem {
    initial: SokobanState,
    cache: HeuristicCache,
    goal_sample_seed: u64,
}

impl SokobanProblem {
    pub fn new(initial: SokobanState) -> Self {
        SokobanProblem {
            initial,
            cache: HeuristicCache::new(),
            goal_sample_seed: 0x5f3759df,
        }
    }

    pub fn with_seed(initial: SokobanState, seed: u64) -> Self {
        SokobanProblem {
            initial,
            cache: HeuristicCache::new(),
            goal_sample_seed: seed,
        }
    }

    pub fn initial(&self) -> &SokobanState {
        &self.initial
    }

    /// The canonical goal tile layout: every goal cell holds a box, with no
    /// player placed yet. Box identity doesn't survive in the tile
    /// representation (a `GoalBox` tile looks the same regardless of which
    /// box arrived there), so there is exactly one such layout per level —
    /// every `goal_states` candidate differs only in where the player
    /// stands.
    fn canonical_goal_tiles(&self) -> Vec<Vec<Tile>> {
        let rows = self.initial.rows();
        let cols = self.initial.cols();
        let mut tiles = vec![vec![Tile::Space; cols]; rows];
        for r in 0..rows {
            for c in 0..cols {
                tiles[r][c] = match self.initial.get((r, c)) {
                    Tile::Wall => Tile::Wall,
                    t if t.is_goal_cell() => Tile::GoalBox,
                    _ => Tile::Space,
                };
            }
        }
        tiles
    }
}

impl SearchProblem for SokobanProblem {
    type State = SokobanState;
    type Move = Action;

    fn initial_states(&self) -> Vec<SokobanState> {
        vec![self.initial.clone()]
    }

    fn actions(&self, state: &SokobanState) -> Vec<Action> {
        state.legal_moves().into_iter().map(Action::from_direction).collect()
    }

    fn result(&self, state: &SokobanState, action: Action) -> SokobanState {
        match action.direction() {
            None => state.clone(),
            Some(dir) => {
                let mut next = state.clone();
                next.p_move(dir);
                next
            }
        }
    }

    fn is_goal(&self, state: &SokobanState) -> bool {
        state.is_goal_state()
    }
}

impl HeuristicSearchProblem for SokobanProblem {
    fn heuristic(&self, state: &SokobanState) -> u32 {
        self.cache.forward(state)
    }
}

impl BiSearchProblem for SokobanProblem {
    type BackwardMove = BackwardAction;

    fn goal_states(&self, k: usize) -> Vec<SokobanState> {
        let base_tiles = self.canonical_goal_tiles();
        let rows = base_tiles.len();
        let cols = base_tiles.first().map(|r| r.len()).unwrap_or(0);

        let mut candidates = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let tile = base_tiles[r][c];
                if matches!(tile, Tile::Wall | Tile::GoalBox) {
                    continue;
                }
                if !has_adjacent_box(&base_tiles, (r, c)) {
                    continue;
                }
                let mut tiles = base_tiles.clone();
                tiles[r][c] = if tile.is_goal_cell() {
                    Tile::GoalPlayer
                } else {
                    Tile::Player
                };
                candidates.push(SokobanState::from_tiles(tiles, (r, c)));
            }
        }

        if candidates.len() <= k {
            return candidates;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.goal_sample_seed);
        candidates.shuffle(&mut rng);
        candidates.truncate(k);
        candidates
    }

    fn actions_to(&self, state: &SokobanState) -> Vec<BackwardAction> {
        state.legal_backward_actions()
    }

    fn reason(&self, state: &SokobanState, action: BackwardAction) -> SokobanState {
        let mut prev = state.clone();
        prev.p_undo(action.direction, action.pull);
        prev
    }

    fn re_heuristic(&self, state: &SokobanState) -> u32 {
        self.cache
            .backward(state, &self.initial.box_positions(), self.initial.player())
    }

    fn forward_equivalent(action: BackwardAction) -> Action {
        Action::from_direction(action.direction)
    }
}

fn has_adjacent_box(tiles: &[Vec<Tile>], pos: Position) -> bool {
    let rows = tiles.len() as isize;
    let cols = tiles.first().map(|r| r.len()).unwrap_or(0) as isize;
    let (r, c) = (pos.0 as isize, pos.1 as isize);
    for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (nr, nc) = (r + dr, c + dc);
        if nr < 0 || nc < 0 || nr >= rows || nc >= cols {
            continue;
        }
        if tiles[nr as usize][nc as usize] == Tile::GoalBox {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;

    fn problem(text: &str) -> SokobanProblem {
        let grid = Grid::from_text(text).unwrap();
        SokobanProblem::new(SokobanState::from_grid(&grid))
    }

    #[test]
    fn test_forward_actions_and_result() {
        let p = problem("#####\n#@$.#\n#####");
        let s = p.initial().clone();
        let actions = p.actions(&s);
        assert_eq!(actions, vec![Action::Right]);
        let next = p.result(&s, Action::Right);
        assert!(p.is_goal(&next));
    }

    #[test]
    fn test_goal_states_are_all_goals() {
        let p = problem("#####\n#@$.#\n#####");
        for g in p.goal_states(10) {
            assert!(p.is_goal(&g));
        }
    }

    #[test]
    fn test_goal_states_sampling_respects_k() {
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let all = p.goal_states(1000);
        let sampled = p.goal_states(1);
        assert!(sampled.len() <= 1);
        assert!(sampled.len() <= all.len());
    }

    #[test]
    fn test_backward_actions_invert_forward() {
        let p = problem("#####\n#@$.#\n#####");
        let s = p.initial().clone();
        let next = p.result(&s, Action::Right);
        let back = p.actions_to(&next);
        assert!(back.iter().any(|a| a.direction == crate::state::Direction::Right && a.pull));
        let restored = p.reason(&next, *back.iter().find(|a| a.pull).unwrap());
        assert_eq!(restored, s);
    }
}

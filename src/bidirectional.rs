//! The bidirectional weighted-A* driver (spec.md §4.5) — the central
//! contribution this crate exists to deliver. Grounded on
//! `original_source/sealgo/bidirectional.py::BiDirectional.search`: a
//! forward frontier rooted at the initial state and a backward frontier
//! rooted at every synthesized goal state, interleaved under a `b_weight`
//! ratio, meeting in the middle.
//!
//! Unlike `search.rs`'s run-to-completion strategies, this driver needs to
//! pop-and-expand one frontier at a time under caller-controlled
//! interleaving, so it keeps its own minimal per-side search state (`Side`)
//! rather than reusing `search::run`.

use std::collections::HashMap;

use crate::pqueue::PriorityQueue;
use crate::problem::BiSearchProblem;

/// One frontier's worth of search state: a priority queue plus the
/// bookkeeping needed to reconstruct a path once a meeting point is found.
struct Side<S, M> {
    frontier: PriorityQueue<S>,
    predecessors: HashMap<S, Option<(S, M)>>,
    g_cost: HashMap<S, u32>,
    closed: HashMap<S, u32>,
}

impl<S: Clone + Ord + std::hash::Hash, M: Clone> Side<S, M> {
    fn new() -> Self {
        Side {
            frontier: PriorityQueue::new(),
            predecessors: HashMap::new(),
            g_cost: HashMap::new(),
            closed: HashMap::new(),
        }
    }

    /// Seed every root at priority 0 — the lowest any `g + weight*h` value
    /// can produce, and pushed before any other node, so FIFO tie-breaking
    /// in `PriorityQueue` guarantees roots pop before anything derived from
    /// them. This stands in for spec.md §4.5.1's literal priority `-1`
    /// (`PriorityQueue`'s priorities are unsigned; there is no lower value
    /// to seed with, and none is needed).
    fn seed(&mut self, roots: Vec<S>) {
        for root in roots {
            self.predecessors.entry(root.clone()).or_insert(None);
            self.g_cost.insert(root.clone(), 0);
            self.frontier.push(0, root);
        }
    }

    fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Pop the next unsettled state and expand it via `successors`, which
    /// returns `(next_state, action, cost)` triples. Returns the popped
    /// state, or `None` if the frontier is empty.
    fn extend(
        &mut self,
        eval: &impl Fn(&S, u32) -> usize,
        successors: &impl Fn(&S) -> Vec<(S, M, u32)>,
    ) -> Option<S> {
        loop {
            let state = self.frontier.pop_min()?;
            let g = self.g_cost[&state];
            if self.closed.get(&state).is_some_and(|&best| best <= g) {
                continue;
            }
            self.closed.insert(state.clone(), g);

            for (next, action, cost) in successors(&state) {
                let next_g = g + cost;
                let better = self.g_cost.get(&next).is_none_or(|&existing| next_g < existing);
                if better {
                    self.g_cost.insert(next.clone(), next_g);
                    self.predecessors.insert(next.clone(), Some((state.clone(), action)));
                    let priority = eval(&next, next_g);
                    self.frontier.push(priority, next);
                }
            }

            return Some(state);
        }
    }

    fn path_to(&self, state: &S) -> Vec<M> {
        let mut actions = Vec::new();
        let mut current = state.clone();
        while let Some(Some((parent, action))) = self.predecessors.get(&current) {
            actions.push(action.clone());
            current = parent.clone();
        }
        actions.reverse();
        actions
    }

    /// Walk `predecessors` from `state` to a root *without* reversing,
    /// yielding actions in meeting-to-root order: `[action@state,
    /// action@parent(state), ...]`. This is the backward tail's natural
    /// walk order (spec.md §4.5.3 step 2; `original_source/sealgo/bidirectional.py`'s
    /// `_reconstruct_path` appends while walking from the meeting state to
    /// the backward root and never reverses) — unlike `path_to`, which
    /// reverses because the *forward* tail needs root-to-state order.
    fn path_from(&self, state: &S) -> Vec<M> {
        let mut actions = Vec::new();
        let mut current = state.clone();
        while let Some(Some((parent, action))) = self.predecessors.get(&current) {
            actions.push(action.clone());
            current = parent.clone();
        }
        actions
    }
}

/// `b_weight` from spec.md §4.5.2: either a finite ratio of backward to
/// forward extensions, or `Infinite` (backward-only search, never touching
/// the forward frontier after setup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BWeight {
    Finite(u32),
    Infinite,
}

/// The outcome of a bidirectional run: the forward action sequence plus
/// the branching-factor telemetry from spec.md §4.5.4.
pub struct BiDirectionalResult<M> {
    pub actions: Vec<M>,
    pub b_factor: f64,
    pub nodes_explored: usize,
}

/// Run the bidirectional driver to completion. `k_goal_states` bounds how
/// many synthesized goal states seed the backward frontier
/// (`problem.goal_states(k_goal_states)`); `weight` is the weighted-A*
/// heuristic weight applied on both sides; `b_weight` is the forward/backward
/// interleaving ratio.
pub fn search<P: BiSearchProblem>(
    problem: &P,
    weight: u32,
    b_weight: BWeight,
    k_goal_states: usize,
) -> Option<BiDirectionalResult<P::Move>> {
    let mut fwd: Side<P::State, P::Move> = Side::new();
    fwd.seed(problem.initial_states());

    let mut bwd: Side<P::State, P::BackwardMove> = Side::new();
    bwd.seed(problem.goal_states(k_goal_states));

    let fwd_eval = |state: &P::State, g: u32| (g + weight.saturating_mul(problem.heuristic(state))) as usize;
    let bwd_eval = |state: &P::State, g: u32| (g + weight.saturating_mul(problem.re_heuristic(state))) as usize;

    let fwd_successors = |state: &P::State| -> Vec<(P::State, P::Move, u32)> {
        problem
            .actions(state)
            .into_iter()
            .map(|a| {
                let next = problem.result(state, a);
                let cost = problem.action_cost(state, a);
                (next, a, cost)
            })
            .collect()
    };
    let bwd_successors = |state: &P::State| -> Vec<(P::State, P::BackwardMove, u32)> {
        problem
            .actions_to(state)
            .into_iter()
            .map(|a| {
                let next = problem.reason(state, a);
                (next, a, 1)
            })
            .collect()
    };

    let mut b_times = 0u32;

    loop {
        match b_weight {
            BWeight::Infinite => {
                if bwd.is_empty() {
                    return None;
                }
            }
            BWeight::Finite(w) => {
                if b_times >= w {
                    if fwd.is_empty() {
                        return None;
                    }
                    fwd.extend(&fwd_eval, &fwd_successors);
                    b_times = 0;
                }
                if bwd.is_empty() {
                    return None;
                }
            }
        }

        let Some(popped) = bwd.extend(&bwd_eval, &bwd_successors) else {
            return None;
        };
        if let BWeight::Finite(_) = b_weight {
            b_times += 1;
        }

        if fwd.predecessors.contains_key(&popped) {
            return Some(reconstruct(problem, &fwd, &bwd, &popped));
        }
    }
}

fn reconstruct<P: BiSearchProblem>(
    _problem: &P,
    fwd: &Side<P::State, P::Move>,
    bwd: &Side<P::State, P::BackwardMove>,
    meeting: &P::State,
) -> BiDirectionalResult<P::Move> {
    let fwd_tail = fwd.path_to(meeting);
    let bwd_backward_actions = bwd.path_from(meeting);
    let bwd_tail: Vec<P::Move> = bwd_backward_actions
        .into_iter()
        .map(P::forward_equivalent)
        .collect();

    let mut actions = fwd_tail;
    actions.extend(bwd_tail);

    let nodes_explored = fwd.predecessors.len() + bwd.predecessors.len();
    let b_factor = if actions.is_empty() {
        0.0
    } else {
        (nodes_explored as f64).ln() / (actions.len() as f64).ln()
    };

    BiDirectionalResult {
        actions,
        b_factor,
        nodes_explored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;
    use crate::sokoban_problem::SokobanProblem;
    use crate::state::SokobanState;

    fn problem(text: &str) -> SokobanProblem {
        let grid = Grid::from_text(text).unwrap();
        SokobanProblem::new(SokobanState::from_grid(&grid))
    }

    #[test]
    fn test_bidirectional_solves_trivial_level() {
        let p = problem("#####\n#@$.#\n#####");
        let result = search(&p, 1, BWeight::Finite(1), 8).expect("solvable");
        assert_eq!(result.actions.len(), 1);
    }

    #[test]
    fn test_bidirectional_solves_small_level_with_weight() {
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let result = search(&p, 3, BWeight::Finite(2), 16).expect("solvable");
        assert!(!result.actions.is_empty());
        assert!(result.b_factor.is_finite());
    }

    #[test]
    fn test_bidirectional_infinite_b_weight_runs_backward_only() {
        let p = problem("#####\n#@$.#\n#####");
        // With an infinite ratio the forward frontier is never extended
        // past its seed, so a meeting can only occur if the backward
        // search walks all the way back to a root that is itself the
        // (single) forward root.
        let result = search(&p, 1, BWeight::Infinite, 8);
        assert!(result.is_some());
    }

    #[test]
    fn test_solution_matches_plain_weighted_a_star_length() {
        use crate::search::weighted_a_star;
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let forward_only = weighted_a_star(&p, 1).solution().expect("solvable");
        let bidirectional = search(&p, 1, BWeight::Finite(1), 64).expect("solvable");
        assert_eq!(bidirectional.actions.len(), forward_only.len());
    }

    /// spec.md §8 "Bidirectional soundness": replaying the returned action
    /// sequence against the initial state must reach a goal. With an
    /// infinite `b_weight` the forward frontier never extends past its
    /// single seed, so the whole solution lives in the backward tail —
    /// exactly the case that a reversed `path_to` walk corrupts whenever
    /// that tail is longer than one action.
    #[test]
    fn test_bidirectional_soundness_replay_reaches_goal() {
        use crate::problem::SearchProblem;
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let result = search(&p, 1, BWeight::Infinite, 64).expect("solvable");
        assert!(result.actions.len() > 1, "need a multi-action backward tail to exercise the bug");

        let mut state = p.initial().clone();
        for action in result.actions {
            state = p.result(&state, action);
        }
        assert!(p.is_goal(&state));
    }

    #[test]
    fn test_bidirectional_soundness_replay_reaches_goal_finite_weight() {
        use crate::problem::SearchProblem;
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let result = search(&p, 3, BWeight::Finite(4), 64).expect("solvable");

        let mut state = p.initial().clone();
        for action in result.actions {
            state = p.result(&state, action);
        }
        assert!(p.is_goal(&state));
    }
}

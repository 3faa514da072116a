//! The generic best-first search skeleton (spec.md §4.4) and the five
//! concrete strategies it specializes into: BFS, DFS, Dijkstra, Greedy, and
//! weighted A*. Grounded on `original_source/sealgo/best_first_search.py`
//! and `iterative_deepening.py` — the Python base class exposes a single
//! `eval_f(g, h)` hook that subclasses override; here that hook is a plain
//! closure/enum match instead of subclassing, since Rust has no virtual
//! dispatch story as lightweight as Python's.

use std::collections::HashMap;

use crate::pqueue::PriorityQueue;
use crate::problem::{HeuristicSearchProblem, SearchProblem};

/// A search strategy: how to turn `(g, h)` into a priority, or whether to
/// run depth-first instead of priority-ordered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Priority = g. Explores in non-decreasing path-cost order; identical
    /// to Dijkstra under unit costs, kept distinct because a `Strategy`
    /// value documents search *intent* at the call site.
    Bfs,
    /// Depth-first: a LIFO frontier rather than a priority queue.
    Dfs,
    /// Priority = g. Requires no heuristic.
    Dijkstra,
    /// Priority = h. Ignores path cost so far entirely.
    Greedy,
    /// Priority = g + weight * h. `weight == 1` is plain A*; larger
    /// weights bias toward the heuristic (used by the bidirectional
    /// driver's backward search, spec.md §4.5.2).
    WeightedAStar { weight: u32 },
}

/// The outcome of a single best-first run: enough to reconstruct a path to
/// any discovered state and to report branching-factor telemetry.
pub struct SearchOutcome<S, M> {
    /// `None` for a root (one of the problem's initial states); `Some((parent,
    /// action))` otherwise. See `problem.rs`'s module doc for why this
    /// replaces a `Stay`-sentinel action on the predecessor map itself.
    pub predecessors: HashMap<S, Option<(S, M)>>,
    pub goal: Option<S>,
    pub expanded: usize,
}

impl<S: Clone + Eq + std::hash::Hash, M: Clone> SearchOutcome<S, M> {
    /// Walk `predecessors` from `state` back to a root, returning the
    /// actions in the order they were taken (root-to-`state`).
    pub fn path_to(&self, state: &S) -> Vec<M> {
        let mut actions = Vec::new();
        let mut current = state.clone();
        while let Some(Some((parent, action))) = self.predecessors.get(&current) {
            actions.push(action.clone());
            current = parent.clone();
        }
        actions.reverse();
        actions
    }

    pub fn solution(&self) -> Option<Vec<M>> {
        self.goal.as_ref().map(|g| self.path_to(g))
    }
}

/// Run best-first search with an explicit `eval_f(g, h) -> priority`.
/// `h` is always `0` when `heuristic` is `None` (BFS/DFS/Dijkstra).
fn run<P>(
    problem: &P,
    heuristic: Option<&dyn Fn(&P::State) -> u32>,
    strategy: Strategy,
) -> SearchOutcome<P::State, P::Move>
where
    P: SearchProblem,
{
    let h_of = |s: &P::State| heuristic.map(|f| f(s)).unwrap_or(0);

    let mut predecessors: HashMap<P::State, Option<(P::State, P::Move)>> = HashMap::new();
    let mut g_cost: HashMap<P::State, u32> = HashMap::new();

    let roots = problem.initial_states();
    for root in &roots {
        predecessors.entry(root.clone()).or_insert(None);
        g_cost.insert(root.clone(), 0);
    }

    let mut expanded = 0usize;

    if strategy == Strategy::Dfs {
        let mut stack: Vec<P::State> = roots.clone();
        while let Some(state) = stack.pop() {
            if problem.is_goal(&state) {
                return SearchOutcome {
                    predecessors,
                    goal: Some(state),
                    expanded,
                };
            }
            expanded += 1;
            let g = g_cost[&state];
            for action in problem.actions(&state) {
                let next = problem.result(&state, action.clone());
                let next_g = g + problem.action_cost(&state, action.clone());
                if g_cost.get(&next).is_none_or(|&existing| next_g < existing) {
                    g_cost.insert(next.clone(), next_g);
                    predecessors.insert(next.clone(), Some((state.clone(), action)));
                    stack.push(next);
                }
            }
        }
        return SearchOutcome {
            predecessors,
            goal: None,
            expanded,
        };
    }

    let mut frontier: PriorityQueue<P::State> = PriorityQueue::new();
    for root in &roots {
        let priority = eval_priority(strategy, 0, h_of(root));
        frontier.push(priority, root.clone());
    }

    let mut closed: HashMap<P::State, u32> = HashMap::new();

    while let Some(state) = frontier.pop_min() {
        let g = g_cost[&state];
        if closed.get(&state).is_some_and(|&best| best <= g) {
            continue;
        }
        closed.insert(state.clone(), g);

        if problem.is_goal(&state) {
            return SearchOutcome {
                predecessors,
                goal: Some(state),
                expanded,
            };
        }
        expanded += 1;

        for action in problem.actions(&state) {
            let next = problem.result(&state, action.clone());
            let next_g = g + problem.action_cost(&state, action.clone());
            let better = g_cost.get(&next).is_none_or(|&existing| next_g < existing);
            if better {
                g_cost.insert(next.clone(), next_g);
                predecessors.insert(next.clone(), Some((state.clone(), action)));
                let priority = eval_priority(strategy, next_g, h_of(&next));
                frontier.push(priority, next);
            }
        }
    }

    SearchOutcome {
        predecessors,
        goal: None,
        expanded,
    }
}

fn eval_priority(strategy: Strategy, g: u32, h: u32) -> usize {
    match strategy {
        Strategy::Bfs | Strategy::Dijkstra => g as usize,
        Strategy::Greedy => h as usize,
        Strategy::WeightedAStar { weight } => (g + weight.saturating_mul(h)) as usize,
        Strategy::Dfs => unreachable!("Dfs runs through the stack path in `run`"),
    }
}

pub fn bfs<P: SearchProblem>(problem: &P) -> SearchOutcome<P::State, P::Move> {
    run(problem, None, Strategy::Bfs)
}

pub fn dfs<P: SearchProblem>(problem: &P) -> SearchOutcome<P::State, P::Move> {
    run(problem, None, Strategy::Dfs)
}

pub fn dijkstra<P: SearchProblem>(problem: &P) -> SearchOutcome<P::State, P::Move> {
    run(problem, None, Strategy::Dijkstra)
}

pub fn greedy<P: HeuristicSearchProblem>(problem: &P) -> SearchOutcome<P::State, P::Move> {
    let h = |s: &P::State| problem.heuristic(s);
    run(problem, Some(&h), Strategy::Greedy)
}

pub fn weighted_a_star<P: HeuristicSearchProblem>(
    problem: &P,
    weight: u32,
) -> SearchOutcome<P::State, P::Move> {
    let h = |s: &P::State| problem.heuristic(s);
    run(problem, Some(&h), Strategy::WeightedAStar { weight })
}

/// Iterative deepening: repeated depth-bounded DFS, depth bound growing by
/// one each round, until a goal is found or `max_depth` is exceeded.
/// Grounded on `original_source/sealgo/iterative_deepening.py`.
pub fn iterative_deepening<P: SearchProblem>(
    problem: &P,
    max_depth: u32,
) -> SearchOutcome<P::State, P::Move> {
    for depth_limit in 0..=max_depth {
        let mut predecessors: HashMap<P::State, Option<(P::State, P::Move)>> = HashMap::new();
        let mut expanded = 0usize;
        let roots = problem.initial_states();
        for root in &roots {
            predecessors.entry(root.clone()).or_insert(None);
        }
        for root in &roots {
            if let Some(goal) = depth_limited_dfs(problem, root, depth_limit, &mut predecessors, &mut expanded) {
                return SearchOutcome {
                    predecessors,
                    goal: Some(goal),
                    expanded,
                };
            }
        }
    }
    SearchOutcome {
        predecessors: HashMap::new(),
        goal: None,
        expanded: 0,
    }
}

fn depth_limited_dfs<P: SearchProblem>(
    problem: &P,
    state: &P::State,
    depth_left: u32,
    predecessors: &mut HashMap<P::State, Option<(P::State, P::Move)>>,
    expanded: &mut usize,
) -> Option<P::State> {
    if problem.is_goal(state) {
        return Some(state.clone());
    }
    if depth_left == 0 {
        return None;
    }
    *expanded += 1;
    for action in problem.actions(state) {
        let next = problem.result(state, action.clone());
        if !predecessors.contains_key(&next) {
            predecessors.insert(next.clone(), Some((state.clone(), action)));
            if let Some(goal) = depth_limited_dfs(problem, &next, depth_left - 1, predecessors, expanded) {
                return Some(goal);
            }
        }
    }
    None
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
    fn test_bfs_solves_trivial_level() {
        let p = problem("#####\n#@$.#\n#####");
        let outcome = bfs(&p);
        let solution = outcome.solution().expect("solvable");
        assert_eq!(solution.len(), 1);
    }

    #[test]
    fn test_weighted_a_star_solves_trivial_level() {
        let p = problem("#####\n#@$.#\n#####");
        let outcome = weighted_a_star(&p, 2);
        assert!(outcome.solution().is_some());
    }

    #[test]
    fn test_greedy_finds_a_solution() {
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let outcome = greedy(&p);
        assert!(outcome.solution().is_some());
    }

    #[test]
    fn test_dfs_finds_a_solution() {
        let p = problem("#####\n#@$.#\n#####");
        let outcome = dfs(&p);
        assert!(outcome.solution().is_some());
    }

    #[test]
    fn test_iterative_deepening_finds_shallow_solution() {
        let p = problem("#####\n#@$.#\n#####");
        let outcome = iterative_deepening(&p, 10);
        let solution = outcome.solution().expect("solvable within bound");
        assert_eq!(solution.len(), 1);
    }

    #[test]
    fn test_iterative_deepening_respects_depth_bound() {
        let p = problem("#######\n#@$ $.#\n#  .  #\n#######");
        let outcome = iterative_deepening(&p, 0);
        assert!(outcome.solution().is_none());
    }
}

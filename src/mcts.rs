//! Monte Carlo tree search (UCT) over a `SearchProblem`. An optional
//! auxiliary search component — never invoked by the bidirectional driver
//! or the benchmark harness, which both use weighted A* exclusively.
//! Grounded on `original_source/sealgo/mcts.py`, translated from a
//! parent-pointer object graph into an arena of `Node`s addressed by index
//! (Rust has no natural parent-pointer graph without `Rc<RefCell<_>>`
//! overhead; the arena-of-indices layout is the pattern other example
//! repos' MCTS implementations use, e.g. `thomasmarsh-mcts`).
//!
//! One deliberate deviation from the source: `default_rollout_policy`
//! there returns `action_cost` of a sentinel terminal "stay" step as the
//! reward, which is a constant under this crate's uniform action costs and
//! would make UCT unable to distinguish any two rollouts. Here the reward
//! is `-(rollout length)`, so shorter paths to the goal are preferred and
//! failed rollouts (no goal reached within the step cap) score the worst —
//! the natural objective for "find a short solution", which is what this
//! component is for.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::problem::SearchProblem;

struct Node<S, M> {
    state: S,
    parent: Option<usize>,
    incoming_action: Option<M>,
    children: HashMap<M, usize>,
    visits: u32,
    total_reward: f64,
    is_terminal: bool,
}

/// How long / how many iterations to run before returning the current best
/// line.
pub enum Budget {
    Iterations(u32),
    Time(Duration),
}

pub struct Mcts<'p, P: SearchProblem> {
    problem: &'p P,
    exploration_constant: f64,
    rollout_cap: u32,
}

impl<'p, P> Mcts<'p, P>
where
    P: SearchProblem,
    P::Move: std::hash::Hash + Eq,
{
    pub fn new(problem: &'p P) -> Self {
        Mcts {
            problem,
            exploration_constant: std::f64::consts::FRAC_1_SQRT_2,
            rollout_cap: 500,
        }
    }

    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Run the search under `budget`, returning the action sequence to the
    /// best child of the root found so far (empty if the root itself has
    /// no children, e.g. a zero-iteration budget).
    pub fn search(&self, budget: Budget, rng: &mut impl Rng) -> Vec<P::Move> {
        let root_state = self
            .problem
            .initial_states()
            .into_iter()
            .next()
            .expect("problem has at least one initial state");

        let mut arena: Vec<Node<P::State, P::Move>> = vec![Node {
            is_terminal: self.problem.is_goal(&root_state),
            state: root_state,
            parent: None,
            incoming_action: None,
            children: HashMap::new(),
            visits: 0,
            total_reward: 0.0,
        }];

        match budget {
            Budget::Iterations(n) => {
                for _ in 0..n {
                    self.execute_round(&mut arena, 0, rng);
                }
            }
            Budget::Time(limit) => {
                let deadline = Instant::now() + limit;
                while Instant::now() < deadline {
                    self.execute_round(&mut arena, 0, rng);
                }
            }
        }

        let Some(best) = self.best_child(&arena, 0, 0.0, rng) else {
            return Vec::new();
        };
        reconstruct_path(&arena, best)
    }

    fn execute_round(&self, arena: &mut Vec<Node<P::State, P::Move>>, root: usize, rng: &mut impl Rng) {
        let leaf = self.select(arena, root, rng);
        let reward = self.rollout(&arena[leaf].state, rng);
        self.backpropagate(arena, leaf, reward);
    }

    fn select(&self, arena: &mut Vec<Node<P::State, P::Move>>, mut node: usize, rng: &mut impl Rng) -> usize {
        loop {
            if arena[node].is_terminal {
                return node;
            }
            let actions = self.problem.actions(&arena[node].state);
            if arena[node].children.len() < actions.len() {
                return self.expand(arena, node, &actions);
            }
            match self.best_child(arena, node, self.exploration_constant, rng) {
                Some(next) => node = next,
                None => return node,
            }
        }
    }

    fn expand(&self, arena: &mut Vec<Node<P::State, P::Move>>, node: usize, actions: &[P::Move]) -> usize {
        for action in actions {
            if arena[node].children.contains_key(action) {
                continue;
            }
            let next_state = self.problem.result(&arena[node].state, action.clone());
            let is_terminal = self.problem.is_goal(&next_state);
            let child_idx = arena.len();
            arena.push(Node {
                state: next_state,
                parent: Some(node),
                incoming_action: Some(action.clone()),
                children: HashMap::new(),
                visits: 0,
                total_reward: 0.0,
                is_terminal,
            });
            arena[node].children.insert(action.clone(), child_idx);
            return child_idx;
        }
        unreachable!("expand called with no unexpanded action available")
    }

    /// Uniform-random rollout to a goal (or `self.rollout_cap` steps,
    /// whichever comes first); returns `-(steps taken)`.
    fn rollout(&self, start: &P::State, rng: &mut impl Rng) -> f64 {
        let mut state = start.clone();
        for step in 0..self.rollout_cap {
            if self.problem.is_goal(&state) {
                return -(step as f64);
            }
            let actions = self.problem.actions(&state);
            if actions.is_empty() {
                return -(self.rollout_cap as f64);
            }
            let action = actions[rng.gen_range(0..actions.len())].clone();
            state = self.problem.result(&state, action);
        }
        -(self.rollout_cap as f64)
    }

    fn backpropagate(&self, arena: &mut [Node<P::State, P::Move>], mut node: usize, reward: f64) {
        loop {
            arena[node].visits += 1;
            arena[node].total_reward += reward;
            match arena[node].parent {
                Some(parent) => node = parent,
                None => break,
            }
        }
    }

    fn best_child(
        &self,
        arena: &[Node<P::State, P::Move>],
        node: usize,
        exploration_value: f64,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        let parent_visits = arena[node].visits.max(1) as f64;
        let mut best_value = f64::NEG_INFINITY;
        let mut best_nodes = Vec::new();

        for &child_idx in arena[node].children.values() {
            let child = &arena[child_idx];
            if child.visits == 0 {
                return Some(child_idx);
            }
            let exploitation = child.total_reward / child.visits as f64;
            let exploration = exploration_value * (2.0 * parent_visits.ln() / child.visits as f64).sqrt();
            let value = exploitation + exploration;
            if value > best_value {
                best_value = value;
                best_nodes.clear();
                best_nodes.push(child_idx);
            } else if value == best_value {
                best_nodes.push(child_idx);
            }
        }

        if best_nodes.is_empty() {
            None
        } else {
            Some(best_nodes[rng.gen_range(0..best_nodes.len())])
        }
    }
}

fn reconstruct_path<S, M: Clone>(arena: &[Node<S, M>], mut node: usize) -> Vec<M> {
    let mut actions = Vec::new();
    while let Some(parent) = arena[node].parent {
        actions.push(arena[node].incoming_action.clone().expect("non-root node has an incoming action"));
        node = parent;
    }
    actions.reverse();
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;
    use crate::sokoban_problem::SokobanProblem;
    use crate::state::SokobanState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn problem(text: &str) -> SokobanProblem {
        let grid = Grid::from_text(text).unwrap();
        SokobanProblem::new(SokobanState::from_grid(&grid))
    }

    #[test]
    fn test_mcts_finds_some_path_on_trivial_level() {
        let p = problem("#####\n#@$.#\n#####");
        let mcts = Mcts::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let actions = mcts.search(Budget::Iterations(200), &mut rng);
        assert!(!actions.is_empty());
    }

    #[test]
    fn test_mcts_zero_iterations_returns_empty() {
        let p = problem("#####\n#@$.#\n#####");
        let mcts = Mcts::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let actions = mcts.search(Budget::Iterations(0), &mut rng);
        assert!(actions.is_empty());
    }
}

//! Local-search variants over a `HeuristicSearchProblem`: plain hill
//! climbing, stochastic hill climbing, first-choice hill climbing,
//! simulated annealing, and random restart. None of these are used by the
//! bidirectional driver or the benchmark harness — they're a reusable
//! building block kept for completeness, the way the teacher keeps
//! `GreedyHeuristic` alongside `HungarianHeuristic` even though only one
//! solver configuration ships. Grounded on
//! `original_source/sealgo/local_search.py`.

use rand::Rng;

use crate::problem::HeuristicSearchProblem;

/// Outcome of a single local-search run: either a solution action sequence
/// or a failure (stuck at a local optimum, ran out of iterations, or the
/// current state has no legal actions).
pub enum LocalSearchOutcome<M> {
    Solved(Vec<M>),
    Failed,
}

impl<M> LocalSearchOutcome<M> {
    pub fn into_solution(self) -> Option<Vec<M>> {
        match self {
            LocalSearchOutcome::Solved(actions) => Some(actions),
            LocalSearchOutcome::Failed => None,
        }
    }
}

/// Plain hill climbing: always take the neighbour with the lowest
/// heuristic value; stop the moment no neighbour improves on the current
/// state (a strict local optimum, including the goal itself).
pub fn hill_climb<P: HeuristicSearchProblem>(problem: &P, max_iter: usize) -> LocalSearchOutcome<P::Move> {
    let mut state = problem
        .initial_states()
        .into_iter()
        .next()
        .expect("problem has at least one initial state");
    let mut solution = Vec::new();

    for _ in 0..max_iter {
        if problem.is_goal(&state) {
            return LocalSearchOutcome::Solved(solution);
        }
        let actions = problem.actions(&state);
        if actions.is_empty() {
            return LocalSearchOutcome::Failed;
        }

        let h_before = problem.heuristic(&state);
        let mut best_action = None;
        let mut best_h = h_before;
        let mut best_state = None;
        for action in actions {
            let next = problem.result(&state, action.clone());
            let h = problem.heuristic(&next);
            if h < best_h {
                best_h = h;
                best_action = Some(action);
                best_state = Some(next);
            }
        }

        match (best_action, best_state) {
            (Some(action), Some(next)) => {
                solution.push(action);
                state = next;
            }
            _ => return LocalSearchOutcome::Failed,
        }
    }
    LocalSearchOutcome::Failed
}

/// An acceptance-probability hook shared by stochastic hill climbing,
/// first-choice hill climbing, and simulated annealing: given `slope =
/// h_after - h_before`, return the probability of taking that move.
pub trait AcceptanceSchedule {
    fn probability(&mut self, slope: i64) -> f64;
}

/// Accept any improving move with probability 1, any non-improving move
/// with a small fixed probability — `original_source/sealgo/local_search.py`'s
/// `StochasticHillClimbing` default.
pub struct StochasticSchedule {
    pub worsening_probability: f64,
}

impl Default for StochasticSchedule {
    fn default() -> Self {
        StochasticSchedule {
            worsening_probability: 0.1,
        }
    }
}

impl AcceptanceSchedule for StochasticSchedule {
    fn probability(&mut self, slope: i64) -> f64 {
        if slope < 0 { 1.0 } else { self.worsening_probability }
    }
}

/// Accept improving moves, reject everything else — `FirstChoiceHillClimbing`
/// is `StochasticHillClimbing` with a zero worsening probability.
pub struct FirstChoiceSchedule;

impl AcceptanceSchedule for FirstChoiceSchedule {
    fn probability(&mut self, slope: i64) -> f64 {
        if slope < 0 { 1.0 } else { 0.0 }
    }
}

/// Simulated annealing: improving moves always accepted; worsening moves
/// accepted with probability `exp(-slope/T)`, where `T` decays
/// geometrically by `alpha` after every decision.
pub struct SimulatedAnnealingSchedule {
    pub temperature: f64,
    pub alpha: f64,
}

impl SimulatedAnnealingSchedule {
    pub fn new(initial_temperature: f64, alpha: f64) -> Self {
        SimulatedAnnealingSchedule {
            temperature: initial_temperature,
            alpha,
        }
    }
}

impl AcceptanceSchedule for SimulatedAnnealingSchedule {
    fn probability(&mut self, slope: i64) -> f64 {
        let p = if slope < 0 {
            1.0
        } else {
            (-(slope as f64) / self.temperature).exp()
        };
        self.temperature *= self.alpha;
        p
    }
}

/// Stochastic hill climbing, parameterized by an `AcceptanceSchedule`: at
/// each step pick a uniformly random action, then accept it with the
/// schedule's probability for that move's slope (otherwise stay put —
/// spec.md's `Action::Stay` sentinel is never produced here since "stay"
/// is represented simply by not advancing `state`/`solution` this round).
pub fn stochastic_hill_climb<P, S>(
    problem: &P,
    max_iter: usize,
    schedule: &mut S,
    rng: &mut impl Rng,
) -> LocalSearchOutcome<P::Move>
where
    P: HeuristicSearchProblem,
    S: AcceptanceSchedule,
{
    let mut state = problem
        .initial_states()
        .into_iter()
        .next()
        .expect("problem has at least one initial state");
    let mut solution = Vec::new();

    for _ in 0..max_iter {
        if problem.is_goal(&state) {
            return LocalSearchOutcome::Solved(solution);
        }
        let actions = problem.actions(&state);
        if actions.is_empty() {
            return LocalSearchOutcome::Failed;
        }

        let action = actions[rng.gen_range(0..actions.len())].clone();
        let next = problem.result(&state, action.clone());
        let slope = problem.heuristic(&next) as i64 - problem.heuristic(&state) as i64;
        let prob = schedule.probability(slope);
        if rng.r#gen::<f64>() < prob {
            solution.push(action);
            state = next;
        }
    }
    LocalSearchOutcome::Failed
}

/// Run `attempt` up to `max_restarts` times, collecting every successful
/// solution found. Each restart is independent — local search from the
/// same initial state with fresh randomness.
pub fn random_restart<M>(
    max_restarts: usize,
    mut attempt: impl FnMut() -> LocalSearchOutcome<M>,
) -> Vec<Vec<M>> {
    let mut solutions = Vec::new();
    for _ in 0..max_restarts {
        if let LocalSearchOutcome::Solved(actions) = attempt() {
            solutions.push(actions);
        }
    }
    solutions
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
    fn test_hill_climb_solves_monotone_level() {
        let p = problem("#####\n#@$.#\n#####");
        let outcome = hill_climb(&p, 100);
        let solution = outcome.into_solution().expect("strictly improving path exists");
        assert_eq!(solution.len(), 1);
    }

    #[test]
    fn test_stochastic_hill_climb_with_first_choice_schedule() {
        let p = problem("#####\n#@$.#\n#####");
        let mut schedule = FirstChoiceSchedule;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let outcome = stochastic_hill_climb(&p, 100, &mut schedule, &mut rng);
        assert!(outcome.into_solution().is_some());
    }

    #[test]
    fn test_random_restart_collects_every_success() {
        let p = problem("#####\n#@$.#\n#####");
        let solutions = random_restart(5, || hill_climb(&p, 100));
        assert_eq!(solutions.len(), 5);
    }
}

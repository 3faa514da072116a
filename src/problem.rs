//! Generic search-problem abstractions. A trait-based translation of
//! `original_source/sealgo/problem.py`'s ABC hierarchy: `SearchProblem`,
//! `HeuristicSearchProblem`, `BiSearchProblem`. Rust has no runtime method
//! overriding, so the bidirectional extension is a second trait a type can
//! implement alongside `SearchProblem`, rather than a problem object
//! monkey-patched at construction time (spec.md §9's note on this; see
//! `bidirectional.rs` for how the driver builds two concrete adapters
//! instead).
//!
//! `SearchProblem` is generic over a `Move` type rather than hard-coding the
//! Sokoban `Action` enum, because the same best-first skeleton in
//! `search.rs` drives both the forward search (moves are `Action`) and the
//! backward search (moves are `BackwardAction`, a direction plus a pull
//! flag). Each search keeps its own `predecessors` map as
//! `HashMap<State, Option<(State, Move)>>` — `None` for a root state. This
//! is the Rust-idiomatic replacement for the source pattern of overloading
//! a single `Action::Stay` variant as "no incoming action": the sentinel
//! lives in the `Option`, not in the move alphabet, so a `Move` type with no
//! natural "do nothing" member (like `BackwardAction`) doesn't need one.

pub trait SearchProblem {
    type State: Clone + Eq + std::hash::Hash + Ord;
    type Move: Clone + Copy + Eq + std::hash::Hash;

    /// The state(s) a search over this problem starts from. A plain forward
    /// problem returns a single state; the bidirectional backward view
    /// returns every synthesized goal state (spec.md §9: unify on a
    /// sequence rather than "list|single").
    fn initial_states(&self) -> Vec<Self::State>;

    /// Legal moves from `state`.
    fn actions(&self, state: &Self::State) -> Vec<Self::Move>;

    /// The state reached by taking `action` from `state`. Must not alias
    /// `state` — always returns a fresh, independently owned value.
    fn result(&self, state: &Self::State, action: Self::Move) -> Self::State;

    fn is_goal(&self, state: &Self::State) -> bool;

    /// Cost of taking `action` from `state`. Constant `1` for Sokoban.
    fn action_cost(&self, _state: &Self::State, _action: Self::Move) -> u32 {
        1
    }
}

/// A `SearchProblem` with an admissible-ish cost estimate to a goal, used by
/// Greedy best-first and weighted A*.
pub trait HeuristicSearchProblem: SearchProblem {
    fn heuristic(&self, state: &Self::State) -> u32;
}

/// The bidirectional extension: a problem that also knows how to search
/// backward from synthesized goal states toward the initial layout.
pub trait BiSearchProblem: HeuristicSearchProblem {
    type BackwardMove: Clone + Copy + Eq + std::hash::Hash;

    /// Up to `k` synthesized canonical goal states. Every returned state
    /// must satisfy `is_goal`.
    fn goal_states(&self, k: usize) -> Vec<Self::State>;

    /// Legal backward actions into `state` (the reverse of `actions`).
    fn actions_to(&self, state: &Self::State) -> Vec<Self::BackwardMove>;

    /// The state from which `action` (interpreted as a backward/undo step)
    /// reaches `state`.
    fn reason(&self, state: &Self::State, action: Self::BackwardMove) -> Self::State;

    /// Symmetric backward heuristic: estimated distance from `state` back
    /// to the initial layout.
    fn re_heuristic(&self, state: &Self::State) -> u32;

    /// The forward-equivalent of a backward move: discards the pull flag,
    /// keeping only the direction (spec.md §4.5.3 — used only during path
    /// reconstruction, never during backward search itself).
    fn forward_equivalent(action: Self::BackwardMove) -> Self::Move;
}

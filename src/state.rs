use std::fmt;

use crate::board::{Grid, Position, Tile};

/// A direction the player can step in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Row/column delta for stepping in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// A forward action. `Stay` is never produced by `SokobanProblem::actions` —
/// it exists only as the sentinel "no incoming action" recorded for root
/// states in a search's predecessor map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Action {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            Action::Stay => None,
        }
    }

    pub fn from_direction(dir: Direction) -> Action {
        match dir {
            Direction::Up => Action::Up,
            Direction::Down => Action::Down,
            Direction::Left => Action::Left,
            Direction::Right => Action::Right,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Stay => write!(f, "Stay"),
            _ => write!(f, "{}", self.direction().unwrap()),
        }
    }
}

/// A backward (undo) action: a direction paired with whether the reverse
/// step drags a box along with it (a "pull").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackwardAction {
    pub direction: Direction,
    pub pull: bool,
}

impl fmt::Display for BackwardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pull {
            write!(f, "{}+pull", self.direction)
        } else {
            write!(f, "{}", self.direction)
        }
    }
}

/// A Sokoban search state: a tile grid plus a cached player position.
///
/// Two states are equal iff their tile arrays are element-wise equal; the
/// derived `Hash`/`Ord` operate over the same tile array, so they are
/// automatically consistent with `Eq` (spec invariant: `s == s' => hash(s)
/// == hash(s')`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SokobanState {
    tiles: Vec<Vec<Tile>>,
    player: Position,
}

impl SokobanState {
    pub fn from_grid(grid: &Grid) -> SokobanState {
        let tiles = grid.tiles().clone();
        let player = locate_player(&tiles).expect("grid validated to have exactly one player");
        SokobanState { tiles, player }
    }

    /// Build a state directly from a tile array and a known player
    /// position, bypassing `Grid`'s parsing/validation. Used by synthesized
    /// states (e.g. `SokobanProblem::goal_states`) that are constructed
    /// in-memory rather than parsed from level text.
    pub fn from_tiles(tiles: Vec<Vec<Tile>>, player: Position) -> SokobanState {
        SokobanState { tiles, player }
    }

    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    pub fn cols(&self) -> usize {
        self.tiles.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn get(&self, pos: Position) -> Tile {
        self.tiles[pos.0][pos.1]
    }

    fn set(&mut self, pos: Position, tile: Tile) {
        self.tiles[pos.0][pos.1] = tile;
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.get(pos) == Tile::Wall
    }

    pub fn is_box(&self, pos: Position) -> bool {
        matches!(self.get(pos), Tile::Box | Tile::GoalBox)
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.get(pos).is_goal_cell()
    }

    pub fn is_space(&self, pos: Position) -> bool {
        matches!(self.get(pos), Tile::Space | Tile::Goal)
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        self.is_wall(pos) || self.is_box(pos)
    }

    /// True when no `Box` tile remains — every box sits on a goal.
    pub fn is_goal_state(&self) -> bool {
        !self.tiles.iter().flatten().any(|&t| t == Tile::Box)
    }

    pub fn box_positions(&self) -> Vec<Position> {
        self.positions_where(|t| matches!(t, Tile::Box | Tile::GoalBox))
    }

    pub fn goal_positions(&self) -> Vec<Position> {
        self.positions_where(Tile::is_goal_cell)
    }

    fn positions_where(&self, pred: impl Fn(Tile) -> bool) -> Vec<Position> {
        let mut out = Vec::new();
        for (r, row) in self.tiles.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                if pred(tile) {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// Step `pos` one cell in `dir`, returning `None` at the grid boundary.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let nr = pos.0 as isize + dr;
        let nc = pos.1 as isize + dc;
        if nr < 0 || nc < 0 || nr as usize >= self.rows() || nc as usize >= self.cols() {
            None
        } else {
            Some((nr as usize, nc as usize))
        }
    }

    /// Forward legality (spec §4.2.3): the neighbour must not be a wall, and
    /// if it holds a box, the cell beyond it must be free to receive the
    /// push.
    pub fn is_legal_move(&self, dir: Direction) -> bool {
        let Some(next) = self.step(self.player, dir) else {
            return false;
        };
        if self.is_wall(next) {
            return false;
        }
        if self.is_box(next) {
            let Some(beyond) = self.step(next, dir) else {
                return false;
            };
            if self.is_wall(beyond) || self.is_box(beyond) {
                return false;
            }
        }
        true
    }

    pub fn legal_moves(&self) -> Vec<Direction> {
        ALL_DIRECTIONS
            .iter()
            .copied()
            .filter(|&d| self.is_legal_move(d))
            .collect()
    }

    /// Apply a push/walk in `dir` (spec §4.2.1). Caller must have already
    /// checked `is_legal_move` — walls and unpushable boxes are not
    /// rejected here.
    pub fn p_move(&mut self, dir: Direction) {
        let (dr, dc) = dir.delta();
        let next = self.step(self.player, dir).expect("caller checked legality");

        if self.is_box(next) {
            self.push(next, dr, dc);
        }

        let old_leave = if self.is_goal(self.player) {
            Tile::Goal
        } else {
            Tile::Space
        };
        self.set(self.player, old_leave);

        let new_enter = if self.is_goal(next) {
            Tile::GoalPlayer
        } else {
            Tile::Player
        };
        self.set(next, new_enter);
        self.player = next;
    }

    fn push(&mut self, box_pos: Position, dr: isize, dc: isize) {
        let beyond = (
            (box_pos.0 as isize + dr) as usize,
            (box_pos.1 as isize + dc) as usize,
        );
        let leave = if self.is_goal(box_pos) {
            Tile::Goal
        } else {
            Tile::Space
        };
        self.set(box_pos, leave);
        let enter = if self.is_goal(beyond) {
            Tile::GoalBox
        } else {
            Tile::Box
        };
        self.set(beyond, enter);
    }

    /// Backward legality for direction `dir` (spec §4.2.4). Returns
    /// `(plain_legal, pull_legal)`.
    pub fn backward_legality(&self, dir: Direction) -> (bool, bool) {
        let (dr, dc) = dir.delta();
        let Some(came_from) = self.step(self.player, dir_negated(dir)) else {
            return (false, false);
        };
        let plain = !self.is_blocked(came_from);
        if !plain {
            return (false, false);
        }

        let forward_of_player = (
            (self.player.0 as isize + dr) as usize,
            (self.player.1 as isize + dc) as usize,
        );
        let pull = self.in_bounds(forward_of_player)
            && self.is_box(forward_of_player)
            && self
                .step(forward_of_player, dir)
                .map(|beyond| !self.is_blocked(beyond))
                .unwrap_or(false);

        (plain, pull)
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.0 < self.rows() && pos.1 < self.cols()
    }

    pub fn legal_backward_actions(&self) -> Vec<BackwardAction> {
        let mut out = Vec::new();
        for &dir in &ALL_DIRECTIONS {
            let (plain, pull) = self.backward_legality(dir);
            if plain {
                out.push(BackwardAction {
                    direction: dir,
                    pull: false,
                });
            }
            if pull {
                out.push(BackwardAction {
                    direction: dir,
                    pull: true,
                });
            }
        }
        out
    }

    /// Apply the inverse of a forward move in `dir` (spec §4.2.2). The
    /// player steps back to where it came from; if `pull` is set, a box
    /// sitting in front of the player is dragged along into the player's
    /// former cell.
    pub fn p_undo(&mut self, dir: Direction, pull: bool) {
        let came_from = self
            .step(self.player, dir_negated(dir))
            .expect("caller checked backward legality");

        if pull {
            let (dr, dc) = dir.delta();
            let box_pos = (
                (self.player.0 as isize + dr) as usize,
                (self.player.1 as isize + dc) as usize,
            );
            let box_leave = if self.is_goal(box_pos) {
                Tile::Goal
            } else {
                Tile::Space
            };
            self.set(box_pos, box_leave);
            let box_enter = if self.is_goal(self.player) {
                Tile::GoalBox
            } else {
                Tile::Box
            };
            self.set(self.player, box_enter);
        } else {
            let leave = if self.is_goal(self.player) {
                Tile::Goal
            } else {
                Tile::Space
            };
            self.set(self.player, leave);
        }

        let enter = if self.is_goal(came_from) {
            Tile::GoalPlayer
        } else {
            Tile::Player
        };
        self.set(came_from, enter);
        self.player = came_from;
    }

    /// Iteratively prune boxes that have at least one free push axis;
    /// survivors (boxes that never get pruned) are counted as deadlocked.
    /// See `deadlock.rs` for the full algorithm and rationale.
    pub fn deadlock_count(&self) -> usize {
        crate::deadlock::deadlock_count(self)
    }

    pub fn can_push(&self, pos: Position, dir: Direction) -> bool {
        let forward = self.step(pos, dir);
        let backward = self.step(pos, dir_negated(dir));
        match (forward, backward) {
            (Some(f), Some(b)) => !self.is_blocked(f) && !self.is_blocked(b),
            _ => false,
        }
    }
}

fn dir_negated(dir: Direction) -> Direction {
    match dir {
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
    }
}

fn locate_player(tiles: &[Vec<Tile>]) -> Option<Position> {
    for (r, row) in tiles.iter().enumerate() {
        for (c, &tile) in row.iter().enumerate() {
            if matches!(tile, Tile::Player | Tile::GoalPlayer) {
                return Some((r, c));
            }
        }
    }
    None
}

impl fmt::Display for SokobanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.tiles {
            for &tile in row {
                let ch = match tile {
                    Tile::Wall => '#',
                    Tile::Box => '$',
                    Tile::Goal => '.',
                    Tile::Player => '@',
                    Tile::GoalBox => '+',
                    Tile::GoalPlayer => '-',
                    Tile::Space => ' ',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> SokobanState {
        let grid = Grid::from_text(text).unwrap();
        SokobanState::from_grid(&grid)
    }

    #[test]
    fn test_push_moves_box_and_player() {
        let mut s = state("#####\n#@$.#\n#####");
        assert!(s.is_legal_move(Direction::Right));
        s.p_move(Direction::Right);
        assert_eq!(s.player(), (1, 2));
        assert!(s.get((1, 3)) == Tile::GoalBox);
        assert!(s.is_goal_state());
    }

    #[test]
    fn test_walk_without_box() {
        let mut s = state("#####\n#@  #\n#####");
        s.p_move(Direction::Right);
        assert_eq!(s.player(), (1, 2));
        assert_eq!(s.get((1, 1)), Tile::Space);
    }

    #[test]
    fn test_illegal_push_into_wall() {
        let s = state("####\n#@$#\n####");
        assert!(!s.is_legal_move(Direction::Right));
    }

    #[test]
    fn test_push_reversibility() {
        let mut s = state("#######\n#@$ $.#\n#  .  #\n#######");
        let before = s.clone();
        s.p_move(Direction::Right);
        // the push dragged the player behind the box; undo should restore
        // the exact prior state.
        s.p_undo(Direction::Right, true);
        assert_eq!(s, before);
    }

    #[test]
    fn test_walk_undo_without_pull() {
        let mut s = state("#####\n#@  #\n#####");
        let before = s.clone();
        s.p_move(Direction::Right);
        s.p_undo(Direction::Right, false);
        assert_eq!(s, before);
    }

    #[test]
    fn test_hash_eq_consistency() {
        let a = state("#####\n#@$.#\n#####");
        let b = a.clone();
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(a, b);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_backward_legality_pull() {
        let mut s = state("#######\n#@$ $.#\n#  .  #\n#######");
        s.p_move(Direction::Right);
        let (plain, pull) = s.backward_legality(Direction::Right);
        assert!(plain);
        assert!(pull);
    }

    #[test]
    fn test_deadlock_corner_box() {
        let s = state("#####\n#$ @#\n#.  #\n#####");
        assert!(s.deadlock_count() >= 1);
    }
}

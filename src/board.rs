use std::fmt;

use crate::errors::SokobanError;

/// A single cell of a Sokoban level.
///
/// `GoalBox` and `GoalPlayer` are overlay tiles: a box or player sitting on
/// top of a goal cell. There is no separate goal layer — a cell is in
/// exactly one of these seven states at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tile {
    Wall,
    Box,
    Goal,
    Player,
    GoalBox,
    GoalPlayer,
    Space,
}

impl Tile {
    /// True for Goal, GoalBox, GoalPlayer.
    pub fn is_goal_cell(self) -> bool {
        matches!(self, Tile::Goal | Tile::GoalBox | Tile::GoalPlayer)
    }

    /// True for Wall, Box, GoalBox — cells that block a push through them.
    pub fn is_blocker_for_push(self) -> bool {
        matches!(self, Tile::Wall | Tile::Box | Tile::GoalBox)
    }

    fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '#' => Some(Tile::Wall),
            '$' => Some(Tile::Box),
            '.' => Some(Tile::Goal),
            '@' => Some(Tile::Player),
            '+' => Some(Tile::GoalBox),
            '-' => Some(Tile::GoalPlayer),
            ' ' => Some(Tile::Space),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Box => '$',
            Tile::Goal => '.',
            Tile::Player => '@',
            Tile::GoalBox => '+',
            Tile::GoalPlayer => '-',
            Tile::Space => ' ',
        }
    }
}

/// Row-major coordinates into a `Grid`/`SokobanState`: `(row, col)`.
pub type Position = (usize, usize);

/// The static board layout loaded from a level file: tile alphabet, bounds,
/// and pure coordinate queries. Bounds are not checked here — callers must
/// stay within `[0, rows) x [0, cols)`, which holds for every caller in this
/// crate because levels are ringed by walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Parse an ASCII level. Each line is a row; a trailing newline is
    /// stripped. Short rows are *not* padded — a ragged level is a
    /// `BadLevelFormat` error, since level files are assumed rectangular.
    pub fn from_text(text: &str) -> Result<Grid, SokobanError> {
        let text = text.strip_suffix('\n').unwrap_or(text);
        let lines: Vec<&str> = text.lines().collect();

        if lines.is_empty() {
            return Err(SokobanError::BadLevelFormat("empty level".to_string()));
        }

        let cols = lines[0].chars().count();
        let rows = lines.len();

        let mut tiles = Vec::with_capacity(rows);
        for (y, line) in lines.iter().enumerate() {
            let row: Vec<Tile> = line
                .chars()
                .map(Tile::from_char)
                .collect::<Option<Vec<Tile>>>()
                .ok_or_else(|| {
                    SokobanError::BadLevelFormat(format!("unknown character in row {}", y))
                })?;
            if row.len() != cols {
                return Err(SokobanError::BadLevelFormat(format!(
                    "row {} has width {}, expected {}",
                    y,
                    row.len(),
                    cols
                )));
            }
            tiles.push(row);
        }

        let grid = Grid { tiles, rows, cols };
        grid.validate()?;
        Ok(grid)
    }

    fn validate(&self) -> Result<(), SokobanError> {
        let mut player_count = 0;
        let mut box_count = 0;
        let mut goal_count = 0;
        for row in &self.tiles {
            for &tile in row {
                if matches!(tile, Tile::Player | Tile::GoalPlayer) {
                    player_count += 1;
                }
                if matches!(tile, Tile::Box | Tile::GoalBox) {
                    box_count += 1;
                }
                if tile.is_goal_cell() {
                    goal_count += 1;
                }
            }
        }
        if player_count != 1 {
            return Err(SokobanError::BadLevelFormat(format!(
                "expected exactly one player, found {}",
                player_count
            )));
        }
        if box_count == 0 {
            return Err(SokobanError::BadLevelFormat(
                "level has no boxes".to_string(),
            ));
        }
        if goal_count == 0 {
            return Err(SokobanError::BadLevelFormat(
                "level has no goal cells".to_string(),
            ));
        }
        if box_count != goal_count {
            return Err(SokobanError::BadLevelFormat(format!(
                "box count ({}) does not match goal count ({})",
                box_count, goal_count
            )));
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, pos: Position) -> Tile {
        self.tiles[pos.0][pos.1]
    }

    pub fn set(&mut self, pos: Position, tile: Tile) {
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

    pub fn is_player(&self, pos: Position) -> bool {
        matches!(self.get(pos), Tile::Player | Tile::GoalPlayer)
    }

    pub fn tiles(&self) -> &Vec<Vec<Tile>> {
        &self.tiles
    }

    pub fn into_tiles(self) -> Vec<Vec<Tile>> {
        self.tiles
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.tiles {
            for &tile in row {
                write!(f, "{}", tile.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trivial_level() {
        let grid = Grid::from_text("#####\n#@$.#\n#####").unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 5);
        assert!(grid.is_player((1, 1)));
        assert!(grid.is_box((1, 2)));
        assert!(grid.is_goal((1, 3)));
        assert!(grid.is_wall((0, 0)));
    }

    #[test]
    fn test_goal_box_and_goal_player_overlays() {
        let grid = Grid::from_text("####\n#-+#\n####").unwrap();
        assert!(grid.is_player((1, 1)));
        assert!(grid.is_goal((1, 1)));
        assert!(grid.is_box((1, 2)));
        assert!(grid.is_goal((1, 2)));
    }

    #[test]
    fn test_unknown_character_is_bad_level_format() {
        let err = Grid::from_text("#####\n#@$?#\n#####").unwrap_err();
        assert!(matches!(err, SokobanError::BadLevelFormat(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Grid::from_text("#####\n#@$.\n#####").unwrap_err();
        assert!(matches!(err, SokobanError::BadLevelFormat(_)));
    }

    #[test]
    fn test_no_player_rejected() {
        let err = Grid::from_text("#####\n#.$.#\n#####").unwrap_err();
        assert!(matches!(err, SokobanError::BadLevelFormat(_)));
    }

    #[test]
    fn test_box_goal_count_mismatch_rejected() {
        let err = Grid::from_text("######\n#@$$.#\n######").unwrap_err();
        assert!(matches!(err, SokobanError::BadLevelFormat(_)));
    }

    #[test]
    fn test_display_round_trips() {
        let text = "#####\n#@$.#\n#####\n";
        let grid = Grid::from_text(text).unwrap();
        assert_eq!(grid.to_string(), text);
    }
}

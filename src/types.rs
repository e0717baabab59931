//! Core types shared across the engine
//! This module contains pure data types with no external dependencies

/// Board coordinate. Signed so that out-of-bounds probes (`x - 1` at the
/// left edge) stay representable; `Board::tile_at` returns `None` for them.
pub type Coord = i32;

/// Random-zap budget: a Yellow special destroys up to this many tiles.
pub const ZAP_BUDGET: u32 = 5;
/// Bound on random placement attempts for the zap search (liveness guard
/// on sparse or mostly-matched boards, not a correctness timeout).
pub const ZAP_MAX_ATTEMPTS: u32 = 200;

/// A group with this many white cubes triggers the full board destruction.
pub const WHITE_BOARD_CLEAR_COUNT: usize = 3;

/// Group-priority score weights: obstacles adjacent to the group dominate,
/// then size-5, then contained specials, then plain size.
pub const SCORE_PER_ADJACENT_OBSTACLE: u32 = 1000;
pub const SCORE_FIVE_GROUP: u32 = 500;
pub const SCORE_HAS_SPECIAL: u32 = 300;
pub const SCORE_FOUR_GROUP: u32 = 100;
pub const SCORE_THREE_GROUP: u32 = 10;

/// Cube colors. White is the top-tier color with its own effect rules;
/// refills only ever draw from the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeColor {
    Red,
    Yellow,
    Blue,
    Black,
    White,
}

impl CubeColor {
    /// Colors eligible for random refill spawns.
    pub const SPAWNABLE: [CubeColor; 4] = [
        CubeColor::Red,
        CubeColor::Yellow,
        CubeColor::Blue,
        CubeColor::Black,
    ];

    /// The special effect a 4-match of this color produces.
    /// White never promotes (its groups resolve through the white rules).
    pub fn special_kind(self) -> Option<SpecialKind> {
        match self {
            CubeColor::Red => Some(SpecialKind::RowClear),
            CubeColor::Blue => Some(SpecialKind::ColumnClear),
            CubeColor::Black => Some(SpecialKind::AreaClear),
            CubeColor::Yellow => Some(SpecialKind::RandomZap),
            CubeColor::White => None,
        }
    }

    pub fn is_white(self) -> bool {
        self == CubeColor::White
    }

    /// Convert to lowercase string
    pub fn as_str(self) -> &'static str {
        match self {
            CubeColor::Red => "red",
            CubeColor::Yellow => "yellow",
            CubeColor::Blue => "blue",
            CubeColor::Black => "black",
            CubeColor::White => "white",
        }
    }
}

/// Board-wide clear effects carried by special cubes, tied to their color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    RowClear,
    ColumnClear,
    AreaClear,
    RandomZap,
}

/// Non-matchable blockers. `Prism` falls under gravity; `Stone` does not,
/// and pieces above a stone rest on it instead of falling past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Prism,
    Stone,
}

impl ObstacleKind {
    /// Whether this obstacle compacts downward over empty cells.
    pub fn falls(self) -> bool {
        match self {
            ObstacleKind::Prism => true,
            ObstacleKind::Stone => false,
        }
    }

    /// Hit points when freshly placed from a level layout.
    pub fn base_hit_points(self) -> u8 {
        match self {
            ObstacleKind::Prism => 1,
            ObstacleKind::Stone => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObstacleKind::Prism => "prism",
            ObstacleKind::Stone => "stone",
        }
    }
}

/// Which axis (or both) a piece matched along in the last scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOrientation {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl MatchOrientation {
    /// Combine tags when a piece is touched by both axis runs.
    pub fn merge(self, other: MatchOrientation) -> MatchOrientation {
        use MatchOrientation::{Both, Horizontal, None, Vertical};
        match (self, other) {
            (None, o) | (o, None) => o,
            (Horizontal, Horizontal) => Horizontal,
            (Vertical, Vertical) => Vertical,
            _ => Both,
        }
    }
}

/// One cell of a level layout, as handed over by the level loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileToken {
    Empty,
    Cube(CubeColor),
    Obstacle(ObstacleKind),
}

impl TileToken {
    /// Parse a single layout character. Unknown characters yield `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            '.' => Some(TileToken::Empty),
            'r' => Some(TileToken::Cube(CubeColor::Red)),
            'y' => Some(TileToken::Cube(CubeColor::Yellow)),
            'b' => Some(TileToken::Cube(CubeColor::Blue)),
            'k' => Some(TileToken::Cube(CubeColor::Black)),
            'w' => Some(TileToken::Cube(CubeColor::White)),
            'p' => Some(TileToken::Obstacle(ObstacleKind::Prism)),
            's' => Some(TileToken::Obstacle(ObstacleKind::Stone)),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TileToken::Empty => '.',
            TileToken::Cube(CubeColor::Red) => 'r',
            TileToken::Cube(CubeColor::Yellow) => 'y',
            TileToken::Cube(CubeColor::Blue) => 'b',
            TileToken::Cube(CubeColor::Black) => 'k',
            TileToken::Cube(CubeColor::White) => 'w',
            TileToken::Obstacle(ObstacleKind::Prism) => 'p',
            TileToken::Obstacle(ObstacleKind::Stone) => 's',
        }
    }
}

/// Level-target key: progress is tracked per cube color or obstacle kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Color(CubeColor),
    Obstacle(ObstacleKind),
}

/// Visual effects the core requests from the presentation collaborator.
/// The core never waits on a specific effect; it only gates cascade
/// progress on `all_effects_done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Despawn,
    ObstacleHit,
    SpawnSpecial,
    SpawnWhite,
    RowSweep,
    ColumnSweep,
    AreaBlast,
    Zap,
    ColorClear,
    CrossWipe,
    BoardWipe,
    UniteAndPull,
}

/// Level outcome, fired at most once per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_kind_per_color() {
        assert_eq!(CubeColor::Red.special_kind(), Some(SpecialKind::RowClear));
        assert_eq!(
            CubeColor::Blue.special_kind(),
            Some(SpecialKind::ColumnClear)
        );
        assert_eq!(CubeColor::Black.special_kind(), Some(SpecialKind::AreaClear));
        assert_eq!(
            CubeColor::Yellow.special_kind(),
            Some(SpecialKind::RandomZap)
        );
        assert_eq!(CubeColor::White.special_kind(), None);
    }

    #[test]
    fn test_token_roundtrip() {
        for c in ['.', 'r', 'y', 'b', 'k', 'w', 'p', 's'] {
            let token = TileToken::from_char(c).unwrap();
            assert_eq!(token.as_char(), c);
        }
        assert_eq!(TileToken::from_char('x'), None);
    }

    #[test]
    fn test_orientation_merge() {
        use MatchOrientation::{Both, Horizontal, None, Vertical};
        assert_eq!(None.merge(Horizontal), Horizontal);
        assert_eq!(Horizontal.merge(Vertical), Both);
        assert_eq!(Vertical.merge(Vertical), Vertical);
        assert_eq!(Both.merge(Horizontal), Both);
    }

    #[test]
    fn test_stone_blocks_prism_falls() {
        assert!(ObstacleKind::Prism.falls());
        assert!(!ObstacleKind::Stone.falls());
    }
}

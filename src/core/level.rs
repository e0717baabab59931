//! Level construction - building a board from loader-provided data
//!
//! The engine does not parse level files; the loader collaborator hands
//! over dimensions, a flat tile-token layout, a move budget, and target
//! counts. Construction errors are configuration defects, surfaced as
//! typed errors rather than recovered from.

use thiserror::Error;

use crate::core::board::Board;
use crate::core::piece::PieceKind;
use crate::types::{Coord, TargetKey, TileToken};

/// One level-completion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub key: TargetKey,
    pub count: u32,
}

/// Everything the loader provides for one level attempt.
///
/// `layout` is row-major starting at the top row (y = height - 1) and
/// walking down, matching how level data reads on screen.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    pub width: Coord,
    pub height: Coord,
    pub layout: Vec<TileToken>,
    pub move_count: u32,
    pub targets: Vec<TargetSpec>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    BadDimensions { width: Coord, height: Coord },
    #[error("layout has {got} tokens, expected {expected} for a {width}x{height} board")]
    LayoutSizeMismatch {
        width: Coord,
        height: Coord,
        expected: usize,
        got: usize,
    },
    #[error("unknown layout token {token:?} in row {row}")]
    UnknownToken { token: char, row: usize },
}

impl LevelSpec {
    /// Build a spec from one string per row, top row first. Convenient for
    /// tests and fixtures; the token alphabet is [`TileToken::from_char`].
    pub fn from_rows(
        rows: &[&str],
        move_count: u32,
        targets: Vec<TargetSpec>,
    ) -> Result<Self, LevelError> {
        let height = rows.len() as Coord;
        let width = rows.first().map_or(0, |r| r.chars().count()) as Coord;
        let mut layout = Vec::with_capacity((width * height).max(0) as usize);
        for (row_idx, row) in rows.iter().enumerate() {
            for c in row.chars() {
                let token = TileToken::from_char(c).ok_or(LevelError::UnknownToken {
                    token: c,
                    row: row_idx,
                })?;
                layout.push(token);
            }
        }
        let spec = Self {
            width,
            height,
            layout,
            move_count,
            targets,
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), LevelError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(LevelError::BadDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = (self.width * self.height) as usize;
        if self.layout.len() != expected {
            return Err(LevelError::LayoutSizeMismatch {
                width: self.width,
                height: self.height,
                expected,
                got: self.layout.len(),
            });
        }
        Ok(())
    }

    /// Materialize the board: one tile per cell, pieces spawned per token.
    pub fn build_board(&self) -> Result<Board, LevelError> {
        self.validate()?;
        let mut board = Board::new(self.width, self.height);
        for (i, &token) in self.layout.iter().enumerate() {
            let x = i as Coord % self.width;
            // Layout row 0 is the top of the board.
            let y = self.height - 1 - (i as Coord / self.width);
            match token {
                TileToken::Empty => {}
                TileToken::Cube(color) => {
                    let kind = if color.is_white() {
                        PieceKind::White
                    } else {
                        PieceKind::Colored { color }
                    };
                    board.spawn(kind, x, y);
                }
                TileToken::Obstacle(kind) => {
                    board.spawn(
                        PieceKind::Obstacle {
                            kind,
                            hit_points: kind.base_hit_points(),
                        },
                        x,
                        y,
                    );
                }
            }
        }
        Ok(board)
    }

    /// Target keys and counts as the ledger wants them.
    pub fn target_pairs(&self) -> impl Iterator<Item = (TargetKey, u32)> + '_ {
        self.targets.iter().map(|t| (t.key, t.count))
    }
}

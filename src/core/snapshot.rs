//! Board snapshot - serializable occupancy view for observers and tests
//!
//! Rows are rendered top row first using the level-token alphabet, with
//! special cubes uppercased (a promoted Red reads 'R' where a plain red
//! reads 'r'). Snapshots are cheap to capture and compare, which is what
//! the scenario tests assert against.

use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::piece::Piece;
use crate::types::{Coord, TileToken};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: Coord,
    pub height: Coord,
    /// Top row first.
    pub rows: Vec<String>,
}

fn piece_char(piece: &Piece) -> char {
    match (piece.match_color(), piece.obstacle_kind()) {
        (_, Some(kind)) => TileToken::Obstacle(kind).as_char(),
        (Some(color), None) => {
            let c = TileToken::Cube(color).as_char();
            if piece.special_kind().is_some() {
                c.to_ascii_uppercase()
            } else {
                c
            }
        }
        (None, None) => '?',
    }
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let mut rows = Vec::with_capacity(board.height() as usize);
        for y in (0..board.height()).rev() {
            let mut row = String::with_capacity(board.width() as usize);
            for x in 0..board.width() {
                row.push(board.piece_at(x, y).map_or('.', piece_char));
            }
            rows.push(row);
        }
        Self {
            width: board.width(),
            height: board.height(),
            rows,
        }
    }

    /// The snapshot row for board row `y` (bottom-indexed, like the board).
    pub fn row(&self, y: Coord) -> &str {
        &self.rows[(self.height - 1 - y) as usize]
    }
}

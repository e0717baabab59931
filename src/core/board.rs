//! Board module - manages the level grid and the pieces occupying it
//!
//! The board is a `width x height` grid created once per level. Tiles track
//! occupancy by `PieceId`; the pieces themselves live in an id-indexed arena
//! so match groups and effect targets can hold stable handles across
//! mutation. Coordinates: (x, y) with x ranging left to right and y ranging
//! bottom (0) to top (height - 1); gravity pulls toward y = 0.
//!
//! Invariant: a piece's (x, y) always equals the tile that owns it. Every
//! mutation here updates both sides in one step, and debug builds assert the
//! sync on each access. A violation is a programming error, not a runtime
//! condition to recover from.

use crate::core::piece::{Piece, PieceId, PieceKind};
use crate::types::Coord;

/// One grid cell. Tiles are created at board init and never destroyed;
/// only their occupancy changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: Coord,
    pub y: Coord,
    pub occupant: Option<PieceId>,
}

impl Tile {
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// The level grid plus the arena of live pieces.
#[derive(Debug, Clone)]
pub struct Board {
    width: Coord,
    height: Coord,
    /// Row-major tiles, index = y * width + x.
    tiles: Vec<Tile>,
    /// Arena slot per ever-spawned piece; despawn leaves `None`.
    pieces: Vec<Option<Piece>>,
}

impl Board {
    /// Create an empty board. Dimensions must be positive (validated by the
    /// level layer before construction).
    pub fn new(width: Coord, height: Coord) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile {
                    x,
                    y,
                    occupant: None,
                });
            }
        }
        Self {
            width,
            height,
            tiles,
            pieces: Vec::new(),
        }
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline]
    fn index(&self, x: Coord, y: Coord) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn in_bounds(&self, x: Coord, y: Coord) -> bool {
        self.index(x, y).is_some()
    }

    /// Get the tile at (x, y). Returns `None` out of bounds; callers guard.
    pub fn tile_at(&self, x: Coord, y: Coord) -> Option<&Tile> {
        self.index(x, y).map(|idx| &self.tiles[idx])
    }

    /// In bounds and vacant. Out of bounds counts as not empty.
    pub fn is_empty(&self, x: Coord, y: Coord) -> bool {
        self.tile_at(x, y).is_some_and(Tile::is_empty)
    }

    /// Spawn a new piece onto an empty in-bounds tile.
    ///
    /// Panics if the tile is occupied or out of bounds: spawn sites are
    /// always computed from the board itself, so a bad one is a bug.
    pub fn spawn(&mut self, kind: PieceKind, x: Coord, y: Coord) -> PieceId {
        let idx = self
            .index(x, y)
            .expect("spawn position must be in bounds");
        assert!(
            self.tiles[idx].is_empty(),
            "spawn target ({x}, {y}) already occupied"
        );
        let id = PieceId(self.pieces.len() as u32);
        self.pieces.push(Some(Piece::new(id, kind, x, y)));
        self.tiles[idx].occupant = Some(id);
        id
    }

    /// Remove a piece from the board, clearing its tile. Ignores ids that
    /// were already despawned (effects may list a piece twice).
    pub fn despawn(&mut self, id: PieceId) {
        let Some(piece) = self.pieces.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        let idx = (piece.y * self.width + piece.x) as usize;
        debug_assert_eq!(
            self.tiles[idx].occupant,
            Some(id),
            "tile/piece position out of sync at despawn"
        );
        self.tiles[idx].occupant = None;
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// The piece occupying (x, y), if any.
    pub fn piece_at(&self, x: Coord, y: Coord) -> Option<&Piece> {
        let occupant = self.tile_at(x, y)?.occupant?;
        let piece = self.piece(occupant);
        debug_assert!(
            piece.is_some_and(|p| p.x == x && p.y == y),
            "tile/piece position out of sync at ({x}, {y})"
        );
        piece
    }

    /// Move a piece to an empty tile, updating tile and piece together.
    pub fn move_piece(&mut self, id: PieceId, x: Coord, y: Coord) {
        let dst = self.index(x, y).expect("move target must be in bounds");
        assert!(self.tiles[dst].is_empty(), "move target ({x}, {y}) occupied");
        let piece = self.pieces[id.0 as usize]
            .as_mut()
            .expect("moved piece must be alive");
        let src = (piece.y * self.width + piece.x) as usize;
        debug_assert_eq!(self.tiles[src].occupant, Some(id));
        piece.x = x;
        piece.y = y;
        self.tiles[src].occupant = None;
        self.tiles[dst].occupant = Some(id);
    }

    /// Exchange the positions of two live pieces transactionally.
    pub fn swap(&mut self, a: PieceId, b: PieceId) {
        assert_ne!(a, b, "cannot swap a piece with itself");
        let (ax, ay) = {
            let p = self.piece(a).expect("swap piece must be alive");
            (p.x, p.y)
        };
        let (bx, by) = {
            let p = self.piece(b).expect("swap piece must be alive");
            (p.x, p.y)
        };
        let ia = self.index(ax, ay).expect("swap source in bounds");
        let ib = self.index(bx, by).expect("swap source in bounds");
        debug_assert_eq!(self.tiles[ia].occupant, Some(a));
        debug_assert_eq!(self.tiles[ib].occupant, Some(b));
        self.tiles[ia].occupant = Some(b);
        self.tiles[ib].occupant = Some(a);
        if let Some(p) = self.pieces[a.0 as usize].as_mut() {
            p.x = bx;
            p.y = by;
        }
        if let Some(p) = self.pieces[b.0 as usize].as_mut() {
            p.x = ax;
            p.y = ay;
        }
    }

    /// Iterate live pieces in arena order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter_map(Option::as_ref)
    }

    /// Number of live pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// The single fixed board scan order: column-major, x outer ascending,
    /// y inner ascending. Group-priority ties are broken by this order, so
    /// it must never change.
    pub fn scan_order(&self) -> impl Iterator<Item = (Coord, Coord)> {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |x| (0..h).map(move |y| (x, y)))
    }

    /// Reset match-scan tags on every live piece.
    pub fn clear_match_tags(&mut self) {
        for slot in &mut self.pieces {
            if let Some(p) = slot {
                p.clear_match_tags();
            }
        }
    }

    /// True when no piece reports itself in motion.
    pub fn all_settled(&self) -> bool {
        self.pieces().all(|p| !p.is_moving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CubeColor;

    fn colored(color: CubeColor) -> PieceKind {
        PieceKind::Colored { color }
    }

    #[test]
    fn test_tile_at_out_of_bounds() {
        let board = Board::new(6, 6);
        assert!(board.tile_at(-1, 0).is_none());
        assert!(board.tile_at(0, -1).is_none());
        assert!(board.tile_at(6, 0).is_none());
        assert!(board.tile_at(0, 6).is_none());
        assert!(board.tile_at(0, 0).is_some());
        assert!(board.tile_at(5, 5).is_some());
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut board = Board::new(4, 4);
        let id = board.spawn(colored(CubeColor::Red), 1, 2);
        let tile = board.tile_at(1, 2).unwrap();
        assert_eq!(tile.occupant, Some(id));
        let piece = board.piece_at(1, 2).unwrap();
        assert_eq!((piece.x, piece.y), (1, 2));
        assert!(!board.is_empty(1, 2));
        assert!(board.is_empty(0, 0));
        // Out of bounds is never "empty" (callers must guard).
        assert!(!board.is_empty(-1, 0));
    }

    #[test]
    fn test_despawn_clears_tile() {
        let mut board = Board::new(4, 4);
        let id = board.spawn(colored(CubeColor::Blue), 3, 3);
        board.despawn(id);
        assert!(board.is_empty(3, 3));
        assert!(board.piece(id).is_none());
        // Double despawn is a no-op.
        board.despawn(id);
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_move_keeps_positions_in_sync() {
        let mut board = Board::new(4, 4);
        let id = board.spawn(colored(CubeColor::Black), 0, 3);
        board.move_piece(id, 0, 0);
        assert!(board.is_empty(0, 3));
        let piece = board.piece_at(0, 0).unwrap();
        assert_eq!((piece.x, piece.y), (0, 0));
    }

    #[test]
    fn test_swap_roundtrip_restores_mapping() {
        let mut board = Board::new(4, 4);
        let a = board.spawn(colored(CubeColor::Red), 0, 0);
        let b = board.spawn(colored(CubeColor::Blue), 1, 0);
        board.swap(a, b);
        assert_eq!(board.tile_at(0, 0).unwrap().occupant, Some(b));
        assert_eq!(board.tile_at(1, 0).unwrap().occupant, Some(a));
        board.swap(a, b);
        assert_eq!(board.tile_at(0, 0).unwrap().occupant, Some(a));
        assert_eq!(board.tile_at(1, 0).unwrap().occupant, Some(b));
        let pa = board.piece(a).unwrap();
        assert_eq!((pa.x, pa.y), (0, 0));
    }

    #[test]
    fn test_scan_order_column_major() {
        let board = Board::new(2, 3);
        let order: Vec<_> = board.scan_order().collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }
}

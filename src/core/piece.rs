//! Piece module - the closed variant type for everything that occupies a tile
//!
//! A piece is either a plain colored cube, a special cube (color-tied clear
//! effect), a white cube, or an obstacle. Dispatch is by pattern matching on
//! `PieceKind`; there is no runtime type probing. Position fields mirror the
//! owning tile and are kept in sync transactionally by `Board`.

use crate::types::{Coord, CubeColor, MatchOrientation, ObstacleKind, SpecialKind, TargetKey};

/// Stable handle into the board's piece arena. Ids are never reused within
/// a level, so a stale id simply resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// The closed set of piece variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Colored { color: CubeColor },
    Special { color: CubeColor, kind: SpecialKind },
    White,
    Obstacle { kind: ObstacleKind, hit_points: u8 },
}

/// A board piece: variant payload plus the bookkeeping every variant shares
/// (position, motion flag, match tags).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub x: Coord,
    pub y: Coord,
    /// Set while the presentation layer animates this piece; cleared when
    /// the presenter reports the move complete.
    pub is_moving: bool,
    /// Axis tag from the most recent match scan.
    pub orientation: MatchOrientation,
    /// True while this piece belongs to the group currently being resolved
    /// (excludes it from random-zap targeting).
    pub in_match: bool,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, x: Coord, y: Coord) -> Self {
        Self {
            id,
            x,
            y,
            is_moving: false,
            orientation: MatchOrientation::None,
            in_match: false,
            kind,
        }
    }

    /// The color this piece matches as. Obstacles never match.
    pub fn match_color(&self) -> Option<CubeColor> {
        match self.kind {
            PieceKind::Colored { color } | PieceKind::Special { color, .. } => Some(color),
            PieceKind::White => Some(CubeColor::White),
            PieceKind::Obstacle { .. } => None,
        }
    }

    pub fn is_white(&self) -> bool {
        matches!(self.kind, PieceKind::White)
    }

    pub fn is_cube(&self) -> bool {
        !matches!(self.kind, PieceKind::Obstacle { .. })
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self.kind, PieceKind::Obstacle { .. })
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self.kind {
            PieceKind::Special { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn obstacle_kind(&self) -> Option<ObstacleKind> {
        match self.kind {
            PieceKind::Obstacle { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn hit_points(&self) -> u8 {
        match self.kind {
            PieceKind::Obstacle { hit_points, .. } => hit_points,
            _ => 0,
        }
    }

    /// Whether gravity compaction moves this piece down over empty cells.
    pub fn falls(&self) -> bool {
        match self.kind {
            PieceKind::Obstacle { kind, .. } => kind.falls(),
            _ => true,
        }
    }

    /// The level-target bucket this piece decrements when destroyed.
    pub fn target_key(&self) -> TargetKey {
        match self.kind {
            PieceKind::Colored { color } | PieceKind::Special { color, .. } => {
                TargetKey::Color(color)
            }
            PieceKind::White => TargetKey::Color(CubeColor::White),
            PieceKind::Obstacle { kind, .. } => TargetKey::Obstacle(kind),
        }
    }

    /// Replace this cube with the special variant of its own color.
    /// No-op for white cubes and obstacles (they never promote).
    pub fn promote_to_special(&mut self) {
        if let PieceKind::Colored { color } = self.kind {
            if let Some(kind) = color.special_kind() {
                self.kind = PieceKind::Special { color, kind };
            }
        }
    }

    /// Convert this cube to white, preserving position (board-destroy and
    /// cross-wipe do this just before despawning). Obstacles are unchanged.
    pub fn convert_to_white(&mut self) {
        if self.is_cube() {
            self.kind = PieceKind::White;
        }
    }

    /// Clear match-scan bookkeeping.
    pub fn clear_match_tags(&mut self) {
        self.orientation = MatchOrientation::None;
        self.in_match = false;
    }
}

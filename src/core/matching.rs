//! Match detection - directional run scan, group building, priority pick
//!
//! From any cube, the detector walks each of the 4 orthogonal directions
//! independently, following same-color neighbors until the first mismatch,
//! empty cell, obstacle, or board edge. A cube has a match when either axis
//! run reaches total length >= 3 (seed plus two). Whole-board scans visit
//! tiles in one fixed order (column-major, x outer ascending, y inner
//! ascending); that order breaks score ties, so determinism depends on it.

use std::collections::HashSet;

use tracing::debug;

use crate::core::board::Board;
use crate::core::piece::PieceId;
use crate::types::{
    Coord, CubeColor, MatchOrientation, SCORE_FIVE_GROUP, SCORE_FOUR_GROUP, SCORE_HAS_SPECIAL,
    SCORE_PER_ADJACENT_OBSTACLE, SCORE_THREE_GROUP, WHITE_BOARD_CLEAR_COUNT,
};

/// The four orthogonal step directions.
pub const DIRECTIONS: [(Coord, Coord); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A connected same-color group, transient per scan: the seed plus its
/// qualifying horizontal and vertical runs, deduplicated. Recomputed every
/// cascade iteration; never persisted across board mutation.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    /// Seed first, then horizontal run, then vertical run.
    pub pieces: Vec<PieceId>,
    pub white_count: usize,
    pub has_special: bool,
    /// Priority score; unset (0) for white short-circuit groups.
    pub score: u32,
}

impl MatchGroup {
    pub fn size(&self) -> usize {
        self.pieces.len()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.pieces.contains(&id)
    }

    /// Whether this group triggers the full board destruction.
    pub fn is_white_clear(&self) -> bool {
        self.white_count >= WHITE_BOARD_CLEAR_COUNT
    }
}

/// Follow same-color neighbors from (x, y) stepping (dx, dy), excluding
/// the seed itself. Iterative walk; stops at the first mismatch.
fn directional_run(
    board: &Board,
    color: CubeColor,
    x: Coord,
    y: Coord,
    dx: Coord,
    dy: Coord,
) -> Vec<PieceId> {
    let mut run = Vec::new();
    let (mut cx, mut cy) = (x + dx, y + dy);
    while let Some(piece) = board.piece_at(cx, cy) {
        if piece.match_color() != Some(color) {
            break;
        }
        run.push(piece.id);
        cx += dx;
        cy += dy;
    }
    run
}

/// Horizontal and vertical runs around a seed (seed excluded from both).
fn axis_runs(board: &Board, id: PieceId) -> Option<(Vec<PieceId>, Vec<PieceId>)> {
    let piece = board.piece(id)?;
    let color = piece.match_color()?;
    let (x, y) = (piece.x, piece.y);
    let mut horizontal = directional_run(board, color, x, y, -1, 0);
    horizontal.extend(directional_run(board, color, x, y, 1, 0));
    let mut vertical = directional_run(board, color, x, y, 0, -1);
    vertical.extend(directional_run(board, color, x, y, 0, 1));
    Some((horizontal, vertical))
}

/// Axis tag for a single piece: which of its runs reach total length >= 3.
pub fn orientation_of(board: &Board, id: PieceId) -> MatchOrientation {
    let Some((horizontal, vertical)) = axis_runs(board, id) else {
        return MatchOrientation::None;
    };
    let mut orientation = MatchOrientation::None;
    if horizontal.len() >= 2 {
        orientation = orientation.merge(MatchOrientation::Horizontal);
    }
    if vertical.len() >= 2 {
        orientation = orientation.merge(MatchOrientation::Vertical);
    }
    orientation
}

/// Whether the piece currently belongs to any match of size >= 3.
pub fn has_match(board: &Board, id: PieceId) -> bool {
    orientation_of(board, id) != MatchOrientation::None
}

/// Size of the group this piece would seed: seed plus its qualifying axis
/// runs, deduplicated. Returns 0 when the piece has no match. Pure query;
/// no orientation tags are touched.
pub fn group_size(board: &Board, id: PieceId) -> usize {
    let Some((horizontal, vertical)) = axis_runs(board, id) else {
        return 0;
    };
    let h_matches = horizontal.len() >= 2;
    let v_matches = vertical.len() >= 2;
    if !h_matches && !v_matches {
        return 0;
    }
    let mut members = vec![id];
    for run in [(h_matches, horizontal), (v_matches, vertical)] {
        if run.0 {
            for member in run.1 {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
    }
    members.len()
}

/// Build the full group seeded at `id`: seed + qualifying axis runs, merged
/// and deduplicated by identity. Returns `None` if the seed has no match.
/// Tags orientation on every member as a side effect (merging, so a piece
/// touched by both axes ends up `Both`).
fn build_group(board: &mut Board, id: PieceId) -> Option<MatchGroup> {
    let (horizontal, vertical) = axis_runs(board, id)?;
    let h_matches = horizontal.len() >= 2;
    let v_matches = vertical.len() >= 2;
    if !h_matches && !v_matches {
        return None;
    }

    let mut seed_tag = MatchOrientation::None;
    // (member, axis tag) in insertion order; seed goes first.
    let mut tagged: Vec<(PieceId, MatchOrientation)> = Vec::new();
    if h_matches {
        seed_tag = seed_tag.merge(MatchOrientation::Horizontal);
        for member in horizontal {
            tagged.push((member, MatchOrientation::Horizontal));
        }
    }
    if v_matches {
        seed_tag = seed_tag.merge(MatchOrientation::Vertical);
        for member in vertical {
            tagged.push((member, MatchOrientation::Vertical));
        }
    }

    let mut pieces = vec![id];
    let mut white_count = 0;
    let mut has_special = false;

    if let Some(seed) = board.piece_mut(id) {
        seed.orientation = seed.orientation.merge(seed_tag);
    }
    for (member, axis) in tagged {
        if !pieces.contains(&member) {
            pieces.push(member);
        }
        if let Some(p) = board.piece_mut(member) {
            p.orientation = p.orientation.merge(axis);
        }
    }
    for &member in &pieces {
        if let Some(p) = board.piece(member) {
            if p.is_white() {
                white_count += 1;
            }
            if p.special_kind().is_some() {
                has_special = true;
            }
        }
    }

    Some(MatchGroup {
        pieces,
        white_count,
        has_special,
        score: 0,
    })
}

/// Number of distinct obstacles orthogonally adjacent to any group member.
fn adjacent_obstacle_count(board: &Board, group: &MatchGroup) -> u32 {
    let mut seen: HashSet<PieceId> = HashSet::new();
    for &member in &group.pieces {
        let Some(piece) = board.piece(member) else {
            continue;
        };
        for (dx, dy) in DIRECTIONS {
            if let Some(neighbor) = board.piece_at(piece.x + dx, piece.y + dy) {
                if neighbor.is_obstacle() {
                    seen.insert(neighbor.id);
                }
            }
        }
    }
    seen.len() as u32
}

/// Priority score for one candidate group.
fn score_group(board: &Board, group: &MatchGroup) -> u32 {
    let mut score = adjacent_obstacle_count(board, group) * SCORE_PER_ADJACENT_OBSTACLE;
    if group.size() >= 5 {
        score += SCORE_FIVE_GROUP;
    }
    if group.has_special {
        score += SCORE_HAS_SPECIAL;
    }
    match group.size() {
        4 => score += SCORE_FOUR_GROUP,
        3 => score += SCORE_THREE_GROUP,
        _ => {}
    }
    score
}

/// Scan the whole board and pick the single group to resolve next.
///
/// A group holding >= 3 white cubes short-circuits the scan outright (the
/// board clear takes absolute priority). Otherwise the highest score wins,
/// with ties going to the first group found in scan order. Returns `None`
/// when no group of size >= 3 exists (the cascade terminal condition).
pub fn find_best_group(board: &mut Board) -> Option<MatchGroup> {
    board.clear_match_tags();
    let mut best: Option<MatchGroup> = None;

    let cells: Vec<(Coord, Coord)> = board.scan_order().collect();
    for (x, y) in cells {
        let Some(id) = board.piece_at(x, y).map(|p| p.id) else {
            continue;
        };
        let Some(mut group) = build_group(board, id) else {
            continue;
        };
        if group.is_white_clear() {
            debug!(
                size = group.size(),
                whites = group.white_count,
                "white board-clear group found"
            );
            return Some(group);
        }
        group.score = score_group(board, &group);
        if best.as_ref().is_none_or(|b| group.score > b.score) {
            best = Some(group);
        }
    }

    if let Some(ref g) = best {
        debug!(size = g.size(), score = g.score, "selected match group");
    }
    best
}

/// The cube the group resolves around: the spawn anchor for promoted
/// specials and white cubes.
///
/// A member tagged `Both` (the elbow of an L/T shape) wins outright.
/// Otherwise members sort by (y ascending, then x ascending) and the
/// lower-middle entry is taken: index n/2 - 1 for even n, n/2 for odd.
pub fn center_piece(board: &Board, group: &MatchGroup) -> PieceId {
    for &member in &group.pieces {
        if let Some(p) = board.piece(member) {
            if p.orientation == MatchOrientation::Both {
                return member;
            }
        }
    }

    let mut sorted: Vec<(Coord, Coord, PieceId)> = group
        .pieces
        .iter()
        .filter_map(|&member| board.piece(member).map(|p| (p.y, p.x, member)))
        .collect();
    sorted.sort_unstable();
    let n = sorted.len();
    debug_assert!(n >= 3, "match groups are always size >= 3");
    let idx = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
    sorted[idx].2
}

//! Effect resolution - what a match group (or white swap) does to the board
//!
//! `resolve_group` is the single entry point for match resolution. Branches
//! are checked in strict priority order:
//!
//! 1. >= 3 white cubes in the group: destroy the whole board.
//! 2. group size >= 5: destroy the group, spawn a white cube at its center.
//! 3. group contains a special cube: trigger its effect, then destroy the
//!    remainder of the group.
//! 4. group size == 4: promote the swap cube to a special (if flagged),
//!    destroy the rest.
//! 5. plain 3-group: destroy normally.
//!
//! Every branch ends with one deduplicated adjacent-obstacle damage pass:
//! an obstacle orthogonally adjacent to any piece destroyed this step takes
//! exactly one hit, no matter how many destroyed neighbors it touches or
//! whether a sweep already hit it. The random zap is the one exception; it
//! pays budget per hit and may finish an obstacle outright.
//!
//! The white swap effects (color clear, double-white cross wipe) and the
//! post-target final bonus live here too; they share the same destruction
//! and damage plumbing.

use std::collections::HashSet;

use arrayvec::ArrayVec;
use tracing::{debug, trace, warn};

use crate::core::board::Board;
use crate::core::matching::{center_piece, MatchGroup, DIRECTIONS};
use crate::core::piece::{PieceId, PieceKind};
use crate::core::rng::SimpleRng;
use crate::hooks::SessionHooks;
use crate::types::{
    Coord, CubeColor, EffectKind, SpecialKind, ZAP_BUDGET, ZAP_MAX_ATTEMPTS,
};

/// Result of one resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOutcome {
    /// Pieces despawned this step (cubes and finished obstacles).
    pub destroyed: u32,
    /// Special or white cube created this step, protected from despawn.
    pub spawned: Option<PieceId>,
    /// True when the >= 3-white branch wiped the board.
    pub board_cleared: bool,
}

/// Per-resolution-step bookkeeping: destroyed positions feed the adjacency
/// damage pass, and `damaged` enforces the one-hit-per-obstacle rule.
#[derive(Debug, Default)]
struct DamageStep {
    destroyed_at: Vec<(Coord, Coord)>,
    damaged: HashSet<PieceId>,
    destroyed: u32,
}

impl DamageStep {
    /// Despawn a cube (or a zap-finished obstacle), recording its position
    /// and decrementing the matching level target.
    fn destroy(&mut self, board: &mut Board, hooks: &mut SessionHooks, id: PieceId) {
        let Some(piece) = board.piece(id) else {
            return;
        };
        let (x, y) = (piece.x, piece.y);
        let key = piece.target_key();
        trace!(?key, x, y, "despawn");
        hooks.presenter.request_effect(EffectKind::Despawn, (x, y));
        hooks.targets.decrement(key, 1);
        board.despawn(id);
        self.destroyed_at.push((x, y));
        self.destroyed += 1;
    }

    /// Apply `hits` to an obstacle, despawning it at zero hit points.
    fn hit_obstacle(&mut self, board: &mut Board, hooks: &mut SessionHooks, id: PieceId, hits: u8) {
        let Some(piece) = board.piece_mut(id) else {
            return;
        };
        let PieceKind::Obstacle { kind, hit_points } = &mut piece.kind else {
            debug_assert!(false, "hit_obstacle on a non-obstacle");
            return;
        };
        let kind = *kind;
        *hit_points = hit_points.saturating_sub(hits);
        let remaining = *hit_points;
        let (x, y) = (piece.x, piece.y);
        trace!(kind = kind.as_str(), remaining, "obstacle hit");
        hooks
            .presenter
            .request_effect(EffectKind::ObstacleHit, (x, y));
        if remaining == 0 {
            hooks
                .targets
                .decrement(crate::types::TargetKey::Obstacle(kind), 1);
            board.despawn(id);
            self.destroyed += 1;
        }
    }

    /// One hit, once per obstacle per resolution step.
    fn damage_once(&mut self, board: &mut Board, hooks: &mut SessionHooks, id: PieceId) {
        if self.damaged.insert(id) {
            self.hit_obstacle(board, hooks, id, 1);
        }
    }

    /// Damage every obstacle orthogonally adjacent to a destroyed position.
    fn adjacency_pass(&mut self, board: &mut Board, hooks: &mut SessionHooks) {
        let positions = std::mem::take(&mut self.destroyed_at);
        for (x, y) in &positions {
            for (dx, dy) in DIRECTIONS {
                let target = board
                    .piece_at(x + dx, y + dy)
                    .filter(|p| p.is_obstacle())
                    .map(|p| p.id);
                if let Some(id) = target {
                    self.damage_once(board, hooks, id);
                }
            }
        }
        self.destroyed_at = positions;
    }
}

/// Resolve the selected match group. `promote` names the swap cube to turn
/// into a special if the group is exactly 4 (ignored otherwise).
pub fn resolve_group(
    board: &mut Board,
    hooks: &mut SessionHooks,
    rng: &mut SimpleRng,
    group: &MatchGroup,
    promote: Option<PieceId>,
) -> ResolveOutcome {
    for &member in &group.pieces {
        if let Some(p) = board.piece_mut(member) {
            p.in_match = true;
        }
    }

    let mut step = DamageStep::default();
    let mut spawned = None;

    if group.is_white_clear() {
        destroy_board(board, hooks, &mut step);
        return ResolveOutcome {
            destroyed: step.destroyed,
            spawned: None,
            board_cleared: true,
        };
    }

    if group.size() >= 5 {
        // Center first: the anchor position must be read before despawns.
        let center = center_piece(board, group);
        let anchor = board.piece(center).map(|p| (p.x, p.y));
        for &member in &group.pieces {
            step.destroy(board, hooks, member);
        }
        if let Some((x, y)) = anchor {
            hooks
                .presenter
                .request_effect(EffectKind::SpawnWhite, (x, y));
            spawned = Some(board.spawn(PieceKind::White, x, y));
        }
    } else if group.has_special {
        let special = group
            .pieces
            .iter()
            .find(|&&m| board.piece(m).is_some_and(|p| p.special_kind().is_some()))
            .copied();
        if let Some(id) = special {
            trigger_special(board, hooks, rng, &mut step, id);
        }
        for &member in &group.pieces {
            step.destroy(board, hooks, member);
        }
    } else if group.size() == 4 {
        let candidate = promote.filter(|&id| group.contains(id));
        if let Some(keep) = candidate {
            if let Some(p) = board.piece_mut(keep) {
                p.promote_to_special();
                p.clear_match_tags();
                let (x, y) = (p.x, p.y);
                debug!(x, y, "promoted swap cube to special");
                hooks
                    .presenter
                    .request_effect(EffectKind::SpawnSpecial, (x, y));
            }
            spawned = Some(keep);
            for &member in &group.pieces {
                if member != keep {
                    step.destroy(board, hooks, member);
                }
            }
        } else {
            for &member in &group.pieces {
                step.destroy(board, hooks, member);
            }
        }
    } else {
        for &member in &group.pieces {
            step.destroy(board, hooks, member);
        }
    }

    step.adjacency_pass(board, hooks);

    ResolveOutcome {
        destroyed: step.destroyed,
        spawned,
        board_cleared: false,
    }
}

/// Dispatch one special cube's effect into the current damage step.
/// The special itself is not destroyed here (its group despawn follows).
fn trigger_special(
    board: &mut Board,
    hooks: &mut SessionHooks,
    rng: &mut SimpleRng,
    step: &mut DamageStep,
    id: PieceId,
) {
    let Some(piece) = board.piece(id) else {
        return;
    };
    let Some(kind) = piece.special_kind() else {
        return;
    };
    let (x, y) = (piece.x, piece.y);
    debug!(?kind, x, y, "triggering special");
    match kind {
        SpecialKind::RowClear => {
            hooks.presenter.request_effect(EffectKind::RowSweep, (x, y));
            sweep_line(board, hooks, step, id, (0..board.width()).map(|cx| (cx, y)));
        }
        SpecialKind::ColumnClear => {
            hooks
                .presenter
                .request_effect(EffectKind::ColumnSweep, (x, y));
            sweep_line(board, hooks, step, id, (0..board.height()).map(|cy| (x, cy)));
        }
        SpecialKind::AreaClear => {
            hooks
                .presenter
                .request_effect(EffectKind::AreaBlast, (x, y));
            let cells = (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| (x + dx, y + dy)));
            sweep_line(board, hooks, step, id, cells.collect::<Vec<_>>().into_iter());
        }
        SpecialKind::RandomZap => random_zap(board, hooks, rng, step, id),
    }
}

/// Destroy every cube and damage every obstacle over a set of cells,
/// skipping the triggering special itself (it dies with its group).
fn sweep_line(
    board: &mut Board,
    hooks: &mut SessionHooks,
    step: &mut DamageStep,
    origin: PieceId,
    cells: impl Iterator<Item = (Coord, Coord)>,
) {
    for (cx, cy) in cells {
        let Some(piece) = board.piece_at(cx, cy) else {
            continue;
        };
        let (id, is_obstacle) = (piece.id, piece.is_obstacle());
        if id == origin {
            continue;
        }
        if is_obstacle {
            step.damage_once(board, hooks, id);
        } else {
            step.destroy(board, hooks, id);
        }
    }
}

/// Yellow zap: up to [`ZAP_BUDGET`] random targets, excluding white cubes
/// and pieces in the resolving match. An obstacle costs as many budget
/// points as its remaining hit points and is destroyed outright; if the
/// leftover budget cannot cover it, it is skipped entirely. The placement
/// search is attempt-bounded; running out of attempts resolves with
/// however many targets were found.
fn random_zap(
    board: &mut Board,
    hooks: &mut SessionHooks,
    rng: &mut SimpleRng,
    step: &mut DamageStep,
    origin: PieceId,
) {
    let mut budget = ZAP_BUDGET;
    let mut chosen: ArrayVec<PieceId, { ZAP_BUDGET as usize }> = ArrayVec::new();
    let mut attempts = 0;

    while budget > 0 && attempts < ZAP_MAX_ATTEMPTS {
        attempts += 1;
        let x = rng.next_range(board.width() as u32) as Coord;
        let y = rng.next_range(board.height() as u32) as Coord;
        let Some(piece) = board.piece_at(x, y) else {
            continue;
        };
        if piece.id == origin || piece.is_white() || piece.in_match || chosen.contains(&piece.id) {
            continue;
        }
        let (id, hp, is_obstacle) = (piece.id, piece.hit_points(), piece.is_obstacle());
        if is_obstacle {
            let cost = u32::from(hp);
            if cost > budget {
                continue;
            }
            hooks.presenter.request_effect(EffectKind::Zap, (x, y));
            step.hit_obstacle(board, hooks, id, hp);
            budget -= cost;
        } else {
            hooks.presenter.request_effect(EffectKind::Zap, (x, y));
            step.destroy(board, hooks, id);
            budget -= 1;
        }
        let _ = chosen.try_push(id);
    }

    if budget > 0 && attempts >= ZAP_MAX_ATTEMPTS {
        warn!(
            remaining = budget,
            attempts, "zap placement search exhausted"
        );
    }
}

/// White swapped with a colored cube: destroy every cube of that color on
/// the board, plus the white itself, with one adjacency damage pass at the
/// end.
pub fn color_clear(
    board: &mut Board,
    hooks: &mut SessionHooks,
    white: PieceId,
    target: CubeColor,
) -> u32 {
    debug!(color = target.as_str(), "white color clear");
    let mut step = DamageStep::default();
    if let Some(p) = board.piece(white) {
        hooks
            .presenter
            .request_effect(EffectKind::ColorClear, (p.x, p.y));
    }
    let victims: Vec<PieceId> = board
        .pieces()
        .filter(|p| p.id != white && p.match_color() == Some(target))
        .map(|p| p.id)
        .collect();
    for id in victims {
        step.destroy(board, hooks, id);
    }
    step.destroy(board, hooks, white);
    step.adjacency_pass(board, hooks);
    step.destroyed
}

/// Two whites swapped: wipe the union of both pieces' rows and columns.
/// Every cube in the union is converted to white first, then despawned;
/// obstacles in the union take one hit. The two originators despawn last.
pub fn double_white(
    board: &mut Board,
    hooks: &mut SessionHooks,
    a: PieceId,
    b: PieceId,
) -> u32 {
    let Some((ax, ay)) = board.piece(a).map(|p| (p.x, p.y)) else {
        return 0;
    };
    let Some((bx, by)) = board.piece(b).map(|p| (p.x, p.y)) else {
        return 0;
    };
    debug!(ax, ay, bx, by, "double-white cross wipe");
    hooks
        .presenter
        .request_effect(EffectKind::CrossWipe, (ax, ay));

    let mut step = DamageStep::default();
    // Union of both rows and both columns, deduplicated by piece identity
    // (a piece sitting on a row/column intersection is processed once).
    let victims: Vec<(PieceId, bool)> = board
        .pieces()
        .filter(|p| p.id != a && p.id != b)
        .filter(|p| p.y == ay || p.y == by || p.x == ax || p.x == bx)
        .map(|p| (p.id, p.is_obstacle()))
        .collect();
    for (id, is_obstacle) in victims {
        if is_obstacle {
            step.damage_once(board, hooks, id);
        } else {
            if let Some(p) = board.piece_mut(id) {
                p.convert_to_white();
            }
            step.destroy(board, hooks, id);
        }
    }
    // Originators go last.
    step.destroy(board, hooks, a);
    step.destroy(board, hooks, b);
    step.adjacency_pass(board, hooks);
    step.destroyed
}

/// The >= 3-white branch: convert every remaining cube to white, clear
/// obstacles outright, despawn everything.
fn destroy_board(board: &mut Board, hooks: &mut SessionHooks, step: &mut DamageStep) {
    debug!("white board destruction");
    hooks
        .presenter
        .request_effect(EffectKind::BoardWipe, (0, 0));
    let everyone: Vec<(PieceId, bool)> = board
        .pieces()
        .map(|p| (p.id, p.is_obstacle()))
        .collect();
    for (id, is_obstacle) in everyone {
        if is_obstacle {
            // Obstacles are shaken loose outright, regardless of hit points.
            let hp = board.piece(id).map_or(0, |p| p.hit_points());
            step.hit_obstacle(board, hooks, id, hp.max(1));
        } else {
            if let Some(p) = board.piece_mut(id) {
                p.convert_to_white();
            }
            step.destroy(board, hooks, id);
        }
    }
}

/// Final bonus, run once when all targets are satisfied while whites remain
/// on the board: all whites converge to one, which pulls in and destroys
/// 1-4 random colors (scaling with the original white count), then despawns
/// itself. The caller drops/refills and cascades again afterwards.
pub fn final_bonus(board: &mut Board, hooks: &mut SessionHooks, rng: &mut SimpleRng) -> u32 {
    let whites: Vec<PieceId> = board
        .scan_order()
        .filter_map(|(x, y)| board.piece_at(x, y))
        .filter(|p| p.is_white())
        .map(|p| p.id)
        .collect();
    let Some((&anchor, rest)) = whites.split_first() else {
        return 0;
    };

    let color_count = match whites.len() {
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    };
    let colors = rng.pick_colors(color_count);
    debug!(whites = whites.len(), ?colors, "final white bonus");

    let mut step = DamageStep::default();
    let (ax, ay) = board.piece(anchor).map(|p| (p.x, p.y)).unwrap_or((0, 0));
    hooks
        .presenter
        .request_effect(EffectKind::UniteAndPull, (ax, ay));

    // The other whites converge into the anchor.
    for &white in rest {
        if let Some(p) = board.piece(white) {
            hooks.presenter.request_move(white, (p.x, p.y), (ax, ay));
        }
        step.destroy(board, hooks, white);
    }
    // Pull in and destroy every cube of the chosen colors. Pulled pieces
    // die at the anchor, not in place, so no adjacency damage applies.
    let pulled: Vec<PieceId> = board
        .pieces()
        .filter(|p| p.id != anchor)
        .filter(|p| p.match_color().is_some_and(|c| colors.contains(&c)))
        .map(|p| p.id)
        .collect();
    for id in pulled {
        if let Some(p) = board.piece(id) {
            hooks.presenter.request_move(id, (p.x, p.y), (ax, ay));
        }
        step.destroy(board, hooks, id);
    }
    step.destroy(board, hooks, anchor);
    step.destroyed
}

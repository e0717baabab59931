//! Gravity and refill - the drop/refill half of the cascade loop
//!
//! After a resolution step empties tiles, each column compacts
//! independently: fall-eligible pieces slide down over the run of empty
//! cells beneath them. A stone (`falls() == false`) never moves and resets
//! the empty run, so pieces above it rest on it instead of falling past.
//! Refill then spawns fresh random colored cubes into the empty cells at
//! the top of each column, stopping at the first occupied cell (pockets
//! trapped under a stone stay empty).
//!
//! Both passes request presenter moves and mark pieces in motion; the
//! session's barrier keeps the next scan from running until the presenter
//! reports them settled.

use tracing::debug;

use crate::core::board::Board;
use crate::core::piece::PieceKind;
use crate::core::rng::SimpleRng;
use crate::hooks::SessionHooks;

/// Compact every column downward. Returns the number of pieces moved.
pub fn apply_gravity(board: &mut Board, hooks: &mut SessionHooks) -> u32 {
    let mut moved = 0;
    for x in 0..board.width() {
        let mut empty_run = 0;
        for y in 0..board.height() {
            let Some(piece) = board.piece_at(x, y) else {
                empty_run += 1;
                continue;
            };
            if !piece.falls() {
                // Stones hold their ground and carry everything above them.
                empty_run = 0;
                continue;
            }
            if empty_run > 0 {
                let id = piece.id;
                let target_y = y - empty_run;
                board.move_piece(id, x, target_y);
                if let Some(p) = board.piece_mut(id) {
                    p.is_moving = true;
                }
                hooks.presenter.request_move(id, (x, y), (x, target_y));
                moved += 1;
                // The vacated cell joins the run as it walks upward.
            }
        }
    }
    if moved > 0 {
        debug!(moved, "gravity compaction");
    }
    moved
}

/// Spawn random colored cubes into the exposed empty cells at the top of
/// each column. White and special cubes are never spawned here; they only
/// come from explicit match resolutions. Returns the number spawned.
pub fn refill(board: &mut Board, hooks: &mut SessionHooks, rng: &mut SimpleRng) -> u32 {
    let mut spawned = 0;
    let top = board.height() - 1;
    for x in 0..board.width() {
        let mut y = top;
        while y >= 0 && board.is_empty(x, y) {
            let color = rng.refill_color();
            let id = board.spawn(PieceKind::Colored { color }, x, y);
            if let Some(p) = board.piece_mut(id) {
                p.is_moving = true;
            }
            // New cubes drop in from above the board.
            hooks.presenter.request_move(id, (x, board.height()), (x, y));
            spawned += 1;
            y -= 1;
        }
    }
    if spawned > 0 {
        debug!(spawned, "refilled column tops");
    }
    spawned
}

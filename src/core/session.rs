//! Game session - selection, swapping, and the cascade state machine
//!
//! `Session` ties the board, match detector, effect dispatcher, and
//! collaborator hooks together behind the engine's input surface:
//! `select_tile` for player clicks and `tick` to advance the simulation.
//!
//! The simulation is cooperative and single-threaded: `tick` does nothing
//! while any piece reports itself in motion or any effect is still playing
//! (the hard sequencing barrier), so exactly one component mutates the
//! board at a time. Input arriving mid-cascade is rejected, never queued,
//! and a running cascade is never cancelled.
//!
//! Phases: `Idle -> Swapping -> Resolving -> Dropping -> Refilling ->
//! Resolving ...` until no group remains, then `Terminal` evaluates
//! win/lose (at most once per attempt) and play returns to `Idle` or ends
//! at `Over`. A failed swap detours through `Reverting` back to `Idle`.

use tracing::debug;

use crate::core::board::Board;
use crate::core::cascade::{apply_gravity, refill};
use crate::core::effects::{color_clear, double_white, final_bonus, resolve_group};
use crate::core::level::{LevelError, LevelSpec};
use crate::core::matching::{find_best_group, group_size, has_match};
use crate::core::piece::PieceId;
use crate::core::rng::SimpleRng;
use crate::core::snapshot::BoardSnapshot;
use crate::hooks::SessionHooks;
use crate::types::{Coord, Outcome};

/// Where the simulation currently is. Public for observers; only `tick`
/// transitions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Quiescent, awaiting player input.
    Idle,
    /// A forward swap is animating.
    Swapping,
    /// A matchless swap is animating back.
    Reverting,
    /// Scanning for and resolving the best match group.
    Resolving,
    /// Gravity compaction after a resolution step.
    Dropping,
    /// Spawning fresh cubes into exposed top cells.
    Refilling,
    /// Board settled with no group left; evaluating win/lose.
    Terminal,
    /// Outcome fired; the session no longer accepts input.
    Over,
}

pub struct Session {
    board: Board,
    rng: SimpleRng,
    hooks: SessionHooks,
    phase: Phase,
    selected: Option<PieceId>,
    /// The in-flight swap pair, forward order (first-selected, clicked).
    swap: Option<(PieceId, PieceId)>,
    moves_remaining: u32,
    combo: u32,
    /// Swap cube flagged for 4-group promotion; consumed by the resolution
    /// whose group contains it, cleared when the cascade settles.
    promote_candidate: Option<PieceId>,
    final_bonus_done: bool,
    outcome: Option<Outcome>,
}

impl Session {
    /// Build a session from loader data. Construction errors are
    /// configuration defects and are not retried.
    pub fn new(spec: &LevelSpec, seed: u32, hooks: SessionHooks) -> Result<Self, LevelError> {
        let board = spec.build_board()?;
        Ok(Self::with_board(board, spec.move_count, seed, hooks))
    }

    /// Build a session around an existing board (fixtures, tests).
    pub fn with_board(board: Board, move_count: u32, seed: u32, hooks: SessionHooks) -> Self {
        Self {
            board,
            rng: SimpleRng::new(seed),
            hooks,
            phase: Phase::Idle,
            selected: None,
            swap: None,
            moves_remaining: move_count,
            combo: 0,
            promote_candidate: None,
            final_bonus_done: false,
            outcome: None,
        }
    }

    /// Start the attempt: resolve any matches the initial layout contains.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle && self.outcome.is_none() {
            self.phase = Phase::Resolving;
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_moves(&self) -> u32 {
        self.moves_remaining
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    /// True when no piece reports itself in motion. Repeated calls without
    /// intervening ticks return the same value.
    pub fn all_pieces_settled(&self) -> bool {
        self.board.all_settled()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(&self.board)
    }

    /// Player clicked tile (x, y). Returns whether the click did anything
    /// (selected, deselected, or started a swap). Clicks are rejected
    /// outright while a swap or cascade is in progress or any effect is
    /// still playing; invalid targets just clear the selection.
    pub fn select_tile(&mut self, x: Coord, y: Coord) -> bool {
        if self.phase != Phase::Idle
            || !self.board.all_settled()
            || !self.hooks.presenter.all_effects_done()
        {
            return false;
        }
        let Some(piece) = self.board.piece_at(x, y) else {
            self.selected = None;
            return false;
        };
        if !piece.is_cube() {
            // Obstacles are not selectable.
            self.selected = None;
            return false;
        }
        let clicked = piece.id;

        let Some(current) = self.selected else {
            self.selected = Some(clicked);
            return true;
        };
        if current == clicked {
            self.selected = None;
            return true;
        }

        let Some(sel) = self.board.piece(current) else {
            // Stale selection (piece despawned since); treat as fresh click.
            self.selected = Some(clicked);
            return true;
        };
        let adjacent = (sel.x - x).abs() + (sel.y - y).abs() == 1;
        if !adjacent {
            self.selected = None;
            return false;
        }

        self.begin_swap(current, clicked);
        true
    }

    fn begin_swap(&mut self, a: PieceId, b: PieceId) {
        debug!("swap started");
        self.combo = 0;
        self.selected = None;
        let from_a = self.board.piece(a).map(|p| (p.x, p.y));
        let from_b = self.board.piece(b).map(|p| (p.x, p.y));
        self.board.swap(a, b);
        for (id, from) in [(a, from_a), (b, from_b)] {
            if let (Some(from), Some(p)) = (from, self.board.piece_mut(id)) {
                p.is_moving = true;
                let to = (p.x, p.y);
                self.hooks.presenter.request_move(id, from, to);
            }
        }
        self.swap = Some((a, b));
        self.phase = Phase::Swapping;
    }

    /// Advance the simulation by one step, if the sequencing barrier
    /// allows. Call once per frame (or in a loop for headless runs).
    pub fn tick(&mut self) {
        self.settle_movement();
        if !self.board.all_settled() || !self.hooks.presenter.all_effects_done() {
            return;
        }

        match self.phase {
            Phase::Idle | Phase::Over => {}
            Phase::Swapping => self.classify_swap(),
            Phase::Reverting => {
                self.phase = Phase::Idle;
            }
            Phase::Resolving => {
                if let Some(group) = find_best_group(&mut self.board) {
                    self.combo += 1;
                    // The promote flag waits for the group that actually
                    // holds the flagged swap cube; a higher-scoring group
                    // elsewhere may resolve first.
                    let promote = self.promote_candidate.filter(|&id| group.contains(id));
                    if promote.is_some() {
                        self.promote_candidate = None;
                    }
                    let outcome =
                        resolve_group(&mut self.board, &mut self.hooks, &mut self.rng, &group, promote);
                    debug!(
                        destroyed = outcome.destroyed,
                        combo = self.combo,
                        board_cleared = outcome.board_cleared,
                        "group resolved"
                    );
                    self.phase = Phase::Dropping;
                } else {
                    self.promote_candidate = None;
                    self.phase = Phase::Terminal;
                }
            }
            Phase::Dropping => {
                apply_gravity(&mut self.board, &mut self.hooks);
                self.phase = Phase::Refilling;
            }
            Phase::Refilling => {
                refill(&mut self.board, &mut self.hooks, &mut self.rng);
                self.phase = Phase::Resolving;
            }
            Phase::Terminal => self.evaluate_outcome(),
        }
    }

    /// Drive ticks until the session is quiescent (`Idle` or `Over`) or
    /// the tick budget runs out. Returns the ticks consumed. Intended for
    /// headless runs where the presenter completes instantly.
    pub fn settle(&mut self, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while ticks < max_ticks && !matches!(self.phase, Phase::Idle | Phase::Over) {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Clear motion flags for pieces the presenter has finished animating.
    fn settle_movement(&mut self) {
        let moving: Vec<PieceId> = self
            .board
            .pieces()
            .filter(|p| p.is_moving)
            .map(|p| p.id)
            .collect();
        for id in moving {
            if !self.hooks.presenter.is_moving(id) {
                if let Some(p) = self.board.piece_mut(id) {
                    p.is_moving = false;
                }
            }
        }
    }

    /// Both swapped pieces have finished animating: decide what the swap
    /// did. White pairings trigger their effects directly; otherwise each
    /// swapped piece is match-checked independently and a matchless swap
    /// reverts without consuming a move.
    fn classify_swap(&mut self) {
        let Some((a, b)) = self.swap.take() else {
            self.phase = Phase::Idle;
            return;
        };
        let a_white = self.board.piece(a).is_some_and(|p| p.is_white());
        let b_white = self.board.piece(b).is_some_and(|p| p.is_white());

        if a_white && b_white {
            self.consume_move();
            double_white(&mut self.board, &mut self.hooks, a, b);
            self.phase = Phase::Dropping;
            return;
        }
        if a_white || b_white {
            let (white, other) = if a_white { (a, b) } else { (b, a) };
            let target = self.board.piece(other).and_then(|p| p.match_color());
            if let Some(color) = target {
                self.consume_move();
                color_clear(&mut self.board, &mut self.hooks, white, color);
                self.phase = Phase::Dropping;
                return;
            }
            // No color to clear; fall through to the revert below.
        }

        let a_matched = has_match(&self.board, a);
        let b_matched = has_match(&self.board, b);
        if !a_white && !b_white && (a_matched || b_matched) {
            self.consume_move();
            // 4-group promotion favors the first-selected piece when both
            // swapped pieces produce one.
            self.promote_candidate = if a_matched && group_size(&self.board, a) == 4 {
                Some(a)
            } else if b_matched && group_size(&self.board, b) == 4 {
                Some(b)
            } else {
                None
            };
            self.phase = Phase::Resolving;
            return;
        }

        // Revert: swap back and wait for the return animation.
        debug!("swap reverted");
        let from_a = self.board.piece(a).map(|p| (p.x, p.y));
        let from_b = self.board.piece(b).map(|p| (p.x, p.y));
        self.board.swap(a, b);
        for (id, from) in [(a, from_a), (b, from_b)] {
            if let (Some(from), Some(p)) = (from, self.board.piece_mut(id)) {
                p.is_moving = true;
                let to = (p.x, p.y);
                self.hooks.presenter.request_move(id, from, to);
            }
        }
        self.phase = Phase::Reverting;
    }

    fn consume_move(&mut self) {
        self.moves_remaining = self.moves_remaining.saturating_sub(1);
    }

    /// Board fully settled with no group left. Run the final white bonus
    /// if it is due, otherwise fire the outcome (once) or hand control
    /// back to the player.
    fn evaluate_outcome(&mut self) {
        if self.hooks.targets.all_cleared() {
            let whites_remain = self.board.pieces().any(|p| p.is_white());
            if !self.final_bonus_done && whites_remain {
                self.final_bonus_done = true;
                final_bonus(&mut self.board, &mut self.hooks, &mut self.rng);
                self.phase = Phase::Dropping;
                return;
            }
            self.fire_outcome(Outcome::Won);
            return;
        }
        if self.moves_remaining == 0 {
            self.fire_outcome(Outcome::Lost);
            return;
        }
        self.phase = Phase::Idle;
    }

    fn fire_outcome(&mut self, outcome: Outcome) {
        debug_assert!(self.outcome.is_none(), "outcome must fire at most once");
        if self.outcome.is_none() {
            debug!(?outcome, "level outcome");
            self.outcome = Some(outcome);
            match outcome {
                Outcome::Won => self.hooks.outcome.on_win(),
                Outcome::Lost => self.hooks.outcome.on_lose(),
            }
        }
        self.phase = Phase::Over;
    }
}

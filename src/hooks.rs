//! Collaborator interfaces - the narrow seams to presentation and progress
//!
//! The engine never renders, plays audio, or persists anything. It talks to
//! those layers through the traits here: fire-and-forget move/effect
//! requests whose completion is observed by polling, a target ledger, and
//! the win/lose sink. A `SessionHooks` bundle is injected into the session
//! at construction (no global managers).
//!
//! The engine is single-threaded by design, so the provided test/headless
//! implementations use `Rc` handles rather than any locking.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::piece::PieceId;
use crate::types::{Coord, EffectKind, TargetKey};

/// Presentation collaborator: animation and VFX playback.
///
/// `request_move`/`request_effect` are fire-and-forget; the engine gates
/// cascade progress on `is_moving`/`all_effects_done` polls. A presenter
/// with no visual for some effect must report it complete immediately
/// rather than stall the simulation.
pub trait Presenter {
    fn request_move(&mut self, piece: PieceId, from: (Coord, Coord), to: (Coord, Coord));
    fn request_effect(&mut self, kind: EffectKind, at: (Coord, Coord));
    /// Whether the given piece is still animating a requested move.
    fn is_moving(&self, piece: PieceId) -> bool;
    /// Whether every requested effect has finished playing.
    fn all_effects_done(&self) -> bool;
}

/// Progress collaborator: level-target bookkeeping.
pub trait TargetTracker {
    /// Report `count` pieces of the keyed type destroyed.
    fn decrement(&mut self, key: TargetKey, count: u32);
    /// Whether every level target has been satisfied.
    fn all_cleared(&self) -> bool;
}

/// Outcome collaborator. Each callback fires at most once per level
/// attempt, and they are mutually exclusive.
pub trait OutcomeSink {
    fn on_win(&mut self);
    fn on_lose(&mut self);
}

/// The dependency bundle handed to a session at construction.
pub struct SessionHooks {
    pub presenter: Box<dyn Presenter>,
    pub targets: Box<dyn TargetTracker>,
    pub outcome: Box<dyn OutcomeSink>,
}

impl SessionHooks {
    pub fn new(
        presenter: Box<dyn Presenter>,
        targets: Box<dyn TargetTracker>,
        outcome: Box<dyn OutcomeSink>,
    ) -> Self {
        Self {
            presenter,
            targets,
            outcome,
        }
    }

    /// Headless hooks: instant animation, the given target counts, and a
    /// discarded outcome (sessions record the outcome themselves).
    pub fn headless(targets: impl IntoIterator<Item = (TargetKey, u32)>) -> Self {
        Self::new(
            Box::new(NullPresenter),
            Box::new(TargetLedger::new(targets)),
            Box::new(NullOutcome),
        )
    }
}

/// Presenter that completes everything instantly (headless runs, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn request_move(&mut self, _piece: PieceId, _from: (Coord, Coord), _to: (Coord, Coord)) {}
    fn request_effect(&mut self, _kind: EffectKind, _at: (Coord, Coord)) {}
    fn is_moving(&self, _piece: PieceId) -> bool {
        false
    }
    fn all_effects_done(&self) -> bool {
        true
    }
}

/// Counting target tracker with a cloneable read handle, so tests and UI
/// code can observe remaining counts while the session owns the boxed
/// tracker.
#[derive(Debug, Clone, Default)]
pub struct TargetLedger {
    remaining: Rc<RefCell<HashMap<TargetKey, u32>>>,
}

impl TargetLedger {
    pub fn new(targets: impl IntoIterator<Item = (TargetKey, u32)>) -> Self {
        Self {
            remaining: Rc::new(RefCell::new(targets.into_iter().collect())),
        }
    }

    /// Remaining count for a key; untracked keys read as 0.
    pub fn remaining(&self, key: TargetKey) -> u32 {
        self.remaining.borrow().get(&key).copied().unwrap_or(0)
    }
}

impl TargetTracker for TargetLedger {
    fn decrement(&mut self, key: TargetKey, count: u32) {
        if let Some(entry) = self.remaining.borrow_mut().get_mut(&key) {
            *entry = entry.saturating_sub(count);
        }
    }

    fn all_cleared(&self) -> bool {
        self.remaining.borrow().values().all(|&v| v == 0)
    }
}

/// Outcome sink that ignores callbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutcome;

impl OutcomeSink for NullOutcome {
    fn on_win(&mut self) {}
    fn on_lose(&mut self) {}
}

//! Cubematch - match-3 board simulation engine
//!
//! The core of a match-3 puzzle game: the grid model, match detection,
//! cascade/gravity resolution, and special-cube effect composition that
//! decide what happens after each player move. Rendering, audio, UI, and
//! level-file loading are external collaborators reached through the
//! narrow traits in [`hooks`].
//!
//! Typical use: build a [`core::LevelSpec`] from loader data, construct a
//! [`core::Session`] with a [`hooks::SessionHooks`] bundle, feed player
//! clicks to `select_tile`, and call `tick` once per frame. The session
//! advances only when the presenter reports all movement and effects
//! complete, so the simulation never races its own animations.

pub mod hooks;
pub mod types;

pub mod core;

pub use crate::core::{Board, LevelError, LevelSpec, Phase, Session, TargetSpec};
pub use crate::hooks::{NullPresenter, Presenter, SessionHooks, TargetLedger, TargetTracker};

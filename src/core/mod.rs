//! Core module - the simulation engine proper
//!
//! Pure game rules and state: grid, pieces, match detection, effect
//! resolution, gravity/refill, and the session state machine. Nothing in
//! here renders, plays audio, or does I/O; those concerns sit behind the
//! traits in [`crate::hooks`].

pub mod board;
pub mod cascade;
pub mod effects;
pub mod level;
pub mod matching;
pub mod piece;
pub mod rng;
pub mod session;
pub mod snapshot;

// Re-export the types most callers want.
pub use board::{Board, Tile};
pub use level::{LevelError, LevelSpec, TargetSpec};
pub use matching::{find_best_group, MatchGroup};
pub use piece::{Piece, PieceId, PieceKind};
pub use rng::SimpleRng;
pub use session::{Phase, Session};
pub use snapshot::BoardSnapshot;

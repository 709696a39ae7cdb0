//! Engine error taxonomy.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
  /// The pool cannot supply the requested number of distinct names.
  /// Surfaced to the caller; never clamped.
  #[error("Insufficient pool: {requested} candidates requested, only {available} distinct items available")]
  InsufficientPool { requested: usize, available: usize },

  /// Operation not allowed in the current round state (e.g. skip while unresolved).
  /// Treated as an inert no-op by the state machine.
  #[error("Invalid operation: {0}")]
  InvalidOperation(&'static str),

  /// Guess named something that is not among the currently visible candidates.
  #[error("Unknown candidate: {0}")]
  UnknownCandidate(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Domain models used by the engine: pool items, guess outcomes, the round itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One identifiable quiz subject. Audio and image are opaque references the
/// presentation layer resolves (URLs or asset paths).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
  pub name: String,
  pub category: String,
  pub audio: String,
  pub image: String,
}

/// Result of a single accepted guess, keyed by the clicked candidate name.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Correct,
  Incorrect,
}

/// One question instance. Replaced wholesale on regeneration; only the
/// state machine mutates `outcomes`/`revealed_image`.
#[derive(Clone, Debug)]
pub struct Round {
  pub candidates: Vec<Item>,
  pub answer_index: usize,
  pub outcomes: BTreeMap<String, Outcome>,
  /// `None` until resolved; the presentation shows the placeholder meanwhile.
  pub revealed_image: Option<String>,
}

impl Round {
  pub fn new(candidates: Vec<Item>, answer_index: usize) -> Self {
    Self { candidates, answer_index, outcomes: BTreeMap::new(), revealed_image: None }
  }

  pub fn answer(&self) -> &Item {
    &self.candidates[self.answer_index]
  }

  /// Resolved exactly when one guess has been recorded.
  pub fn is_resolved(&self) -> bool {
    !self.outcomes.is_empty()
  }
}

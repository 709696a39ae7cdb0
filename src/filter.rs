//! Category filter: a display-only view over a round's candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Item, Round};

/// Wire name of the unfiltered view.
pub const ALL: &str = "all";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
  #[default]
  All,
  Only(String),
}

impl CategoryFilter {
  /// `None`, an empty string, or "all" (any case) means "all", so the
  /// `activeCategory` a snapshot reports can be sent back unchanged.
  pub fn from_option(category: Option<String>) -> Self {
    match category {
      Some(c) if !c.trim().is_empty() && !c.trim().eq_ignore_ascii_case(ALL) => CategoryFilter::Only(c),
      _ => CategoryFilter::All,
    }
  }

  pub fn admits(&self, item: &Item) -> bool {
    match self {
      CategoryFilter::All => true,
      CategoryFilter::Only(c) => item.category == *c,
    }
  }
}

impl fmt::Display for CategoryFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CategoryFilter::All => f.write_str(ALL),
      CategoryFilter::Only(c) => f.write_str(c),
    }
  }
}

/// Order-preserving subsequence of the candidates admitted by `filter`.
/// Never looks at the answer; a filter may hide it.
pub fn view<'a>(round: &'a Round, filter: &CategoryFilter) -> Vec<&'a Item> {
  round.candidates.iter().filter(|c| filter.admits(c)).collect()
}

//! Round generation: name-unique candidate sampling and answer selection.
//!
//! Sampling is rejection-based (uniform index draws, skip names already taken).
//! It switches to shuffle-and-take when the request covers most of the pool or
//! the draw budget runs out, so `size == pool.len()` terminates quickly.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::{Item, Round};
use crate::error::{EngineError, Result};

/// Draws allowed per requested candidate before falling back to a shuffle.
const DRAWS_PER_CANDIDATE: usize = 16;

/// Number of distinct names in `pool`.
pub fn distinct_names(pool: &[Item]) -> usize {
  pool.iter().map(|i| i.name.as_str()).collect::<HashSet<_>>().len()
}

#[instrument(level = "debug", skip(pool, rng), fields(pool_len = pool.len()))]
pub fn generate<R: Rng + ?Sized>(pool: &[Item], size: usize, rng: &mut R) -> Result<Round> {
  let available = distinct_names(pool);
  if size == 0 || size > available {
    return Err(EngineError::InsufficientPool { requested: size, available });
  }

  let mut taken: HashSet<&str> = HashSet::with_capacity(size);
  let mut picked: Vec<&Item> = Vec::with_capacity(size);

  if size * 2 <= pool.len() {
    let budget = size * DRAWS_PER_CANDIDATE;
    let mut draws = 0;
    while picked.len() < size && draws < budget {
      draws += 1;
      let item = &pool[rng.gen_range(0..pool.len())];
      if taken.insert(item.name.as_str()) {
        picked.push(item);
      }
    }
    debug!(target: "round", draws, accepted = picked.len(), "Rejection sampling finished");
  }

  if picked.len() < size {
    let mut rest: Vec<&Item> = pool.iter().filter(|i| !taken.contains(i.name.as_str())).collect();
    rest.shuffle(rng);
    for item in rest {
      if picked.len() == size { break; }
      if taken.insert(item.name.as_str()) {
        picked.push(item);
      }
    }
  }

  let mut candidates: Vec<Item> = picked.into_iter().cloned().collect();
  candidates.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

  let answer_index = rng.gen_range(0..candidates.len());
  Ok(Round::new(candidates, answer_index))
}

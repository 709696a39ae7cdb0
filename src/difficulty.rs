//! Adaptive candidate-set size.
//!
//! Slow ratchet: a streak of two or more widens the set by one per round,
//! a miss narrows it by one, a lone correct guess leaves it alone.

/// Smallest candidate set ever shown.
pub const MIN_CHOICES: usize = 4;

pub fn next_difficulty(current: usize, streak: u32, pool_size: usize, min_size: usize) -> usize {
  if streak > 1 && current < pool_size {
    current + 1
  } else if streak == 0 && current > min_size {
    current - 1
  } else {
    current
  }
}

//! Round state machine: owns the current round, session counters, the active
//! category filter, and the countdown.
//!
//! A session is driven from a single task. Guesses, skips, filter changes and
//! ticks are applied one at a time; regeneration builds the next round before
//! touching any state, so a failed transition leaves the old round in place.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::GameConfig;
use crate::difficulty::next_difficulty;
use crate::domain::{Item, Outcome, Round};
use crate::error::{EngineError, Result};
use crate::filter::{view, CategoryFilter};
use crate::generator::{distinct_names, generate};
use crate::timer::{Countdown, TickOutcome, TickSource};

/// Per-session score. Lives only as long as the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Score {
  pub correct: u32,
  pub incorrect: u32,
  pub streak: u32,
}

impl Score {
  /// Rounded (correct %, incorrect %); both zero before the first guess.
  pub fn percentages(&self) -> (u32, u32) {
    let total = self.correct + self.incorrect;
    if total == 0 {
      return (0, 0);
    }
    let pct = |n: u32| ((n as f64 / total as f64) * 100.0).round() as u32;
    (pct(self.correct), pct(self.incorrect))
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessResult {
  pub outcome: Outcome,
  pub answer: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickReport {
  Tick { seconds_left: u32 },
  NewRound,
}

/// Everything the presentation layer reads to render a session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub correct: u32,
  pub incorrect: u32,
  pub streak: u32,
  pub correct_pct: u32,
  pub incorrect_pct: u32,
  pub difficulty: usize,
  pub resolved: bool,
  pub time_left: u32,
  pub active_category: String,
  pub categories: Vec<String>,
  pub candidates: Vec<CandidateOut>,
  pub revealed_image: String,
  /// Answer name, only once the round is resolved.
  pub revealed_answer: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CandidateOut {
  pub name: String,
  pub category: String,
  pub image: String,
  pub outcome: Option<Outcome>,
}

pub struct QuizSession<S, R> {
  pool: Arc<[Item]>,
  config: Arc<GameConfig>,
  rng: R,
  round: Round,
  score: Score,
  difficulty: usize,
  filter: CategoryFilter,
  countdown: Countdown<S>,
}

impl<S: TickSource, R: Rng> QuizSession<S, R> {
  /// Start a session with the first round at the configured minimum size.
  #[instrument(level = "info", skip_all, fields(pool_len = pool.len()))]
  pub fn new(pool: Arc<[Item]>, config: Arc<GameConfig>, ticks: S, mut rng: R) -> Result<Self> {
    let difficulty = config.min_choices;
    let round = generate(&pool, difficulty, &mut rng)?;
    info!(target: "round", difficulty, "Session started");
    Ok(Self {
      countdown: Countdown::new(ticks, config.countdown_seconds),
      pool,
      config,
      rng,
      round,
      score: Score::default(),
      difficulty,
      filter: CategoryFilter::All,
    })
  }

  pub fn is_resolved(&self) -> bool { self.round.is_resolved() }
  pub fn score(&self) -> Score { self.score }
  #[allow(dead_code)]
  pub fn difficulty(&self) -> usize { self.difficulty }
  #[allow(dead_code)]
  pub fn round(&self) -> &Round { &self.round }
  #[allow(dead_code)]
  pub fn filter(&self) -> &CategoryFilter { &self.filter }
  pub fn time_left(&self) -> u32 { self.countdown.seconds_left() }
  /// Generation the countdown is currently armed with.
  #[allow(dead_code)]
  pub fn countdown_generation(&self) -> u64 { self.countdown.generation() }

  /// Audio of the current answer, for the "play sound" action.
  pub fn answer_audio(&self) -> &str { &self.round.answer().audio }

  /// Candidates visible under the active filter.
  pub fn visible(&self) -> Vec<&Item> {
    view(&self.round, &self.filter)
  }

  /// Evaluate a guess. `Ok(None)` when the round is already resolved (no-op);
  /// `UnknownCandidate` when `name` is not currently visible.
  #[instrument(level = "info", skip(self), fields(difficulty = self.difficulty))]
  pub fn evaluate_guess(&mut self, name: &str) -> Result<Option<GuessResult>> {
    if let Err(e) = self.ensure_unresolved() {
      debug!(target: "round", error = %e, "Guess ignored");
      return Ok(None);
    }
    if !self.visible().iter().any(|c| c.name == name) {
      return Err(EngineError::UnknownCandidate(name.to_string()));
    }

    let answer = self.round.answer().clone();
    let outcome = if name == answer.name {
      self.score.correct += 1;
      self.score.streak += 1;
      Outcome::Correct
    } else {
      self.score.incorrect += 1;
      self.score.streak = 0;
      Outcome::Incorrect
    };
    self.round.outcomes.insert(name.to_string(), outcome);
    self.round.revealed_image = Some(answer.image);
    self.countdown.start();

    info!(target: "round", ?outcome, answer = %answer.name, streak = self.score.streak, "Guess evaluated");
    Ok(Some(GuessResult { outcome, answer: answer.name }))
  }

  /// Advance immediately from a resolved round. `Ok(false)` when unresolved (no-op).
  #[instrument(level = "info", skip(self))]
  pub fn skip(&mut self) -> Result<bool> {
    if let Err(e) = self.ensure_resolved() {
      debug!(target: "round", error = %e, "Skip ignored");
      return Ok(false);
    }
    self.regenerate()?;
    Ok(true)
  }

  /// Apply a tick delivered by the tick source. Expiry regenerates the round.
  pub fn on_tick(&mut self, generation: u64) -> Result<Option<TickReport>> {
    match self.countdown.on_tick(generation) {
      TickOutcome::Stale => Ok(None),
      TickOutcome::Tick { seconds_left } => Ok(Some(TickReport::Tick { seconds_left })),
      TickOutcome::Expired => {
        self.regenerate()?;
        Ok(Some(TickReport::NewRound))
      }
    }
  }

  pub fn select_filter(&mut self, filter: CategoryFilter) {
    debug!(target: "round", filter = %filter, "Filter selected");
    self.filter = filter;
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    let (correct_pct, incorrect_pct) = self.score.percentages();
    let resolved = self.is_resolved();
    SessionSnapshot {
      correct: self.score.correct,
      incorrect: self.score.incorrect,
      streak: self.score.streak,
      correct_pct,
      incorrect_pct,
      difficulty: self.difficulty,
      resolved,
      time_left: self.time_left(),
      active_category: self.filter.to_string(),
      categories: self.config.categories.clone(),
      candidates: self
        .visible()
        .into_iter()
        .map(|c| CandidateOut {
          name: c.name.clone(),
          category: c.category.clone(),
          image: c.image.clone(),
          outcome: self.round.outcomes.get(&c.name).copied(),
        })
        .collect(),
      revealed_image: self
        .round
        .revealed_image
        .clone()
        .unwrap_or_else(|| self.config.placeholder_image.clone()),
      revealed_answer: resolved.then(|| self.round.answer().name.clone()),
    }
  }

  fn ensure_unresolved(&self) -> Result<()> {
    if self.is_resolved() {
      Err(EngineError::InvalidOperation("round already resolved"))
    } else {
      Ok(())
    }
  }

  fn ensure_resolved(&self) -> Result<()> {
    if self.is_resolved() {
      Ok(())
    } else {
      Err(EngineError::InvalidOperation("round not resolved yet"))
    }
  }

  fn regenerate(&mut self) -> Result<()> {
    let pool_size = distinct_names(&self.pool);
    let next = next_difficulty(self.difficulty, self.score.streak, pool_size, self.config.min_choices);
    let round = generate(&self.pool, next, &mut self.rng)?;

    self.countdown.reset();
    self.round = round;
    self.difficulty = next;
    self.filter = CategoryFilter::All;
    info!(target: "round", difficulty = next, streak = self.score.streak, "New round");
    Ok(())
  }

  #[cfg(test)]
  fn countdown(&self) -> &Countdown<S> { &self.countdown }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use crate::seeds::seed_pool;
  use crate::timer::ManualTicks;

  type TestSession = QuizSession<ManualTicks, StdRng>;

  fn session_with(pool: Vec<Item>, seed: u64) -> TestSession {
    QuizSession::new(pool.into(), Arc::new(GameConfig::default()), ManualTicks::default(), StdRng::seed_from_u64(seed))
      .expect("session")
  }

  fn session(seed: u64) -> TestSession {
    session_with(seed_pool(), seed)
  }

  fn pool_of(n: usize) -> Vec<Item> {
    seed_pool().into_iter().take(n).collect()
  }

  fn answer(s: &TestSession) -> String {
    s.round().answer().name.clone()
  }

  fn wrong(s: &TestSession) -> String {
    let a = answer(s);
    s.round().candidates.iter().find(|c| c.name != a).unwrap().name.clone()
  }

  fn expire(s: &mut TestSession) -> Option<TickReport> {
    let mut last = None;
    while s.countdown().is_running() {
      let g = s.countdown().source().armed.expect("armed");
      last = s.on_tick(g).unwrap();
    }
    last
  }

  #[test]
  fn correct_guess_scores_and_resolves() {
    let mut s = session(1);
    let name = answer(&s);
    let res = s.evaluate_guess(&name).unwrap().expect("accepted");
    assert_eq!(res.outcome, Outcome::Correct);
    assert_eq!(s.score(), Score { correct: 1, incorrect: 0, streak: 1 });
    assert!(s.is_resolved());
    assert_eq!(s.round().outcomes.get(&name), Some(&Outcome::Correct));
    assert_eq!(s.round().revealed_image.as_deref(), Some(s.round().answer().image.as_str()));
    assert!(s.countdown().is_running());
  }

  #[test]
  fn wrong_guess_resets_streak_and_reveals_answer() {
    let mut s = session(2);
    s.evaluate_guess(&answer(&s)).unwrap();
    s.skip().unwrap();
    let miss = wrong(&s);
    let res = s.evaluate_guess(&miss).unwrap().expect("accepted");
    assert_eq!(res.outcome, Outcome::Incorrect);
    assert_eq!(res.answer, answer(&s));
    assert_eq!(s.score(), Score { correct: 1, incorrect: 1, streak: 0 });
    assert_eq!(s.round().outcomes.len(), 1);
    assert_eq!(s.round().outcomes.get(&miss), Some(&Outcome::Incorrect));
    assert_eq!(s.snapshot().revealed_answer, Some(answer(&s)));
  }

  #[test]
  fn second_guess_in_same_round_is_inert() {
    let mut s = session(3);
    s.evaluate_guess(&wrong(&s)).unwrap();
    let before = s.score();
    assert_eq!(s.evaluate_guess(&answer(&s)).unwrap(), None);
    assert_eq!(s.score(), before);
    assert_eq!(s.round().outcomes.len(), 1);
  }

  #[test]
  fn unknown_name_is_rejected_without_state_change() {
    let mut s = session(4);
    let err = s.evaluate_guess("Not A Gun").unwrap_err();
    assert_eq!(err, EngineError::UnknownCandidate("Not A Gun".into()));
    assert!(!s.is_resolved());
    assert_eq!(s.score(), Score::default());
  }

  #[test]
  fn skip_only_acts_on_resolved_round() {
    let mut s = session(5);
    let before = s.round().candidates.clone();
    assert!(!s.skip().unwrap());
    assert_eq!(s.round().candidates, before);

    s.evaluate_guess(&answer(&s)).unwrap();
    assert!(s.skip().unwrap());
    assert!(!s.is_resolved());
    assert!(s.round().outcomes.is_empty());
    assert!(!s.countdown().is_running());
    assert_eq!(s.time_left(), 3);
  }

  #[test]
  fn expiry_after_three_ticks_starts_fresh_round() {
    let mut s = session(6);
    s.evaluate_guess(&answer(&s)).unwrap();
    s.select_filter(CategoryFilter::Only("Long".into()));
    let g = s.countdown().source().armed.unwrap();
    assert_eq!(s.on_tick(g).unwrap(), Some(TickReport::Tick { seconds_left: 2 }));
    assert_eq!(s.on_tick(g).unwrap(), Some(TickReport::Tick { seconds_left: 1 }));
    assert_eq!(s.on_tick(g).unwrap(), Some(TickReport::NewRound));
    assert_eq!(s.on_tick(g).unwrap(), None);

    assert!(!s.is_resolved());
    assert_eq!(s.filter(), &CategoryFilter::All);
    assert_eq!(s.time_left(), 3);
    let snap = s.snapshot();
    assert_eq!(snap.active_category, "all");
    assert_eq!(snap.revealed_image, GameConfig::default().placeholder_image);
    assert_eq!(snap.revealed_answer, None);
  }

  #[test]
  fn stale_tick_after_skip_does_not_touch_new_round() {
    let mut s = session(7);
    s.evaluate_guess(&answer(&s)).unwrap();
    let g = s.countdown().source().armed.unwrap();
    s.skip().unwrap();
    let round = s.round().candidates.clone();
    assert_eq!(s.on_tick(g).unwrap(), None);
    assert_eq!(s.round().candidates, round);
    assert_eq!(s.time_left(), 3);
  }

  #[test]
  fn difficulty_follows_documented_scenario() {
    let mut s = session_with(pool_of(10), 8);
    assert_eq!(s.difficulty(), 4);

    s.evaluate_guess(&answer(&s)).unwrap();
    assert_eq!(s.score(), Score { correct: 1, incorrect: 0, streak: 1 });
    expire(&mut s);
    assert_eq!(s.difficulty(), 4);

    s.evaluate_guess(&answer(&s)).unwrap();
    assert_eq!(s.score(), Score { correct: 2, incorrect: 0, streak: 2 });
    expire(&mut s);
    assert_eq!(s.difficulty(), 5);
    assert_eq!(s.round().candidates.len(), 5);
  }

  #[test]
  fn sustained_streak_clamps_at_pool_size() {
    let mut s = session_with(pool_of(6), 9);
    let mut sizes = vec![];
    for _ in 0..6 {
      s.evaluate_guess(&answer(&s)).unwrap();
      s.skip().unwrap();
      sizes.push(s.difficulty());
      assert_eq!(s.round().candidates.len(), s.difficulty());
    }
    assert_eq!(sizes, vec![4, 5, 6, 6, 6, 6]);
  }

  #[test]
  fn miss_narrows_by_one_until_min() {
    let mut s = session(10);
    for _ in 0..4 {
      s.evaluate_guess(&answer(&s)).unwrap();
      s.skip().unwrap();
    }
    assert_eq!(s.difficulty(), 7);

    s.evaluate_guess(&wrong(&s)).unwrap();
    s.skip().unwrap();
    assert_eq!(s.difficulty(), 6);
    for _ in 0..5 {
      s.evaluate_guess(&wrong(&s)).unwrap();
      s.skip().unwrap();
    }
    assert_eq!(s.difficulty(), 4);
  }

  #[test]
  fn filter_hiding_the_answer_is_a_dead_end_until_reset() {
    let mut s = session(11);
    let answer_item = s.round().answer().clone();
    let other = s
      .round()
      .candidates
      .iter()
      .find(|c| c.category != answer_item.category)
      .map(|c| c.category.clone())
      .unwrap_or_else(|| "Nonexistent".into());
    s.select_filter(CategoryFilter::Only(other));

    assert!(!s.visible().iter().any(|c| c.name == answer_item.name));
    assert!(matches!(s.evaluate_guess(&answer_item.name), Err(EngineError::UnknownCandidate(_))));
    assert_eq!(s.round().answer_index, s.round().candidates.iter().position(|c| c.name == answer_item.name).unwrap());
    assert!(!s.is_resolved());

    s.select_filter(CategoryFilter::All);
    assert_eq!(s.evaluate_guess(&answer_item.name).unwrap().unwrap().outcome, Outcome::Correct);
  }

  #[test]
  fn filter_to_absent_category_shows_nothing() {
    let mut s = session(12);
    let before = s.round().clone();
    s.select_filter(CategoryFilter::Only("Artillery".into()));
    assert!(s.snapshot().candidates.is_empty());
    assert_eq!(s.round().candidates, before.candidates);
    assert_eq!(s.round().answer_index, before.answer_index);
  }

  #[test]
  fn pool_smaller_than_min_fails_setup() {
    let err = QuizSession::new(
      pool_of(3).into(),
      Arc::new(GameConfig::default()),
      ManualTicks::default(),
      StdRng::seed_from_u64(0),
    )
    .err()
    .expect("setup must fail");
    assert_eq!(err, EngineError::InsufficientPool { requested: 4, available: 3 });
  }

  #[test]
  fn percentages_round_like_score_bar() {
    assert_eq!(Score::default().percentages(), (0, 0));
    assert_eq!(Score { correct: 2, incorrect: 1, streak: 0 }.percentages(), (67, 33));
    assert_eq!(Score { correct: 1, incorrect: 0, streak: 1 }.percentages(), (100, 0));
  }

  #[test]
  fn answer_audio_matches_answer_item() {
    let s = session(13);
    assert_eq!(s.answer_audio(), s.round().answer().audio);
  }
}

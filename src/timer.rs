//! Round countdown.
//!
//! `Countdown` holds the count and a generation number; the actual cadence comes
//! from an injected `TickSource`. Each arm gets a fresh generation, and a tick
//! carrying any other generation is stale, so an expiry queued by a cancelled
//! timer can never land on the next round.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Something that delivers periodic ticks tagged with a generation number.
pub trait TickSource {
  /// Start delivering ticks for `generation`, replacing any previous schedule.
  fn arm(&mut self, generation: u64);
  /// Stop delivering ticks. Must be safe when nothing is armed.
  fn disarm(&mut self);
}

/// Production source: a tokio interval task posting generations into the
/// session's event channel.
pub struct IntervalTicks {
  period: Duration,
  tx: UnboundedSender<u64>,
  task: Option<JoinHandle<()>>,
}

impl IntervalTicks {
  pub fn new(period: Duration, tx: UnboundedSender<u64>) -> Self {
    Self { period, tx, task: None }
  }
}

impl TickSource for IntervalTicks {
  fn arm(&mut self, generation: u64) {
    self.disarm();
    let tx = self.tx.clone();
    let period = self.period;
    self.task = Some(tokio::spawn(async move {
      let mut ticks = interval_at(Instant::now() + period, period);
      ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticks.tick().await;
        if tx.send(generation).is_err() {
          break;
        }
      }
    }));
  }

  fn disarm(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl Drop for IntervalTicks {
  fn drop(&mut self) {
    self.disarm();
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
  /// Tick from a cancelled or superseded timer.
  Stale,
  Tick { seconds_left: u32 },
  /// Count reached zero; reported once, the timer is already disarmed.
  Expired,
}

pub struct Countdown<S> {
  source: S,
  initial: u32,
  seconds_left: u32,
  generation: u64,
  running: bool,
}

impl<S: TickSource> Countdown<S> {
  pub fn new(source: S, initial_seconds: u32) -> Self {
    Self { source, initial: initial_seconds, seconds_left: initial_seconds, generation: 0, running: false }
  }

  /// Arm from `initial_seconds`, superseding any running countdown.
  pub fn start(&mut self) {
    self.cancel();
    self.generation += 1;
    self.seconds_left = self.initial;
    self.running = true;
    debug!(target: "round", generation = self.generation, seconds = self.initial, "Countdown started");
    self.source.arm(self.generation);
  }

  pub fn cancel(&mut self) {
    if self.running {
      self.running = false;
      // bump so ticks already queued for the old generation go stale
      self.generation += 1;
      self.source.disarm();
    }
  }

  pub fn reset(&mut self) {
    self.cancel();
    self.seconds_left = self.initial;
  }

  pub fn on_tick(&mut self, generation: u64) -> TickOutcome {
    if !self.running || generation != self.generation {
      trace!(target: "round", generation, current = self.generation, "Stale tick ignored");
      return TickOutcome::Stale;
    }
    self.seconds_left = self.seconds_left.saturating_sub(1);
    if self.seconds_left == 0 {
      self.cancel();
      TickOutcome::Expired
    } else {
      TickOutcome::Tick { seconds_left: self.seconds_left }
    }
  }

  pub fn seconds_left(&self) -> u32 { self.seconds_left }
  #[allow(dead_code)]
  pub fn is_running(&self) -> bool { self.running }
  #[allow(dead_code)]
  pub fn generation(&self) -> u64 { self.generation }

  #[cfg(test)]
  pub fn source(&self) -> &S { &self.source }
}

/// Hand-driven source for tests: records what the countdown asked for.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualTicks {
  pub armed: Option<u64>,
  pub arms: usize,
  pub disarms: usize,
}

#[cfg(test)]
impl TickSource for ManualTicks {
  fn arm(&mut self, generation: u64) {
    self.armed = Some(generation);
    self.arms += 1;
  }

  fn disarm(&mut self) {
    self.armed = None;
    self.disarms += 1;
  }
}

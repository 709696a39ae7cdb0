//! Loading game configuration (tuning + optional item pool) from TOML.
//!
//! Every field is optional; see `GameConfig::default()` for the fallbacks.
//!
//! ```toml
//! min_choices = 4
//! countdown_seconds = 3
//! tick_millis = 1000
//! placeholder_image = "/images/mystery.png"
//! categories = ["Compact", "Medium", "Long", "Shotgun", "Special"]
//!
//! [[items]]
//! name = "Mosin-Nagant M1891"
//! category = "Long"
//! audio = "/sounds/mosin.mp3"
//! image = "/images/mosin.png"
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::difficulty::MIN_CHOICES;
use crate::domain::Item;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
  /// Smallest (and starting) candidate-set size.
  pub min_choices: usize,
  /// Countdown length after a guess, in ticks.
  pub countdown_seconds: u32,
  /// Tick period; one second in production, shorter for demos.
  pub tick_millis: u64,
  /// Image shown while the answer is concealed.
  pub placeholder_image: String,
  /// Filter buttons offered to the player, in display order.
  pub categories: Vec<String>,
  /// Item pool. Empty means "use the built-in seed pool".
  pub items: Vec<Item>,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      min_choices: MIN_CHOICES,
      countdown_seconds: 3,
      tick_millis: 1000,
      placeholder_image: "/images/mystery.png".into(),
      categories: ["Compact", "Medium", "Long", "Shotgun", "Special"].map(String::from).to_vec(),
      items: Vec::new(),
    }
  }
}

impl GameConfig {
  pub fn tick_period(&self) -> Duration {
    Duration::from_millis(self.tick_millis.max(1))
  }
}

pub fn parse_game_config(s: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str::<GameConfig>(s)
}

/// Attempt to load `GameConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_game_config(&s) {
      Ok(cfg) => {
        info!(target: "earshot_backend", %path, items = cfg.items.len(), "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "earshot_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "earshot_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

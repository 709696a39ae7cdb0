//! Application state: the read-only item pool and game configuration shared by
//! every connection.
//!
//! Sessions are not stored here. Each WebSocket task owns its own
//! `QuizSession`, so nothing session-related is shared between players.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

use crate::config::{load_game_config_from_env, GameConfig};
use crate::domain::Item;
use crate::engine::QuizSession;
use crate::error::{EngineError, Result};
use crate::generator::distinct_names;
use crate::seeds::seed_pool;
use crate::timer::IntervalTicks;

pub type LiveSession = QuizSession<IntervalTicks, StdRng>;

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<[Item]>,
    pub config: Arc<GameConfig>,
}

impl AppState {
    /// Build state from env: load config, pick the item pool, check it can
    /// supply the minimum candidate set.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self> {
        let cfg = load_game_config_from_env().unwrap_or_default();
        Self::from_config(cfg)
    }

    pub fn from_config(mut cfg: GameConfig) -> Result<Self> {
        let items = std::mem::take(&mut cfg.items);
        let pool: Vec<Item> = if items.is_empty() {
            info!(target: "earshot_backend", "No items configured; using built-in seed pool");
            seed_pool()
        } else {
            items
        };

        let available = distinct_names(&pool);
        if available < pool.len() {
            warn!(target: "earshot_backend", total = pool.len(), available, "Item pool contains duplicate names");
        }
        if available < cfg.min_choices {
            return Err(EngineError::InsufficientPool { requested: cfg.min_choices, available });
        }

        for category in &cfg.categories {
            let n = pool.iter().filter(|i| &i.category == category).count();
            if n == 0 {
                warn!(target: "earshot_backend", %category, "Configured category has no items in the pool");
            } else {
                info!(target: "earshot_backend", %category, items = n, "Startup pool inventory");
            }
        }
        // every category in the pool gets a filter button, configured ones keep their order
        for item in &pool {
            if !cfg.categories.contains(&item.category) {
                warn!(target: "earshot_backend", category = %item.category, "Pool category missing from config; adding filter");
                cfg.categories.push(item.category.clone());
            }
        }

        Ok(Self { pool: pool.into(), config: Arc::new(cfg) })
    }

    /// Fresh single-player session whose countdown ticks arrive on `ticks`.
    pub fn new_session(&self, ticks: UnboundedSender<u64>) -> Result<LiveSession> {
        QuizSession::new(
            self.pool.clone(),
            self.config.clone(),
            IntervalTicks::new(self.config.tick_period(), ticks),
            StdRng::from_entropy(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_seed_pool() {
        let state = AppState::from_config(GameConfig::default()).expect("state");
        assert_eq!(state.pool.len(), seed_pool().len());
        assert!(state.config.items.is_empty());
    }

    #[test]
    fn pool_too_small_for_min_choices_is_refused() {
        let cfg = GameConfig { items: seed_pool().into_iter().take(2).collect(), ..GameConfig::default() };
        let err = AppState::from_config(cfg).err().expect("must fail");
        assert_eq!(err, EngineError::InsufficientPool { requested: 4, available: 2 });
    }

    #[test]
    fn pool_categories_missing_from_config_become_filters() {
        let mut items = seed_pool();
        for item in items.iter_mut().take(3) {
            item.category = "Melee".into();
        }
        let cfg = GameConfig { categories: vec!["Long".into()], items, ..GameConfig::default() };
        let state = AppState::from_config(cfg).expect("state");
        let cats = &state.config.categories;
        assert_eq!(cats[0], "Long");
        for item in state.pool.iter() {
            assert!(cats.contains(&item.category), "no filter for {}", item.category);
        }
        assert_eq!(cats.iter().filter(|c| *c == "Melee").count(), 1);
    }

    #[tokio::test]
    async fn new_session_starts_unresolved_at_min_size() {
        let state = AppState::from_config(GameConfig::default()).unwrap();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let session = state.new_session(tx).expect("session");
        assert!(!session.is_resolved());
        assert_eq!(session.difficulty(), 4);
    }
}

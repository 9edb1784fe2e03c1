//! Persisted feed state: liked listings and the selected category.
//!
//! State is an explicit object loaded and saved at boundary calls rather
//! than ambient globals. Interactions arrive as typed [`FeedAction`]s and
//! are applied through [`AppState::dispatch`].

use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

use crate::Error;
use crate::cache::CacheDb;

/// Storage key of the serialized state row.
const STATE_KEY: &str = "nammy-state";

/// Category shown on first launch.
pub const DEFAULT_CATEGORY: &str = "para-ti";

/// Feed categories the page can switch between.
pub const CATEGORIES: &[&str] = &["para-ti", "restaurantes", "farmacias", "tiendas"];

/// Liked listings and selected category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub liked_items: BTreeSet<String>,
    #[serde(default = "default_category")]
    pub current_category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self { liked_items: BTreeSet::new(), current_category: default_category() }
    }
}

/// A typed interaction emitted by a feed card or tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FeedAction {
    ToggleLike { item_id: String },
    SelectCategory { category: String },
}

impl AppState {
    /// Load persisted state, falling back to defaults when nothing is stored.
    ///
    /// A corrupt row is logged and replaced by defaults, matching how the page
    /// treats unreadable local storage.
    pub async fn load(db: &CacheDb) -> Result<Self, Error> {
        let raw = db
            .conn
            .call(|conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT value_json FROM app_state WHERE key = ?1",
                    params![STATE_KEY],
                    |row| row.get::<_, String>(0),
                );
                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(state) => Ok(state),
                Err(e) => {
                    tracing::warn!(error = %e, "stored feed state unreadable; using defaults");
                    Ok(Self::default())
                }
            },
            None => Ok(Self::default()),
        }
    }

    /// Persist the current state.
    pub async fn save(&self, db: &CacheDb) -> Result<(), Error> {
        let json = serde_json::to_string(self)?;
        let now = Utc::now().to_rfc3339();
        db.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO app_state (key, value_json, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value_json = excluded.value_json,
                        updated_at = excluded.updated_at",
                    params![STATE_KEY, json, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    pub fn is_liked(&self, item_id: &str) -> bool {
        self.liked_items.contains(item_id)
    }

    /// Flip the liked flag of an item. Returns whether it is liked afterwards.
    pub fn toggle_like(&mut self, item_id: &str) -> bool {
        if self.liked_items.remove(item_id) {
            false
        } else {
            self.liked_items.insert(item_id.to_string());
            true
        }
    }

    /// Switch the selected category.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a category outside [`CATEGORIES`].
    pub fn select_category(&mut self, category: &str) -> Result<(), Error> {
        if !CATEGORIES.contains(&category) {
            return Err(Error::InvalidInput(format!("unknown category: {category}")));
        }
        self.current_category = category.to_string();
        Ok(())
    }

    /// Apply an action and persist the result.
    pub async fn dispatch(&mut self, db: &CacheDb, action: &FeedAction) -> Result<(), Error> {
        match action {
            FeedAction::ToggleLike { item_id } => {
                if item_id.is_empty() {
                    return Err(Error::InvalidInput("item_id cannot be empty".into()));
                }
                let liked = self.toggle_like(item_id);
                tracing::debug!(item_id = %item_id, liked, "toggled like");
            }
            FeedAction::SelectCategory { category } => {
                self.select_category(category)?;
                tracing::debug!(category = %category, "selected category");
            }
        }
        self.save(db).await
    }
}

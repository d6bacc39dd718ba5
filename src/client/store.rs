//! Client-side persistence: generation history and user settings, stored as
//! JSON files under a data directory.
//!
//! Loads are tolerant: a missing or corrupt file comes back as an empty
//! history or default settings, never an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use super::resolver::BUILD_TIME_API_URL;
use crate::composition::{Composition, Emotion, Feedback, Genre};

const HISTORY_FILENAME: &str = "history.json";
const SETTINGS_FILENAME: &str = "settings.json";

/// Only the most recent entries are kept.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no composition with id {0}")]
    UnknownComposition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// User preferences, merged over defaults at load time and persisted on
/// every change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_tempo: u32,
    pub default_genre: Genre,
    pub default_emotion: Emotion,
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_tempo: 100,
            default_genre: Genre::BollywoodFusion,
            default_emotion: Emotion::Love,
            api_base_url: BUILD_TIME_API_URL.unwrap_or("").to_string(),
        }
    }
}

pub struct ClientStore {
    data_dir: PathBuf,
}

impl ClientStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILENAME)
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILENAME)
    }

    /// Newest entries first. Missing or corrupt files load as empty.
    pub fn load_history(&self) -> Vec<Composition> {
        let path = self.history_path();
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(history) => history,
                Err(err) => {
                    warn!("Failed to parse history file: {}", err);
                    Vec::new()
                }
            },
            Err(err) => {
                warn!("Failed to read history file: {}", err);
                Vec::new()
            }
        }
    }

    fn save_history(&self, history: &[Composition]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let raw = serde_json::to_string_pretty(history)?;
        fs::write(self.history_path(), raw)?;
        Ok(())
    }

    /// Prepend a fresh composition, dropping anything past the cap.
    pub fn append_composition(
        &self,
        composition: Composition,
    ) -> Result<Vec<Composition>, StoreError> {
        let mut history = self.load_history();
        history.insert(0, composition);
        history.truncate(HISTORY_LIMIT);
        self.save_history(&history)?;
        Ok(history)
    }

    /// Flip the favorite flag of an entry, returning the new value.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, StoreError> {
        let mut history = self.load_history();
        let entry = history
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownComposition(id.to_string()))?;
        entry.favorite = !entry.favorite;
        let favorite = entry.favorite;
        self.save_history(&history)?;
        Ok(favorite)
    }

    pub fn record_feedback(&self, id: &str, feedback: Feedback) -> Result<(), StoreError> {
        let mut history = self.load_history();
        let entry = history
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownComposition(id.to_string()))?;
        entry.feedback = Some(feedback);
        self.save_history(&history)
    }

    /// Stored values merged over defaults; tolerant like the history load.
    pub fn load_settings(&self) -> Settings {
        let path = self.settings_path();
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("Failed to parse settings file: {}", err);
                    Settings::default()
                }
            },
            Err(err) => {
                warn!("Failed to read settings file: {}", err);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(self.settings_path(), raw)?;
        Ok(())
    }

    pub fn update_settings(
        &self,
        update: impl FnOnce(&mut Settings),
    ) -> Result<Settings, StoreError> {
        let mut settings = self.load_settings();
        update(&mut settings);
        self.save_settings(&settings)?;
        Ok(settings)
    }
}

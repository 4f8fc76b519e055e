use serde::{Serialize, de::DeserializeOwned};

use crate::auth::AuthState;
use crate::engine::scoring::GameAggregate;
use crate::store::history::{RoundHistory, UsedAnswers};
use crate::store::{PersistenceError, RecordStore};

pub const GAME_STATE_KEY: &str = "poem_game_state";
pub const HISTORY_KEY: &str = "poem_history";
pub const USED_ANSWERS_KEY: &str = "used_poems";
pub const AUTH_KEY: &str = "poem_game_auth";

/// Typed access to the four persisted records. Every load is
/// absent-tolerant: a missing, unreadable or corrupt record yields its
/// default.
pub struct GameRecords {
    store: Box<dyn RecordStore>,
}

impl GameRecords {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.read(key) {
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("record {key} is corrupt, using defaults: {e}");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                log::warn!("{e}; using defaults");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(data).map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.write(key, &json)
    }

    pub fn load_aggregate(&self) -> GameAggregate {
        self.load(GAME_STATE_KEY)
    }

    pub fn save_aggregate(&self, aggregate: &GameAggregate) -> Result<(), PersistenceError> {
        self.save(GAME_STATE_KEY, aggregate)
    }

    pub fn load_history(&self) -> RoundHistory {
        let history: RoundHistory = self.load(HISTORY_KEY);
        RoundHistory::from_records(history.records().to_vec())
    }

    pub fn save_history(&self, history: &RoundHistory) -> Result<(), PersistenceError> {
        self.save(HISTORY_KEY, history)
    }

    pub fn load_used_answers(&self) -> UsedAnswers {
        let list: Vec<String> = self.load(USED_ANSWERS_KEY);
        UsedAnswers::from_list(list)
    }

    pub fn save_used_answers(&self, used: &UsedAnswers) -> Result<(), PersistenceError> {
        if used.is_empty() {
            return self.store.remove(USED_ANSWERS_KEY);
        }
        self.save(USED_ANSWERS_KEY, used)
    }

    pub fn load_auth(&self) -> AuthState {
        self.load(AUTH_KEY)
    }

    pub fn save_auth(&self, auth: &AuthState) -> Result<(), PersistenceError> {
        self.save(AUTH_KEY, auth)
    }

    pub fn clear_auth(&self) -> Result<(), PersistenceError> {
        self.store.remove(AUTH_KEY)
    }
}

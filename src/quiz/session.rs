use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use super::deck::build_deck;
use super::{QuizAttempt, QuizQuestion};

pub const SEEN_KEY: &str = "meme_quiz_seen_ids_v1";

/// Session-scoped key/value storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Lives as long as the bot process, which is what a session means here.
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
    }
}

/// Missing or unreadable data is an empty set.
pub fn load_seen(store: &dyn SessionStore, key: &str) -> HashSet<String> {
    let Some(raw) = store.get(key) else {
        return HashSet::new();
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids.into_iter().collect(),
        Err(err) => {
            log::debug!("Ignoring malformed seen ids under '{}': {}", key, err);
            HashSet::new()
        }
    }
}

pub fn save_seen(store: &dyn SessionStore, key: &str, seen: &HashSet<String>) {
    let mut ids: Vec<&String> = seen.iter().collect();
    ids.sort();
    match serde_json::to_string(&ids) {
        Ok(encoded) => store.set(key, encoded),
        Err(err) => log::warn!("Could not encode seen ids: {}", err),
    }
}

/// Starts quiz attempts without repeating questions within a session.
#[derive(Clone)]
pub struct QuizSessions {
    store: Arc<dyn SessionStore>,
    draw_count: usize,
}

impl QuizSessions {
    pub fn new(store: Arc<dyn SessionStore>, draw_count: usize) -> Self {
        Self { store, draw_count }
    }

    fn key(session: &str) -> String {
        format!("{}:{}", session, SEEN_KEY)
    }

    #[cfg(test)]
    pub fn seen(&self, session: &str) -> HashSet<String> {
        load_seen(self.store.as_ref(), &Self::key(session))
    }

    /// `None` when there is nothing to ask.
    pub fn start_attempt(&self, session: &str, bank: &[QuizQuestion]) -> Option<QuizAttempt> {
        if bank.is_empty() {
            return None;
        }
        let key = Self::key(session);
        let seen = load_seen(self.store.as_ref(), &key);
        let draw = build_deck(bank, self.draw_count, &seen);
        if draw.reset_seen {
            log::debug!("Seen pool exhausted for session {}, reshuffling", session);
        }
        save_seen(self.store.as_ref(), &key, &draw.updated_seen);
        Some(QuizAttempt::new(draw.deck))
    }

    pub fn reset_session(&self, session: &str) {
        save_seen(self.store.as_ref(), &Self::key(session), &HashSet::new());
    }
}

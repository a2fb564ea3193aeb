//! Response cache keyed by a SHA-256 fingerprint of the semantically relevant
//! request fields. Entries expire after a fixed TTL and are evicted lazily.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

use super::{ChatMessage, ChatResponse};

/// Canonical form hashed into the fingerprint. Field order is fixed by the
/// declaration and serde_json emits no insignificant whitespace.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    j: bool,
    m: &'a str,
    msg: &'a [ChatMessage],
}

/// Deterministic cache key for `(model, json_mode, messages)`.
pub fn fingerprint(model: &str, json_mode: bool, messages: &[ChatMessage]) -> String {
    let canonical = serde_json::to_vec(&FingerprintInput {
        j: json_mode,
        m: model,
        msg: messages,
    })
    .expect("fingerprint input contains only strings and bools");

    format!("{:x}", Sha256::digest(&canonical))
}

struct CacheEntry {
    response: ChatResponse,
    stored_at: Instant,
}

pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live entry for `key`, removing it if it has expired.
    /// The TTL check happens under the same lock as the read.
    pub fn get(&self, key: &str) -> Option<ChatResponse> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let live = entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() <= self.ttl)?;

        if live {
            return entries.get(key).map(|entry| entry.response.clone());
        }

        entries.remove(key);
        debug!(key, "evicted expired llm cache entry");
        None
    }

    pub fn insert(&self, key: String, response: ChatResponse) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                response,
                stored_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

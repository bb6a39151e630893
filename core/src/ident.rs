//! Entity id generation — injected so tests get predictable ids.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub trait IdGen: Send + Sync {
    fn next_id(&self) -> String;
}

/// Production generator: random v4 UUIDs.
pub struct UuidIds;

impl IdGen for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Test generator: `<prefix>-1`, `<prefix>-2`, ...
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGen for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n}", self.prefix)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out process-unique, namespaced identifiers such as `p3` or `tree17`.
///
/// Backed by a single atomic counter, so an id is never handed out twice
/// even across prefixes or threads.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", prefix, n)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

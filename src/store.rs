//! store.rs — the signal store contract and its in-memory default.
//!
//! Handlers may run on any worker thread, so the in-memory implementation
//! serializes mutation behind a mutex and serves reads as clones of the
//! current snapshot. A durable backend swaps in behind the same trait
//! without touching the pipeline.

use std::sync::Mutex;

use crate::signal::Signal;

/// Ordered, append-only collection of signals with delete-by-id and clear.
pub trait SignalStore: Send + Sync {
    fn append(&self, signal: Signal);
    /// Full snapshot in insertion order.
    fn list(&self) -> Vec<Signal>;
    /// Idempotent: removing an absent id is a no-op.
    fn remove(&self, id: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Vec<Signal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalStore for MemoryStore {
    fn append(&self, signal: Signal) {
        let mut v = self.inner.lock().expect("signal store mutex poisoned");
        v.push(signal);
    }

    fn list(&self) -> Vec<Signal> {
        let v = self.inner.lock().expect("signal store mutex poisoned");
        v.clone()
    }

    fn remove(&self, id: &str) {
        let mut v = self.inner.lock().expect("signal store mutex poisoned");
        v.retain(|s| s.id.to_string() != id);
    }

    fn clear(&self) {
        let mut v = self.inner.lock().expect("signal store mutex poisoned");
        v.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Action, Enrichment, ExtractedFields};

    fn sample(symbol: &str) -> Signal {
        let fields = ExtractedFields {
            symbol: symbol.into(),
            action: Action::Buy,
            entry: None,
            zone_low: None,
            zone_high: None,
            tp1: None,
            tp2: None,
            tp3: None,
            sl: None,
            confidence: None,
        };
        Signal::assemble(fields, Enrichment::default(), "msg", None)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let store = MemoryStore::new();
        store.append(sample("EURUSD"));
        store.append(sample("GBPJPY"));
        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].symbol, "EURUSD");
        assert_eq!(listed[1].symbol, "GBPJPY");
    }

    #[test]
    fn remove_is_idempotent_for_absent_ids() {
        let store = MemoryStore::new();
        store.append(sample("EURUSD"));
        store.remove("not-a-real-id");
        assert_eq!(store.list().len(), 1);

        let id = store.list()[0].id.to_string();
        store.remove(&id);
        store.remove(&id);
        assert!(store.list().is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let store = MemoryStore::new();
        store.append(sample("EURUSD"));
        store.append(sample("USDJPY"));
        store.clear();
        assert!(store.list().is_empty());
    }
}

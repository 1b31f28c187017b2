//! String key-value persistence and write coalescing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::StoreError;

/// Quiet period before staged writes reach the store.
pub const DEFAULT_DEBOUNCE_MS: f64 = 400.0;

/// A synchronous string store such as browser `localStorage` or a JSON file.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Milliseconds on a monotonic-enough clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Coalesces writes per key and commits them once the writer has been idle
/// for the debounce delay. Pending writes are committed on drop.
#[derive(Debug)]
pub struct DebouncedWriter<S: KeyValueStore> {
    store: S,
    delay_ms: f64,
    /// `None` marks a pending removal.
    pending: BTreeMap<String, Option<String>>,
    last_change_ms: Option<f64>,
}

impl<S: KeyValueStore> DebouncedWriter<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_delay(store, DEFAULT_DEBOUNCE_MS)
    }

    #[must_use]
    pub fn with_delay(store: S, delay_ms: f64) -> Self {
        Self {
            store,
            delay_ms,
            pending: BTreeMap::new(),
            last_change_ms: None,
        }
    }

    pub fn stage(&mut self, key: &str, value: String, now_ms: f64) {
        self.pending.insert(key.to_string(), Some(value));
        self.last_change_ms = Some(now_ms);
    }

    pub fn stage_remove(&mut self, key: &str, now_ms: f64) {
        self.pending.insert(key.to_string(), None);
        self.last_change_ms = Some(now_ms);
    }

    /// Reads through pending writes.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.pending.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.store.get(key),
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the pending writes become due, if any.
    #[must_use]
    pub fn deadline_ms(&self) -> Option<f64> {
        if self.pending.is_empty() {
            return None;
        }
        self.last_change_ms.map(|last| last + self.delay_ms)
    }

    /// Commit pending writes if the quiet period has elapsed. Returns whether
    /// anything was written.
    pub fn poll(&mut self, now_ms: f64) -> Result<bool, StoreError> {
        match self.deadline_ms() {
            Some(deadline) if now_ms >= deadline => {
                self.flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Commit everything now. Every pending key is attempted; the first
    /// failure is returned.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let pending = std::mem::take(&mut self.pending);
        self.last_change_ms = None;
        let mut first_error = None;
        for (key, value) in pending {
            let result = match value {
                Some(value) => self.store.set(&key, &value),
                None => self.store.remove(&key),
            };
            match result {
                Ok(()) => trace!(key = %key, "committed debounced write"),
                Err(err) => {
                    warn!(key = %key, error = %err, "debounced write failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: KeyValueStore> Drop for DebouncedWriter<S> {
    fn drop(&mut self) {
        if self.has_pending() {
            let _ = self.flush();
        }
    }
}

/// A [`KeyValueStore`] whose writes are staged in a shared
/// [`DebouncedWriter`] and stamped by `clock`. Reads see staged values.
///
/// Clones share the staged writes, so a scheduler can hold one clone to poll
/// the deadline while a session writes through another. The writes are
/// committed when the last clone is dropped.
#[derive(Debug)]
pub struct DebouncedStore<S: KeyValueStore, C> {
    writer: Rc<RefCell<DebouncedWriter<S>>>,
    clock: C,
}

impl<S: KeyValueStore, C: Clone> Clone for DebouncedStore<S, C> {
    fn clone(&self) -> Self {
        Self {
            writer: Rc::clone(&self.writer),
            clock: self.clock.clone(),
        }
    }
}

impl<S: KeyValueStore, C: Clock> DebouncedStore<S, C> {
    #[must_use]
    pub fn new(store: S, clock: C) -> Self {
        Self::with_delay(store, clock, DEFAULT_DEBOUNCE_MS)
    }

    #[must_use]
    pub fn with_delay(store: S, clock: C, delay_ms: f64) -> Self {
        Self {
            writer: Rc::new(RefCell::new(DebouncedWriter::with_delay(store, delay_ms))),
            clock,
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.writer.borrow().has_pending()
    }

    #[must_use]
    pub fn deadline_ms(&self) -> Option<f64> {
        self.writer.borrow().deadline_ms()
    }

    /// Commit if the quiet period has elapsed on `clock`.
    pub fn poll(&self) -> Result<bool, StoreError> {
        let now = self.clock.now_ms();
        self.writer.borrow_mut().poll(now)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.writer.borrow_mut().flush()
    }
}

impl<S: KeyValueStore, C: Clock> KeyValueStore for DebouncedStore<S, C> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.writer.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = self.clock.now_ms();
        self.writer.borrow_mut().stage(key, value.to_string(), now);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let now = self.clock.now_ms();
        self.writer.borrow_mut().stage_remove(key, now);
        Ok(())
    }
}

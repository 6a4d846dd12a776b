//! Change bus - per-session observer registry keyed by storage key
//!
//! Writes made by this session are announced with `publish`. Writes made by
//! other sessions sharing the same medium are discovered by `sync_external`,
//! which walks the medium's revision log from the bus cursor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<String, Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&mut self, key: &str, id: u64) {
        if let Some(list) = self.listeners.get_mut(key) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                self.listeners.remove(key);
            }
        }
    }
}

/// Observer registry for one session
pub struct ChangeBus {
    kv: Arc<dyn KeyValueStore>,
    origin: String,
    cursor: Mutex<u64>,
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    /// Create a bus whose cursor starts at the medium's current revision
    pub fn new(kv: Arc<dyn KeyValueStore>, origin: impl Into<String>) -> Result<Self> {
        let cursor = kv.latest_revision()?;
        Ok(Self {
            kv,
            origin: origin.into(),
            cursor: Mutex::new(cursor),
            registry: Arc::new(Mutex::new(Registry::default())),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Register `listener` for signals on `key`
    pub fn listen(
        &self,
        key: impl Into<String>,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let key = key.into();
        let mut registry = match self.registry.lock() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(key.clone())
            .or_default()
            .push((id, Arc::new(listener)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            key,
            id,
        }
    }

    /// Signal every listener registered on `key`
    ///
    /// Listeners run after the registry lock is released, so they may
    /// subscribe, unsubscribe or write again.
    pub fn publish(&self, key: &str) {
        let listeners: Vec<Listener> = {
            let registry = match self.registry.lock() {
                Ok(r) => r,
                Err(poisoned) => poisoned.into_inner(),
            };
            registry
                .listeners
                .get(key)
                .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };

        for listener in listeners {
            listener();
        }
    }

    /// Signal listeners for writes made by other sessions since the last
    /// sync; returns the number of keys signaled
    pub fn sync_external(&self) -> Result<usize> {
        let keys: Vec<String> = {
            let mut cursor = self
                .cursor
                .lock()
                .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
            let changes = self.kv.changes_since(*cursor)?;
            if let Some(last) = changes.last() {
                *cursor = last.revision;
            }
            changes
                .into_iter()
                .filter(|c| c.origin != self.origin)
                .map(|c| c.key)
                .collect()
        };

        for key in &keys {
            self.publish(key);
        }
        Ok(keys.len())
    }

    /// Number of live listeners on `key`
    pub fn listener_count(&self, key: &str) -> usize {
        self.registry
            .lock()
            .map(|r| r.listeners.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

/// Handle to a registered listener; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stop receiving signals
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = match registry.lock() {
                Ok(r) => r,
                Err(poisoned) => poisoned.into_inner(),
            };
            registry.remove(&self.key, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_publish_reaches_only_matching_key() {
        let bus = ChangeBus::new(Arc::new(MemoryKeyValueStore::new()), "tab-1").unwrap();
        let (a_count, a) = counter();
        let (b_count, b) = counter();
        let _sa = bus.listen("a", a);
        let _sb = bus.listen("b", b);

        bus.publish("a");
        bus.publish("a");
        assert_eq!(a_count.load(Ordering::SeqCst), 2);
        assert_eq!(b_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_and_unsubscribe_release_listener() {
        let bus = ChangeBus::new(Arc::new(MemoryKeyValueStore::new()), "tab-1").unwrap();
        let (count, cb) = counter();
        let sub = bus.listen("k", cb);
        assert_eq!(bus.listener_count("k"), 1);
        sub.unsubscribe();
        assert_eq!(bus.listener_count("k"), 0);

        {
            let (_, cb) = counter();
            let _sub = bus.listen("k", cb);
            assert_eq!(bus.listener_count("k"), 1);
        }
        assert_eq!(bus.listener_count("k"), 0);

        bus.publish("k");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_subscribe_reentrantly() {
        let bus = Arc::new(ChangeBus::new(Arc::new(MemoryKeyValueStore::new()), "t").unwrap());
        let held: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));
        let bus2 = bus.clone();
        let held2 = held.clone();
        let _sub = bus.listen("k", move || {
            let sub = bus2.listen("other", || {});
            held2.lock().unwrap().push(sub);
        });

        bus.publish("k");
        assert_eq!(bus.listener_count("other"), 1);
        held.lock().unwrap().clear();
    }

    #[test]
    fn test_sync_external_skips_own_origin() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let bus_a = ChangeBus::new(kv.clone(), "tab-a").unwrap();
        let bus_b = ChangeBus::new(kv.clone(), "tab-b").unwrap();

        let (a_count, a) = counter();
        let (b_count, b) = counter();
        let _sa = bus_a.listen("k", a);
        let _sb = bus_b.listen("k", b);

        kv.set("k", "[]", "tab-a").unwrap();

        assert_eq!(bus_a.sync_external().unwrap(), 0);
        assert_eq!(bus_b.sync_external().unwrap(), 1);
        assert_eq!(a_count.load(Ordering::SeqCst), 0);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);

        // cursor advanced: nothing new
        assert_eq!(bus_b.sync_external().unwrap(), 0);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = ChangeBus::new(Arc::new(MemoryKeyValueStore::new()), "t").unwrap();
        let sub = bus.listen("k", || {});
        drop(bus);
        drop(sub);
    }
}

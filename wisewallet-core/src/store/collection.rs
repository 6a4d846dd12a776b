//! Per-user record collection - record store plus change bus for one kind

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::User;

use super::{ChangeBus, EntityKind, KeySpace, RecordStore, Subscription};

/// One entity kind of every user's data
///
/// Every mutation is a full read-modify-write of the user's list followed by
/// a `publish` on its key.
#[derive(Clone)]
pub struct UserCollection {
    store: Arc<RecordStore>,
    bus: Arc<ChangeBus>,
    keys: KeySpace,
    kind: EntityKind,
}

impl UserCollection {
    pub fn new(
        store: Arc<RecordStore>,
        bus: Arc<ChangeBus>,
        keys: KeySpace,
        kind: EntityKind,
    ) -> Self {
        Self {
            store,
            bus,
            keys,
            kind,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn key(&self, user: &User) -> String {
        self.keys.entity_key(&user.uid, self.kind)
    }

    pub fn load<T: DeserializeOwned>(&self, user: &User) -> Vec<T> {
        self.store.load(&self.key(user))
    }

    /// Whether the user has a stored list at all
    pub fn is_stored(&self, user: &User) -> Result<bool> {
        self.store.exists(&self.key(user))
    }

    /// Save the list and notify subscribers
    pub fn persist<T: Serialize>(&self, user: &User, records: &[T]) -> Result<()> {
        let key = self.key(user);
        self.store.save(&key, records)?;
        self.bus.publish(&key);
        Ok(())
    }

    /// Deliver the user's list to `callback` now and after every change
    ///
    /// `view` shapes the loaded list before delivery (e.g. sorting).
    pub fn subscribe<T, V, F>(&self, user: &User, view: V, callback: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        V: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let key = self.key(user);
        let store = self.store.clone();
        let load_key = key.clone();
        let deliver = move || callback(view(store.load(&load_key)));

        deliver();
        self.bus.listen(key, deliver)
    }
}

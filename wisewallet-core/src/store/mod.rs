//! Local data store with change notification
//!
//! `keys` derives storage keys, `records` persists typed record lists, and
//! `bus` signals subscribers when a key changes in this or another session.

mod bus;
mod collection;
mod keys;
pub mod records;

pub use bus::{ChangeBus, Subscription};
pub use collection::UserCollection;
pub use keys::{EntityKind, KeySpace, DEFAULT_APP_ID, SESSION_KEY};
pub use records::RecordStore;

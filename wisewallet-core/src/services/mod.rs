//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod advice;
mod analytics;
mod auth;
mod budgets;
pub mod export;
pub mod logging;
pub mod migration;
mod savings;
mod transactions;

pub use advice::{
    AdviceService, DEFAULT_RECENT_LIMIT, EMPTY_REPLY_MESSAGE, FAILURE_MESSAGE, MISSING_KEY_MESSAGE,
};
pub use analytics::{
    AnalyticsService, BudgetUsage, CategoryShare, MonthlyPoint, SavingsProgress, Totals,
};
pub use auth::AuthService;
pub use budgets::BudgetService;
pub use export::{ExportFormat, ExportService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use savings::SavingsService;
pub use transactions::TransactionService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::adapters::MemoryKeyValueStore;
    use crate::store::{ChangeBus, EntityKind, KeySpace, RecordStore, UserCollection};

    /// Collection over a fresh in-memory store
    pub fn collection(kind: EntityKind) -> UserCollection {
        collection_on(Arc::new(MemoryKeyValueStore::new()), kind)
    }

    /// Collection over `kv`, for tests that inspect raw stored values
    pub fn collection_on(kv: Arc<MemoryKeyValueStore>, kind: EntityKind) -> UserCollection {
        let store = Arc::new(RecordStore::new(kv.clone(), "test"));
        let bus = Arc::new(ChangeBus::new(kv, "test").unwrap());
        UserCollection::new(store, bus, KeySpace::default(), kind)
    }
}

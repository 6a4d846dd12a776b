//! Wise Wallet Core - local-first personal finance tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Transaction, Budget, SavingsGoal, User)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore, AdviceProvider)
//! - **store**: Record store and change bus over the key-value port
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, memory, Gemini)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use adapters::{DuckDbKeyValueStore, GeminiAdviceProvider, MemoryKeyValueStore};
use config::Config;
use ports::{AdviceProvider, KeyValueStore};
use services::*;
use store::{ChangeBus, EntityKind, KeySpace, RecordStore, UserCollection};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Budget, Category, NewTransaction, SavingsGoal, Transaction, TransactionType, User};
pub use store::Subscription;

/// Store database file inside the data directory
pub const DB_FILENAME: &str = "wallet.duckdb";

/// Main context for one Wise Wallet session
///
/// Owns the session's origin id, its key namespace and its change bus, plus
/// every service. Several contexts over the same medium behave like several
/// browser tabs over one local storage.
pub struct WalletContext {
    pub config: Config,
    pub keys: KeySpace,
    pub kv: Arc<dyn KeyValueStore>,
    pub store: Arc<RecordStore>,
    pub bus: Arc<ChangeBus>,
    pub logger: Option<Arc<LoggingService>>,
    pub auth_service: AuthService,
    pub transaction_service: TransactionService,
    pub budget_service: BudgetService,
    pub savings_service: SavingsService,
    pub analytics_service: AnalyticsService,
    pub export_service: ExportService,
    pub advice_service: AdviceService,
}

impl WalletContext {
    /// Open the session over `<data_dir>/wallet.duckdb`, logging to
    /// `<data_dir>/logs.duckdb`
    pub fn new(data_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let kv: Arc<dyn KeyValueStore> =
            Arc::new(DuckDbKeyValueStore::new(&data_dir.join(DB_FILENAME))?);
        let logger = LoggingService::new(data_dir, entry_point, env!("CARGO_PKG_VERSION"))
            .ok()
            .map(Arc::new);

        Self::with_store(config, kv, logger)
    }

    /// Session over a fresh in-memory medium
    pub fn in_memory() -> Result<Self> {
        Self::with_store(Config::default(), Arc::new(MemoryKeyValueStore::new()), None)
    }

    /// Session over an existing medium; each call gets a new origin id
    pub fn with_store(
        config: Config,
        kv: Arc<dyn KeyValueStore>,
        logger: Option<Arc<LoggingService>>,
    ) -> Result<Self> {
        let origin = Uuid::new_v4().to_string();
        let keys = KeySpace::new(config.app_id.clone());

        let mut record_store = RecordStore::new(Arc::clone(&kv), origin.clone());
        if let Some(l) = &logger {
            record_store = record_store.with_logger(Arc::clone(l));
        }
        let store = Arc::new(record_store);
        let bus = Arc::new(ChangeBus::new(Arc::clone(&kv), origin)?);

        let collection = |kind: EntityKind| {
            UserCollection::new(Arc::clone(&store), Arc::clone(&bus), keys.clone(), kind)
        };

        let mut auth_service = AuthService::new(Arc::clone(&store), Arc::clone(&bus), keys.clone());
        let mut advice_service =
            AdviceService::new(advice_provider(&config)).with_recent_limit(config.advice.recent_limit);
        if let Some(l) = &logger {
            auth_service = auth_service.with_logger(Arc::clone(l));
            advice_service = advice_service.with_logger(Arc::clone(l));
        }

        let transaction_service = TransactionService::new(collection(EntityKind::Transactions));
        let budget_service = BudgetService::new(collection(EntityKind::Budgets));
        let savings_service = SavingsService::new(collection(EntityKind::Savings));

        Ok(Self {
            transaction_service,
            budget_service,
            savings_service,
            analytics_service: AnalyticsService::new(),
            export_service: ExportService::new(),
            auth_service,
            advice_service,
            config,
            keys,
            kv,
            store,
            bus,
            logger,
        })
    }

    /// Origin id stamped on this session's writes
    pub fn origin(&self) -> &str {
        self.store.origin()
    }

    /// Deliver writes made by other sessions to this session's subscribers
    pub fn sync_external(&self) -> Result<usize> {
        Ok(self.bus.sync_external()?)
    }
}

/// Gemini provider when an API key is configured
fn advice_provider(config: &Config) -> Option<Arc<dyn AdviceProvider>> {
    let api_key = config.advice.api_key.as_deref()?;
    GeminiAdviceProvider::with_options(api_key, &config.advice.model, &config.advice.endpoint)
        .ok()
        .map(|p| Arc::new(p) as Arc<dyn AdviceProvider>)
}

//! Advice service - turns recent transactions into free-text guidance
//!
//! Never fails: a missing provider, an empty reply and a provider error
//! each map to a fixed message.

use std::sync::Arc;

use crate::domain::Transaction;
use crate::ports::{AdviceEntry, AdviceProvider};
use crate::services::logging::{log_quietly, LogEvent, LoggingService};

pub const MISSING_KEY_MESSAGE: &str = "API Key is missing. Unable to generate insights.";
pub const EMPTY_REPLY_MESSAGE: &str = "No insights available at the moment.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, I couldn't analyze your data right now. Please try again later.";

/// Number of most recent transactions sent to the provider
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Advice service
pub struct AdviceService {
    provider: Option<Arc<dyn AdviceProvider>>,
    recent_limit: usize,
    logger: Option<Arc<LoggingService>>,
}

impl AdviceService {
    pub fn new(provider: Option<Arc<dyn AdviceProvider>>) -> Self {
        Self {
            provider,
            recent_limit: DEFAULT_RECENT_LIMIT,
            logger: None,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Advice for `transactions` (newest first, as listed)
    pub async fn get_advice(&self, transactions: &[Transaction]) -> String {
        let Some(provider) = &self.provider else {
            return MISSING_KEY_MESSAGE.to_string();
        };

        let recent: Vec<AdviceEntry> = transactions
            .iter()
            .take(self.recent_limit)
            .map(AdviceEntry::from)
            .collect();

        match provider.advise(&recent).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_MESSAGE.to_string(),
            Ok(text) => text,
            Err(e) => {
                log_quietly(
                    self.logger.as_deref(),
                    LogEvent::new("advice_failed")
                        .with_entity(provider.name())
                        .with_error(e.to_string()),
                );
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::{Error, Result};
    use crate::domain::{Category, NewTransaction, TransactionType};
    use crate::services::logging::EntryPoint;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Provider returning a canned reply and recording what it was sent
    struct StubProvider {
        reply: Result<String>,
        seen: Mutex<Vec<usize>>,
    }

    impl StubProvider {
        fn replying(reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AdviceProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn advise(&self, recent: &[AdviceEntry]) -> Result<String> {
            self.seen.lock().unwrap().push(recent.len());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::advice(e.to_string())),
            }
        }
    }

    fn transactions(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| {
                NewTransaction::new(
                    Decimal::new(i as i64 + 1, 0),
                    TransactionType::Expense,
                    Category::Other,
                    format!("t{}", i),
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                )
                .into_transaction(Utc::now())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_missing_provider() {
        let service = AdviceService::new(None);
        assert_eq!(service.get_advice(&transactions(3)).await, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_only_recent_transactions_are_sent() {
        let stub = StubProvider::replying(Ok("- Spend less".to_string()));
        let service = AdviceService::new(Some(stub.clone()));

        assert_eq!(service.get_advice(&transactions(25)).await, "- Spend less");
        assert_eq!(*stub.seen.lock().unwrap(), vec![20]);
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let stub = StubProvider::replying(Ok("  ".to_string()));
        let service = AdviceService::new(Some(stub));
        assert_eq!(service.get_advice(&transactions(1)).await, EMPTY_REPLY_MESSAGE);
    }

    #[tokio::test]
    async fn test_provider_error_is_replaced_and_logged() {
        let logger = Arc::new(LoggingService::in_memory(EntryPoint::Library, "test").unwrap());
        let stub = StubProvider::replying(Err(Error::advice("boom")));
        let service = AdviceService::new(Some(stub)).with_logger(logger.clone());

        assert_eq!(service.get_advice(&transactions(1)).await, FAILURE_MESSAGE);
        let errors = logger.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "advice_failed");
    }
}

//! Export service - CSV and JSON renderings of a transaction list

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'csv' or 'json'", s)),
        }
    }
}

const CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Description", "Amount"];

fn two_decimals(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Export service
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// `wise-wallet-export-<YYYY-MM-DD>.<ext>`
    pub fn file_name(&self, format: ExportFormat, today: NaiveDate) -> String {
        format!(
            "wise-wallet-export-{}.{}",
            today.format("%Y-%m-%d"),
            format.extension()
        )
    }

    pub fn render(&self, format: ExportFormat, transactions: &[Transaction]) -> Result<String> {
        match format {
            ExportFormat::Csv => self.to_csv(transactions),
            ExportFormat::Json => self.to_json(transactions),
        }
    }

    /// One row per transaction; text fields quoted, amount with 2 decimals
    pub fn to_csv(&self, transactions: &[Transaction]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER)?;
        for t in transactions {
            writer.write_record([
                t.date.format("%Y-%m-%d").to_string(),
                t.kind.to_string(),
                t.category.to_string(),
                t.description.clone(),
                two_decimals(t.amount),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Other(format!("Failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
    }

    /// Pretty-printed array of the stored records
    pub fn to_json(&self, transactions: &[Transaction]) -> Result<String> {
        Ok(serde_json::to_string_pretty(transactions)?)
    }
}

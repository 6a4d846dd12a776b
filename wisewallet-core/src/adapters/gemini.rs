//! Gemini advice provider
//!
//! Calls the `generateContent` endpoint of the Gemini API with a fixed
//! system instruction and the user's recent transactions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::ports::{AdviceEntry, AdviceProvider};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT_SECS: u64 = 30;

const SYSTEM_INSTRUCTION: &str = "You are an expert financial advisor named \"WiseBot\".
Your goal is to analyze the user's transaction history and provide brief, encouraging, and actionable financial advice.
Focus on spending patterns, potential savings, and budget health.
Keep your response under 100 words.
Structure the response as 3 short bullet points.";

// =============================================================================
// API request / response models
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

fn text_content(role: Option<&str>, text: String) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part { text }],
    }
}

/// User prompt embedding the transactions as JSON
fn build_prompt(recent: &[AdviceEntry]) -> Result<String> {
    let json = serde_json::to_string(recent)?;
    Ok(format!(
        "Here are my recent transactions: {}. What are your insights?",
        json
    ))
}

/// Concatenated text of the first candidate; empty when there is none
fn extract_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Gemini API client
pub struct GeminiAdviceProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiAdviceProvider {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_MODEL, DEFAULT_ENDPOINT)
    }

    pub fn with_options(api_key: &str, model: &str, endpoint: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::advice(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::advice(format!(
                "Connection timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::advice("Unable to connect to Gemini servers")
        } else {
            Error::advice(format!("Gemini request failed: {}", error))
        }
    }

    fn check_response_status(&self, status: reqwest::StatusCode) -> Result<()> {
        match status.as_u16() {
            200 => Ok(()),
            400 => Err(Error::advice("Gemini rejected the request.")),
            401 | 403 => Err(Error::advice(
                "Gemini authentication failed. Your API key may be invalid.",
            )),
            429 => Err(Error::advice(
                "Gemini rate limit exceeded. Please wait a moment and try again.",
            )),
            status => Err(Error::advice(format!("Gemini API error: HTTP {}", status))),
        }
    }
}

#[async_trait]
impl AdviceProvider for GeminiAdviceProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn advise(&self, recent: &[AdviceEntry]) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: text_content(None, SYSTEM_INSTRUCTION.to_string()),
            contents: vec![text_content(Some("user"), build_prompt(recent)?)],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(response.status())?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::advice(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(extract_text(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, TransactionType};
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_key_rejected() {
        assert!(GeminiAdviceProvider::new("  ").is_err());
    }

    #[test]
    fn test_url() {
        let provider =
            GeminiAdviceProvider::with_options("k", DEFAULT_MODEL, "http://localhost:9/v1/").unwrap();
        assert_eq!(
            provider.url(),
            "http://localhost:9/v1/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let entry = AdviceEntry {
            date: "2024-01-01".to_string(),
            kind: TransactionType::Expense,
            category: Category::Groceries,
            amount: Decimal::new(50, 0),
            description: "Milk".to_string(),
        };
        let request = GenerateRequest {
            system_instruction: text_content(None, SYSTEM_INSTRUCTION.to_string()),
            contents: vec![text_content(Some("user"), build_prompt(&[entry]).unwrap())],
        };
        let value = serde_json::to_value(&request).unwrap();

        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("WiseBot"));
        assert!(value["systemInstruction"].get("role").is_none());
        let prompt = value["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains(r#""type":"Expense""#));
        assert!(prompt.contains(r#""description":"Milk""#));
    }

    #[test]
    fn test_extract_text() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"- Save "},{"text":"more\n"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(body), "- Save more");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(empty), "");
    }
}

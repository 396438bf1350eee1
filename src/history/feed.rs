//! History Feed
//!
//! Paginated transfer history served by the bridge indexer.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::error::HistoryError;
use super::types::HistoryRecord;

/// Query for one page of history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryFilter {
    /// Accounts whose transfers are wanted; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "join_accounts")]
    pub accounts: Vec<String>,
    /// Zero-based page index
    pub page: u32,
    pub page_size: u32,
}

impl HistoryFilter {
    pub fn new(accounts: Vec<String>, page_size: u32) -> Self {
        Self {
            accounts,
            page: 0,
            page_size,
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

fn join_accounts<S: serde::Serializer>(accounts: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&accounts.join(","))
}

#[async_trait]
pub trait HistoryFeed: Send + Sync {
    /// Records newest first. A page shorter than `page_size` is the last one.
    async fn fetch_page(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>, HistoryError>;
}

/// Indexer HTTP endpoint returning a JSON array of records
pub struct HttpHistoryFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpHistoryFeed {
    pub fn new(url: impl Into<String>) -> Result<Self, HistoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HistoryError::Feed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl HistoryFeed for HttpHistoryFeed {
    async fn fetch_page(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>, HistoryError> {
        debug!(url = %self.url, page = filter.page, "Fetching history page");

        let response = self
            .client
            .get(&self.url)
            .query(filter)
            .send()
            .await
            .map_err(|e| HistoryError::Feed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Feed(format!("Indexer returned {}", status)));
        }

        response
            .json::<Vec<HistoryRecord>>()
            .await
            .map_err(|e| HistoryError::Feed(format!("Failed to parse response: {}", e)))
    }
}


#[cfg(test)]
pub use mock::MockHistoryFeed;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info};

use leadscout_common::{Lead, LeadScoutError, Platform, SHEET_HEADER};
use sheets_client::SheetsClient;

use crate::traits::{LeadStore, SeenKeys};

/// All data rows (header excluded), full column width.
const DATA_RANGE: &str = "Sheet1!A2:N";
const APPEND_RANGE: &str = "Sheet1!A1:N1";

// Column positions within the sheet row, per SHEET_HEADER.
const COL_PLATFORM: usize = 2;
const COL_AUTHOR: usize = 3;
const COL_POST_URL: usize = 5;

/// Append-only lead record backed by a Google Sheet.
///
/// Keeps its own identity-key cache so `append` can re-check duplication at
/// the store level. That check is authoritative; the pipeline's index is
/// just a pre-filter.
pub struct SheetsLeadStore {
    client: SheetsClient,
    spreadsheet_id: String,
    seen: Mutex<SeenKeys>,
}

impl SheetsLeadStore {
    /// Open the named spreadsheet, creating it with a header row when missing.
    pub async fn connect(client: SheetsClient, name: &str) -> Result<Self> {
        let spreadsheet_id = match client
            .find_spreadsheet(name)
            .await
            .context("Spreadsheet lookup failed")?
        {
            Some(id) => id,
            None => {
                info!(name, "Spreadsheet not found, creating");
                let id = client
                    .create_spreadsheet(name)
                    .await
                    .context("Spreadsheet creation failed")?;
                let header = SHEET_HEADER.iter().map(|s| s.to_string()).collect();
                client
                    .append_row(&id, APPEND_RANGE, header)
                    .await
                    .context("Failed to write header row")?;
                id
            }
        };

        Ok(Self {
            client,
            spreadsheet_id,
            seen: Mutex::new(SeenKeys::default()),
        })
    }

    fn keys_from_rows(rows: Vec<Vec<String>>) -> SeenKeys {
        let mut seen = SeenKeys::default();
        for row in rows {
            if let Some(url) = row.get(COL_POST_URL) {
                if !url.is_empty() {
                    seen.post_urls.insert(url.clone());
                }
            }
            if let (Some(platform), Some(handle)) = (row.get(COL_PLATFORM), row.get(COL_AUTHOR)) {
                if let Some(platform) = Platform::parse(platform) {
                    if !handle.is_empty() {
                        seen.authors.insert((platform, handle.clone()));
                    }
                }
            }
        }
        seen
    }
}

#[async_trait]
impl LeadStore for SheetsLeadStore {
    async fn load_seen(&self) -> Result<SeenKeys> {
        let rows = self
            .client
            .read_rows(&self.spreadsheet_id, DATA_RANGE)
            .await
            .map_err(|e| LeadScoutError::Persistence(e.to_string()))?;

        let keys = Self::keys_from_rows(rows);

        // Refresh the store-level cache from the same snapshot
        *self.seen.lock().await = keys.clone();

        Ok(keys)
    }

    async fn append(&self, lead: &Lead) -> Result<bool> {
        {
            let seen = self.seen.lock().await;
            if seen.contains(lead) {
                info!(
                    platform = %lead.platform,
                    author = lead.author_handle.as_str(),
                    "Store rejected duplicate lead"
                );
                return Ok(false);
            }
        }

        if let Err(e) = self
            .client
            .append_row(&self.spreadsheet_id, APPEND_RANGE, lead.to_row())
            .await
        {
            let message = e.to_string();
            if message.contains("storageQuotaExceeded") {
                error!("Google Drive storage quota exceeded, cannot save lead. Free up space in the connected account.");
            } else {
                error!(error = %message, "Error writing to sheet");
            }
            return Err(LeadScoutError::Persistence(message).into());
        }

        self.seen.lock().await.insert(lead);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_extracted_from_rows() {
        let rows = vec![
            vec![
                "id1".to_string(),
                "2026-01-01T00:00:00Z".to_string(),
                "Reddit".to_string(),
                "alice".to_string(),
                String::new(),
                "https://www.reddit.com/r/a/1/".to_string(),
            ],
            vec![
                "id2".to_string(),
                "2026-01-02T00:00:00Z".to_string(),
                "X".to_string(),
                "bob".to_string(),
                String::new(),
                "https://x.com/bob/status/2".to_string(),
            ],
        ];
        let keys = SheetsLeadStore::keys_from_rows(rows);
        assert!(keys.post_urls.contains("https://www.reddit.com/r/a/1/"));
        assert!(keys
            .authors
            .contains(&(Platform::Reddit, "alice".to_string())));
        assert!(keys.authors.contains(&(Platform::X, "bob".to_string())));
    }

    #[test]
    fn short_and_malformed_rows_are_skipped() {
        let rows = vec![
            vec!["id-only".to_string()],
            vec![
                "id".to_string(),
                "ts".to_string(),
                "NotAPlatform".to_string(),
                "carol".to_string(),
                String::new(),
                String::new(),
            ],
        ];
        let keys = SheetsLeadStore::keys_from_rows(rows);
        assert!(keys.post_urls.is_empty());
        assert!(keys.authors.is_empty());
    }
}

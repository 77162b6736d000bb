pub mod auth;
pub mod error;
pub mod types;

pub use auth::ServiceAccountKey;
pub use error::{Result, SheetsError};
pub use types::{DriveFile, DriveFileList, Spreadsheet, ValueRange};

use auth::TokenProvider;
use types::{AppendRequest, SpreadsheetCreateRequest, SpreadsheetProperties};

const SHEETS_URL: &str = "https://sheets.googleapis.com/v4";
const DRIVE_URL: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

pub struct SheetsClient {
    client: reqwest::Client,
    auth: TokenProvider,
    sheets_url: String,
    drive_url: String,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Self {
        let client = reqwest::Client::new();
        Self {
            auth: TokenProvider::new(key, client.clone()),
            client,
            sheets_url: SHEETS_URL.to_string(),
            drive_url: DRIVE_URL.to_string(),
        }
    }

    pub fn with_base_urls(mut self, sheets_url: impl Into<String>, drive_url: impl Into<String>) -> Self {
        self.sheets_url = sheets_url.into();
        self.drive_url = drive_url.into();
        self
    }

    /// Find a spreadsheet by exact name via a Drive query. Returns its ID if present.
    pub async fn find_spreadsheet(&self, name: &str) -> Result<Option<String>> {
        let token = self.auth.access_token().await?;
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_value(name),
            SPREADSHEET_MIME
        );

        let url = format!("{}/files", self.drive_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: DriveFileList = resp.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// Create a new spreadsheet with the given title. Returns its ID.
    pub async fn create_spreadsheet(&self, title: &str) -> Result<String> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/spreadsheets", self.sheets_url);
        let request = SpreadsheetCreateRequest {
            properties: SpreadsheetProperties {
                title: title.to_string(),
            },
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: Spreadsheet = resp.json().await?;
        tracing::info!(title, spreadsheet_id = %created.spreadsheet_id, "Created spreadsheet");
        Ok(created.spreadsheet_id)
    }

    /// Read all rows in the given A1 range. Missing trailing cells are
    /// absent, not empty strings, so callers index defensively.
    pub async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_url, spreadsheet_id, range
        );

        let resp = self.client.get(&url).bearer_auth(&token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let values: ValueRange = resp.json().await?;
        Ok(values.into_rows())
    }

    /// Append a single row after the last row of the given range's table.
    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<()> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.sheets_url, spreadsheet_id, range
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&AppendRequest { values: vec![row] })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}

/// Escape a value for embedding in a Drive query string literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

use serde::{Deserialize, Serialize};

// --- Drive v3 ---

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

// --- Sheets v4 ---

#[derive(Debug, Clone, Serialize)]
pub struct SpreadsheetCreateRequest {
    pub properties: SpreadsheetProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: String,
}

/// Cell values come back as heterogeneous JSON scalars; we normalize to strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppendRequest {
    pub values: Vec<Vec<String>>,
}

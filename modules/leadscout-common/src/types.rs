use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LeadScoutError;

/// Max excerpt length stored per post. Applied once at creation, never re-truncated.
pub const EXCERPT_MAX_CHARS: usize = 1000;

/// Urgency scores are 0-10; 0 means "not yet classified".
pub const URGENCY_MAX: u8 = 10;

/// Column order for the persisted sheet. The order is part of the external contract.
pub const SHEET_HEADER: [&str; 14] = [
    "lead_id",
    "timestamp_utc",
    "platform",
    "author_handle",
    "author_profile_url",
    "post_url",
    "post_excerpt",
    "pain_summary",
    "pain_category",
    "urgency_score",
    "suggested_outreach_message",
    "lead_status",
    "notes",
    "last_updated_utc",
];

/// Pain categories the classifier may assign.
pub const PAIN_CATEGORIES: [&str; 5] = [
    "Chasing updates",
    "Reporting delays",
    "Lack of visibility",
    "Tool overload",
    "Other",
];

// --- Platform ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Reddit,
    X,
    LinkedIn,
}

impl Platform {
    /// Parse the display form used in persisted rows.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Reddit" => Some(Platform::Reddit),
            "X" => Some(Platform::X),
            "LinkedIn" => Some(Platform::LinkedIn),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Reddit => write!(f, "Reddit"),
            Platform::X => write!(f, "X"),
            Platform::LinkedIn => write!(f, "LinkedIn"),
        }
    }
}

// --- Pain analysis ---

/// Structured judgment produced by the pain classifier. Validated before use;
/// a malformed judgment is a classification failure, never partial data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainAnalysis {
    pub has_pain: bool,
    pub pain_category: Option<String>,
    pub pain_summary: Option<String>,
    pub urgency_score: u8,
    pub reasoning: Option<String>,
}

impl PainAnalysis {
    pub fn validate(&self) -> Result<(), LeadScoutError> {
        if self.urgency_score > URGENCY_MAX {
            return Err(LeadScoutError::MalformedResponse(format!(
                "urgency_score {} out of range 0-{URGENCY_MAX}",
                self.urgency_score
            )));
        }
        if let Some(ref category) = self.pain_category {
            if !PAIN_CATEGORIES.contains(&category.as_str()) {
                return Err(LeadScoutError::MalformedResponse(format!(
                    "unknown pain_category: {category}"
                )));
            }
        }
        Ok(())
    }
}

// --- Lead ---

/// A discovered post, normalized across platforms. Owned by the pipeline for
/// the duration of one run; never mutated after being handed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: Uuid,
    pub timestamp_utc: DateTime<Utc>,
    pub platform: Platform,
    pub author_handle: String,
    pub author_profile_url: Option<String>,
    pub post_url: String,
    pub post_excerpt: String,

    // Enrichment results
    pub has_pain: bool,
    pub pain_category: Option<String>,
    pub pain_summary: Option<String>,
    pub urgency_score: u8,
    pub suggested_outreach_message: Option<String>,

    pub lead_status: String,
    pub notes: String,
    pub last_updated_utc: DateTime<Utc>,
}

impl Lead {
    /// Build a lead from raw platform data. The excerpt is truncated here,
    /// once, to `EXCERPT_MAX_CHARS` characters.
    pub fn new(
        platform: Platform,
        author_handle: impl Into<String>,
        post_url: impl Into<String>,
        excerpt: &str,
        author_profile_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            lead_id: Uuid::new_v4(),
            timestamp_utc: now,
            platform,
            author_handle: author_handle.into(),
            author_profile_url,
            post_url: post_url.into(),
            post_excerpt: truncate_chars(excerpt, EXCERPT_MAX_CHARS).to_string(),
            has_pain: false,
            pain_category: None,
            pain_summary: None,
            urgency_score: 0,
            suggested_outreach_message: None,
            lead_status: "New".to_string(),
            notes: String::new(),
            last_updated_utc: now,
        }
    }

    /// Refresh the update timestamp. Called on every enrichment mutation.
    pub fn touch(&mut self) {
        self.last_updated_utc = Utc::now();
    }

    /// Apply a validated classifier judgment. Category, summary, and reasoning
    /// are only carried for posts that actually express pain.
    pub fn apply_analysis(&mut self, analysis: PainAnalysis) {
        self.has_pain = analysis.has_pain;
        if analysis.has_pain {
            self.pain_category = analysis.pain_category;
            self.pain_summary = analysis.pain_summary;
            self.urgency_score = analysis.urgency_score;
            self.notes = analysis.reasoning.unwrap_or_default();
        }
        self.touch();
    }

    pub fn set_outreach(&mut self, message: String) {
        self.suggested_outreach_message = Some(message);
        self.touch();
    }

    /// Serialize into the order-significant sheet row.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.lead_id.to_string(),
            self.timestamp_utc.to_rfc3339(),
            self.platform.to_string(),
            self.author_handle.clone(),
            self.author_profile_url.clone().unwrap_or_default(),
            self.post_url.clone(),
            self.post_excerpt.clone(),
            self.pain_summary.clone().unwrap_or_default(),
            self.pain_category.clone().unwrap_or_default(),
            self.urgency_score.to_string(),
            self.suggested_outreach_message.clone().unwrap_or_default(),
            self.lead_status.clone(),
            self.notes.clone(),
            self.last_updated_utc.to_rfc3339(),
        ]
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

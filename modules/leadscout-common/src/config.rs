use std::env;

use tracing::info;

/// Default subreddits scanned for operational pain posts.
const DEFAULT_SUBREDDITS: [&str; 4] = ["askmanagers", "projectmanagement", "startups", "Entrepreneur"];

/// Default keywords used for pre-filtering and query construction.
const DEFAULT_KEYWORDS: [&str; 13] = [
    "reporting",
    "visibility",
    "manage",
    "team",
    "growth",
    "excel",
    "sheet",
    "manual",
    "chasing",
    "automation",
    "ops",
    "operations",
    "dashboard",
];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Gemini
    pub gemini_api_key: String,

    // Reddit (public JSON API, no credentials needed)
    pub reddit_user_agent: String,

    // X (optional, unofficial client)
    pub twitter_username: Option<String>,
    pub twitter_email: Option<String>,
    pub twitter_password: Option<String>,

    // LinkedIn (optional, unofficial client)
    pub linkedin_username: Option<String>,
    pub linkedin_password: Option<String>,

    // Google Sheets
    pub google_service_account_json: String,
    pub spreadsheet_name: String,

    // Targeting
    pub subreddits: Vec<String>,
    pub keywords: Vec<String>,
    pub urgency_threshold: u8,

    // Scheduling
    pub discovery_interval_hours: u64,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: required_env("GEMINI_API_KEY"),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "LeadScout/1.0 (read-only)".to_string()),
            twitter_username: optional_env("TWITTER_USERNAME"),
            twitter_email: optional_env("TWITTER_EMAIL"),
            twitter_password: optional_env("TWITTER_PASSWORD"),
            linkedin_username: optional_env("LINKEDIN_USERNAME"),
            linkedin_password: optional_env("LINKEDIN_PASSWORD"),
            google_service_account_json: required_env("GOOGLE_SERVICE_ACCOUNT_JSON"),
            spreadsheet_name: env::var("SPREADSHEET_NAME")
                .unwrap_or_else(|_| "LeadScout Leads".to_string()),
            subreddits: list_env("SUBREDDITS", &DEFAULT_SUBREDDITS),
            keywords: list_env("KEYWORDS", &DEFAULT_KEYWORDS),
            urgency_threshold: env::var("URGENCY_THRESHOLD")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("URGENCY_THRESHOLD must be a number 0-10"),
            discovery_interval_hours: env::var("DISCOVERY_INTERVAL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("DISCOVERY_INTERVAL_HOURS must be a number"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }

    /// The X adapter needs a full credential set to authenticate.
    pub fn twitter_enabled(&self) -> bool {
        self.twitter_username.is_some() && self.twitter_password.is_some()
    }

    pub fn linkedin_enabled(&self) -> bool {
        self.linkedin_username.is_some() && self.linkedin_password.is_some()
    }

    /// Log the effective configuration without exposing any secret values.
    pub fn log_redacted(&self) {
        info!(
            spreadsheet = %self.spreadsheet_name,
            subreddits = self.subreddits.len(),
            keywords = self.keywords.len(),
            urgency_threshold = self.urgency_threshold,
            interval_hours = self.discovery_interval_hours,
            twitter_enabled = self.twitter_enabled(),
            linkedin_enabled = self.linkedin_enabled(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

/// Empty strings count as unset so that `FOO=` in an env file disables a source.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn list_env(key: &str, defaults: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => parse_list(&raw),
        Err(_) => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

/// Parse a comma-separated list, trimming whitespace and dropping empties.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

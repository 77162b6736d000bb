use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadscout_common::{Lead, Platform};

use crate::traits::LeadSource;

const FETCH_LIMIT: u32 = 20;

/// How many keywords go into one search query before it gets unwieldy.
const QUERY_KEYWORD_CAP: usize = 5;

#[derive(Debug, Clone)]
pub struct XCredentials {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

/// X (Twitter) adapter. Credential-gated placeholder: X only exposes search
/// through login-walled unofficial clients, none with a maintained Rust
/// implementation. Query construction is kept here so wiring in a client is
/// a drop-in change; until then the fetch reports no candidates.
pub struct XSource {
    credentials: Option<XCredentials>,
}

impl XSource {
    pub fn new(credentials: Option<XCredentials>) -> Self {
        if credentials.is_none() {
            info!("X credentials not provided, source disabled");
        }
        Self { credentials }
    }
}

#[async_trait]
impl LeadSource for XSource {
    fn platform(&self) -> Platform {
        Platform::X
    }

    fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn fetch_limit(&self) -> u32 {
        FETCH_LIMIT
    }

    async fn fetch(&self, keywords: &[String], limit: u32) -> Result<Vec<Lead>> {
        let query = build_search_query(keywords);
        info!(
            query,
            limit, "X search not wired to a stable endpoint yet, returning no candidates"
        );
        Ok(Vec::new())
    }
}

/// Build an X search query: top keywords OR-joined, retweets excluded.
pub(crate) fn build_search_query(keywords: &[String]) -> String {
    let joined = keywords
        .iter()
        .take(QUERY_KEYWORD_CAP)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({joined}) -filter:retweets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_caps_keywords_and_excludes_retweets() {
        let keywords: Vec<String> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            build_search_query(&keywords),
            "(a OR b OR c OR d OR e) -filter:retweets"
        );
    }

    #[test]
    fn disabled_without_credentials() {
        assert!(!XSource::new(None).enabled());
        assert!(XSource::new(Some(XCredentials {
            username: "u".to_string(),
            email: None,
            password: "p".to_string(),
        }))
        .enabled());
    }
}

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadscout_common::{Lead, Platform};

use crate::traits::LeadSource;

const FETCH_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct LinkedInCredentials {
    pub username: String,
    pub password: String,
}

/// LinkedIn adapter. Credential-gated placeholder: LinkedIn has no public
/// read API for feed search, only unofficial clients prone to auth
/// challenges. Kept behind the same trait so the pipeline is untouched when
/// a real client lands.
pub struct LinkedInSource {
    credentials: Option<LinkedInCredentials>,
}

impl LinkedInSource {
    pub fn new(credentials: Option<LinkedInCredentials>) -> Self {
        if credentials.is_none() {
            info!("LinkedIn credentials not provided, source disabled");
        }
        Self { credentials }
    }
}

#[async_trait]
impl LeadSource for LinkedInSource {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn fetch_limit(&self) -> u32 {
        FETCH_LIMIT
    }

    async fn fetch(&self, _keywords: &[String], limit: u32) -> Result<Vec<Lead>> {
        info!(
            limit,
            "LinkedIn search not wired to a stable endpoint yet, returning no candidates"
        );
        Ok(Vec::new())
    }
}

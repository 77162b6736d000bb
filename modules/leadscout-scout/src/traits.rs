// Trait abstractions for the discovery pipeline's external collaborators.
//
// LeadSource: one adapter per platform, producing candidate posts.
// LeadAnalyzer: pain classification and outreach drafting.
// LeadStore: the durable, append-only lead record.
//
// These enable deterministic testing with MockSource, MockAnalyzer and
// MemoryLeadStore: no network, no credentials. `cargo test` in seconds.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use leadscout_common::{Lead, PainAnalysis, Platform};

/// Identity keys already persisted in the lead store, bulk-read at run start.
#[derive(Debug, Clone, Default)]
pub struct SeenKeys {
    pub post_urls: HashSet<String>,
    pub authors: HashSet<(Platform, String)>,
}

impl SeenKeys {
    pub fn insert(&mut self, lead: &Lead) {
        self.post_urls.insert(lead.post_url.clone());
        self.authors
            .insert((lead.platform, lead.author_handle.clone()));
    }

    pub fn contains(&self, lead: &Lead) -> bool {
        self.post_urls.contains(&lead.post_url)
            || self
                .authors
                .contains(&(lead.platform, lead.author_handle.clone()))
    }
}

#[async_trait]
pub trait LeadSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Whether this adapter has the credentials it needs.
    /// Disabled sources are skipped without a fetch call.
    fn enabled(&self) -> bool {
        true
    }

    /// How many posts to request per run on this platform.
    fn fetch_limit(&self) -> u32;

    /// Fetch recent candidate posts matching the keywords. Returns an empty
    /// vec for "no results"; errors only for transport/auth failure. Bounded
    /// by the adapter's own timeouts, never blocks indefinitely.
    async fn fetch(&self, keywords: &[String], limit: u32) -> Result<Vec<Lead>>;
}

#[async_trait]
pub trait LeadAnalyzer: Send + Sync {
    /// Classify post text for operational pain. Validates its own output;
    /// fails rather than return partially-trusted data.
    async fn classify(&self, excerpt: &str) -> Result<PainAnalysis>;

    /// Draft a short outreach message for a qualified lead.
    async fn draft(&self, lead: &Lead) -> Result<String>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Full snapshot of persisted identity keys, read at pipeline-run start.
    async fn load_seen(&self) -> Result<SeenKeys>;

    /// Append a lead to the durable record. Re-checks duplication at the
    /// store level and returns `false` when rejected as a duplicate; errors
    /// only when the write itself fails.
    async fn append(&self, lead: &Lead) -> Result<bool>;
}

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use leadscout_common::{Config, Lead, LeadScoutError};
use sheets_client::{ServiceAccountKey, SheetsClient};

use crate::analyzer::GeminiAnalyzer;
use crate::dedup::DedupIndex;
use crate::sources::{LinkedInSource, RedditSource, XSource};
use crate::sources::linkedin::LinkedInCredentials;
use crate::sources::x::XCredentials;
use crate::store::SheetsLeadStore;
use crate::traits::{LeadAnalyzer, LeadSource, LeadStore};

/// Stats from a discovery run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoutStats {
    pub fetched: u32,
    pub saved: u32,
    pub dupes: u32,
    pub low_quality: u32,
}

impl std::fmt::Display for ScoutStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Discovery Run Complete ===")?;
        writeln!(f, "Candidates fetched: {}", self.fetched)?;
        writeln!(f, "Leads saved:        {}", self.saved)?;
        writeln!(f, "Duplicates:         {}", self.dupes)?;
        writeln!(f, "Low quality:        {}", self.low_quality)?;
        Ok(())
    }
}

/// Orchestrates one discovery run: fetch from every enabled source, then
/// take each candidate through dedup, classify, qualify, draft, persist.
/// The cheap checks short-circuit before the expensive model calls.
pub struct Scout {
    sources: Vec<Box<dyn LeadSource>>,
    analyzer: Box<dyn LeadAnalyzer>,
    store: Arc<dyn LeadStore>,
    keywords: Vec<String>,
    urgency_threshold: u8,
}

impl Scout {
    pub fn new(
        sources: Vec<Box<dyn LeadSource>>,
        analyzer: Box<dyn LeadAnalyzer>,
        store: Arc<dyn LeadStore>,
        keywords: Vec<String>,
        urgency_threshold: u8,
    ) -> Self {
        Self {
            sources,
            analyzer,
            store,
            keywords,
            urgency_threshold,
        }
    }

    /// Build the production wiring: Reddit + X + LinkedIn sources, Gemini
    /// analyzer, sheet-backed store.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let key = ServiceAccountKey::load(&config.google_service_account_json)
            .map_err(|e| LeadScoutError::Config(format!("Invalid GOOGLE_SERVICE_ACCOUNT_JSON: {e}")))?;
        let store = SheetsLeadStore::connect(SheetsClient::new(key), &config.spreadsheet_name)
            .await
            .context("Failed to open lead spreadsheet")?;

        let x_credentials = match (&config.twitter_username, &config.twitter_password) {
            (Some(username), Some(password)) => Some(XCredentials {
                username: username.clone(),
                email: config.twitter_email.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        let linkedin_credentials = match (&config.linkedin_username, &config.linkedin_password) {
            (Some(username), Some(password)) => Some(LinkedInCredentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        let sources: Vec<Box<dyn LeadSource>> = vec![
            Box::new(RedditSource::new(
                &config.reddit_user_agent,
                config.subreddits.clone(),
            )),
            Box::new(LinkedInSource::new(linkedin_credentials)),
            Box::new(XSource::new(x_credentials)),
        ];

        Ok(Self::new(
            sources,
            Box::new(GeminiAnalyzer::new(&config.gemini_api_key)),
            Arc::new(store),
            config.keywords.clone(),
            config.urgency_threshold,
        ))
    }

    /// Run a full discovery cycle. Always completes: adapter and candidate
    /// failures are isolated and logged, never escalated.
    pub async fn run(&self) -> Result<ScoutStats> {
        info!("Starting discovery cycle");
        let mut stats = ScoutStats::default();

        // Fresh snapshot per run; degrades to empty if the store is down
        let mut dedup = DedupIndex::load(self.store.as_ref()).await;

        let mut candidates: Vec<Lead> = Vec::new();
        for source in &self.sources {
            let platform = source.platform();
            if !source.enabled() {
                info!(%platform, "Source disabled, skipping");
                continue;
            }

            match source.fetch(&self.keywords, source.fetch_limit()).await {
                Ok(found) => {
                    info!(%platform, count = found.len(), "Fetched candidates");
                    candidates.extend(found);
                }
                Err(e) => {
                    // One failing source must not block the others
                    warn!(%platform, error = %e, "Source fetch failed, skipping");
                }
            }
        }

        stats.fetched = candidates.len() as u32;
        info!(total = stats.fetched, "Total raw candidates fetched");

        for lead in candidates {
            let post_url = lead.post_url.clone();
            if let Err(e) = self.process(lead, &mut dedup, &mut stats).await {
                // Per-candidate boundary: one bad candidate never ends the run
                error!(post_url, error = %e, "Error processing candidate");
            }
        }

        info!("{stats}");
        Ok(stats)
    }

    async fn process(
        &self,
        mut lead: Lead,
        dedup: &mut DedupIndex,
        stats: &mut ScoutStats,
    ) -> Result<()> {
        // Cheap check first: duplicates never reach the classifier
        if dedup.is_duplicate(&lead) {
            stats.dupes += 1;
            return Ok(());
        }

        match self.analyzer.classify(&lead.post_excerpt).await {
            Ok(analysis) => lead.apply_analysis(analysis),
            Err(e) => {
                // Unclassified candidates fail the quality gate naturally
                warn!(
                    post_url = lead.post_url.as_str(),
                    error = %e,
                    "Classification failed, treating as no pain"
                );
            }
        }

        if !lead.has_pain || lead.urgency_score < self.urgency_threshold {
            stats.low_quality += 1;
            return Ok(());
        }

        match self.analyzer.draft(&lead).await {
            Ok(message) if !message.is_empty() => lead.set_outreach(message),
            Ok(_) => {}
            Err(e) => {
                // A missing draft is not a reason to drop a qualified lead
                warn!(
                    post_url = lead.post_url.as_str(),
                    error = %e,
                    "Draft failed, persisting without message"
                );
            }
        }

        if self.store.append(&lead).await? {
            stats.saved += 1;
            dedup.mark_seen(&lead);
            info!(
                platform = %lead.platform,
                author = lead.author_handle.as_str(),
                "Saved lead"
            );
        } else {
            stats.dupes += 1;
        }

        Ok(())
    }
}

// Test mocks for the discovery pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockSource (LeadSource): fixed candidate list, optional failure
// - MockAnalyzer (LeadAnalyzer): excerpt-keyed verdicts with call recording
// - MemoryLeadStore (LeadStore): stateful in-memory record
//
// No network, no credentials.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use leadscout_common::{Lead, PainAnalysis, Platform};

use crate::traits::{LeadAnalyzer, LeadSource, LeadStore, SeenKeys};

/// Shorthand for a test candidate.
pub fn lead(platform: Platform, author: &str, url: &str, excerpt: &str) -> Lead {
    Lead::new(platform, author, url, excerpt, None)
}

/// A qualifying verdict at the given urgency.
pub fn pain(urgency: u8) -> PainAnalysis {
    PainAnalysis {
        has_pain: true,
        pain_category: Some("Reporting delays".to_string()),
        pain_summary: Some("buried in manual status reports".to_string()),
        urgency_score: urgency,
        reasoning: Some("author runs a team and is visibly frustrated".to_string()),
    }
}

/// A non-pain verdict.
pub fn no_pain() -> PainAnalysis {
    PainAnalysis {
        has_pain: false,
        pain_category: None,
        pain_summary: None,
        urgency_score: 0,
        reasoning: None,
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

pub struct MockSource {
    platform: Platform,
    leads: Vec<Lead>,
    enabled: bool,
    fail: bool,
    fetch_calls: Mutex<u32>,
}

impl MockSource {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            leads: Vec::new(),
            enabled: true,
            fail: false,
            fetch_calls: Mutex::new(0),
        }
    }

    pub fn with_leads(mut self, leads: Vec<Lead>) -> Self {
        self.leads = leads;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetch_calls.lock().unwrap()
    }
}

#[async_trait]
impl LeadSource for MockSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn fetch_limit(&self) -> u32 {
        25
    }

    async fn fetch(&self, _keywords: &[String], _limit: u32) -> Result<Vec<Lead>> {
        *self.fetch_calls.lock().unwrap() += 1;
        if self.fail {
            bail!("MockSource: transport failure");
        }
        Ok(self.leads.clone())
    }
}

// ---------------------------------------------------------------------------
// MockAnalyzer
// ---------------------------------------------------------------------------

/// Excerpt-keyed verdicts. Classify errors for unregistered excerpts and for
/// excerpts explicitly marked as failing; both paths record the call.
pub struct MockAnalyzer {
    verdicts: HashMap<String, PainAnalysis>,
    classify_failures: HashSet<String>,
    draft_fails: bool,
    classify_calls: Mutex<Vec<String>>,
    draft_calls: Mutex<Vec<String>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            verdicts: HashMap::new(),
            classify_failures: HashSet::new(),
            draft_fails: false,
            classify_calls: Mutex::new(Vec::new()),
            draft_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_classify(mut self, excerpt: &str, verdict: PainAnalysis) -> Self {
        self.verdicts.insert(excerpt.to_string(), verdict);
        self
    }

    pub fn failing_on(mut self, excerpt: &str) -> Self {
        self.classify_failures.insert(excerpt.to_string());
        self
    }

    pub fn with_failing_draft(mut self) -> Self {
        self.draft_fails = true;
        self
    }

    pub fn classify_calls(&self) -> Vec<String> {
        self.classify_calls.lock().unwrap().clone()
    }

    pub fn draft_calls(&self) -> Vec<String> {
        self.draft_calls.lock().unwrap().clone()
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadAnalyzer for MockAnalyzer {
    async fn classify(&self, excerpt: &str) -> Result<PainAnalysis> {
        self.classify_calls.lock().unwrap().push(excerpt.to_string());
        if self.classify_failures.contains(excerpt) {
            bail!("MockAnalyzer: classifier failure");
        }
        match self.verdicts.get(excerpt) {
            Some(verdict) => Ok(verdict.clone()),
            None => bail!("MockAnalyzer: no verdict registered for {excerpt:?}"),
        }
    }

    async fn draft(&self, lead: &Lead) -> Result<String> {
        self.draft_calls.lock().unwrap().push(lead.post_url.clone());
        if self.draft_fails {
            bail!("MockAnalyzer: draft failure");
        }
        let category = lead.pain_category.as_deref().unwrap_or("this");
        Ok(format!("hey, same here. we fixed {category} ourselves"))
    }
}

// Delegation impls so tests can keep an Arc handle to a mock after handing
// it to the Scout.

#[async_trait]
impl LeadSource for std::sync::Arc<MockSource> {
    fn platform(&self) -> Platform {
        (**self).platform()
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }

    fn fetch_limit(&self) -> u32 {
        (**self).fetch_limit()
    }

    async fn fetch(&self, keywords: &[String], limit: u32) -> Result<Vec<Lead>> {
        (**self).fetch(keywords, limit).await
    }
}

#[async_trait]
impl LeadAnalyzer for std::sync::Arc<MockAnalyzer> {
    async fn classify(&self, excerpt: &str) -> Result<PainAnalysis> {
        (**self).classify(excerpt).await
    }

    async fn draft(&self, lead: &Lead) -> Result<String> {
        (**self).draft(lead).await
    }
}

// ---------------------------------------------------------------------------
// MemoryLeadStore
// ---------------------------------------------------------------------------

/// In-memory lead record with the same dedup contract as the sheet store.
/// State persists across runs within a test, so idempotence scenarios work.
pub struct MemoryLeadStore {
    rows: Mutex<Vec<Lead>>,
    seen: Mutex<SeenKeys>,
    fail_load: bool,
    fail_append: bool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            seen: Mutex::new(SeenKeys::default()),
            fail_load: false,
            fail_append: false,
        }
    }

    /// Simulate an unreachable store at snapshot-load time.
    pub fn with_failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Simulate write failures.
    pub fn with_failing_append(mut self) -> Self {
        self.fail_append = true;
        self
    }

    /// Pre-seed persisted identity keys, as if earlier runs had saved leads.
    pub fn seed(&self, lead: &Lead) {
        self.seen.lock().unwrap().insert(lead);
        self.rows.lock().unwrap().push(lead.clone());
    }

    pub fn saved(&self) -> Vec<Lead> {
        self.rows.lock().unwrap().clone()
    }
}

impl Default for MemoryLeadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn load_seen(&self) -> Result<SeenKeys> {
        if self.fail_load {
            bail!("MemoryLeadStore: store unreachable");
        }
        Ok(self.seen.lock().unwrap().clone())
    }

    async fn append(&self, lead: &Lead) -> Result<bool> {
        if self.fail_append {
            bail!("MemoryLeadStore: write failed");
        }
        let mut seen = self.seen.lock().unwrap();
        if seen.contains(lead) {
            return Ok(false);
        }
        seen.insert(lead);
        self.rows.lock().unwrap().push(lead.clone());
        Ok(true)
    }
}

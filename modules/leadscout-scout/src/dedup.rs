use tracing::{info, warn};

use leadscout_common::Lead;

use crate::traits::{LeadStore, SeenKeys};

/// In-memory duplicate filter over persisted identity keys. A candidate is a
/// duplicate when its post URL was already saved, or when any post by the
/// same (platform, author) pair was: one saved lead per author, ever.
///
/// The index is a cost-saving pre-filter: the store's own re-check on append
/// remains authoritative. Keys are only inserted after a successful write.
pub struct DedupIndex {
    seen: SeenKeys,
}

impl DedupIndex {
    pub fn empty() -> Self {
        Self {
            seen: SeenKeys::default(),
        }
    }

    pub fn from_seen(seen: SeenKeys) -> Self {
        Self { seen }
    }

    /// Bulk-load all persisted identity keys. When the store is unreachable
    /// the index starts empty and the run proceeds in degraded mode; a
    /// duplicate write is preferable to no run at all.
    pub async fn load(store: &dyn LeadStore) -> Self {
        match store.load_seen().await {
            Ok(seen) => {
                info!(
                    urls = seen.post_urls.len(),
                    authors = seen.authors.len(),
                    "Loaded dedup index"
                );
                Self::from_seen(seen)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to load dedup index, starting empty (duplicate writes possible this run)"
                );
                Self::empty()
            }
        }
    }

    pub fn is_duplicate(&self, lead: &Lead) -> bool {
        self.seen.contains(lead)
    }

    /// Record both identity keys. Called only after a successful persistence
    /// write; the index must never claim a duplicate that was not saved.
    pub fn mark_seen(&mut self, lead: &Lead) {
        self.seen.insert(lead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_common::Platform;

    fn lead(platform: Platform, author: &str, url: &str) -> Lead {
        Lead::new(platform, author, url, "excerpt", None)
    }

    #[test]
    fn fresh_lead_is_not_duplicate() {
        let index = DedupIndex::empty();
        assert!(!index.is_duplicate(&lead(Platform::Reddit, "alice", "https://r/1")));
    }

    #[test]
    fn url_match_is_duplicate() {
        let mut index = DedupIndex::empty();
        index.mark_seen(&lead(Platform::Reddit, "alice", "https://r/1"));

        // Same URL, different author
        assert!(index.is_duplicate(&lead(Platform::Reddit, "bob", "https://r/1")));
    }

    #[test]
    fn author_match_is_duplicate_across_posts() {
        let mut index = DedupIndex::empty();
        index.mark_seen(&lead(Platform::Reddit, "alice", "https://r/1"));

        // Same author, different post
        assert!(index.is_duplicate(&lead(Platform::Reddit, "alice", "https://r/2")));
    }

    #[test]
    fn same_handle_on_other_platform_is_not_duplicate() {
        let mut index = DedupIndex::empty();
        index.mark_seen(&lead(Platform::Reddit, "alice", "https://r/1"));

        assert!(!index.is_duplicate(&lead(Platform::X, "alice", "https://x/1")));
    }
}

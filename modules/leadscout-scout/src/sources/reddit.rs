use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use leadscout_common::{Lead, LeadScoutError, Platform};

use crate::sources::matches_keywords;
use crate::traits::LeadSource;

const BASE_URL: &str = "https://www.reddit.com";

/// Posts requested per subreddit listing.
const FETCH_LIMIT: u32 = 25;

/// Minimum spacing between listing requests. Reddit's public JSON API has no
/// auth but does rate-limit by user agent.
const REQUEST_GAP: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only Reddit adapter over the public JSON listing endpoint.
/// No authentication required.
pub struct RedditSource {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    subreddits: Vec<String>,
}

impl RedditSource {
    pub fn new(user_agent: &str, subreddits: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            user_agent: user_agent.to_string(),
            subreddits,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch_subreddit(&self, subreddit: &str, limit: u32) -> Result<Vec<RedditPost>> {
        let url = format!("{}/r/{}/new.json?limit={}", self.base_url, subreddit, limit);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| LeadScoutError::SourceUnavailable(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            warn!(subreddit, "Rate limited by Reddit, skipping subreddit this run");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(LeadScoutError::SourceUnavailable(format!(
                "Reddit API returned status {status} for r/{subreddit}"
            ))
            .into());
        }

        let listing: Listing = resp.json().await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect())
    }
}

#[async_trait]
impl LeadSource for RedditSource {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    fn fetch_limit(&self) -> u32 {
        FETCH_LIMIT
    }

    async fn fetch(&self, keywords: &[String], limit: u32) -> Result<Vec<Lead>> {
        let mut leads = Vec::new();

        for (i, subreddit) in self.subreddits.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(REQUEST_GAP).await;
            }

            info!(subreddit, "Scanning subreddit");
            let posts = match self.fetch_subreddit(subreddit, limit).await {
                Ok(posts) => posts,
                Err(e) => {
                    // One bad subreddit must not block the rest
                    warn!(subreddit, error = %e, "Subreddit fetch failed, skipping");
                    continue;
                }
            };

            for post in posts {
                let full_text = format!("{} {}", post.title, post.selftext);
                if matches_keywords(&full_text, keywords) {
                    leads.push(post.into_lead());
                }
            }
        }

        info!(count = leads.len(), "Found potential leads on Reddit");
        Ok(leads)
    }
}

// --- Listing wire types ---

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<PostWrapper>,
}

#[derive(Debug, Deserialize)]
struct PostWrapper {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default = "deleted_author")]
    author: String,
    #[serde(default)]
    permalink: String,
}

fn deleted_author() -> String {
    "[deleted]".to_string()
}

impl RedditPost {
    fn into_lead(self) -> Lead {
        let profile_url = if self.author == "[deleted]" {
            None
        } else {
            Some(format!("{BASE_URL}/user/{}", self.author))
        };
        let excerpt = format!("{}\n\n{}", self.title, self.selftext);
        Lead::new(
            Platform::Reddit,
            self.author,
            format!("{BASE_URL}{}", self.permalink),
            &excerpt,
            profile_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_maps_to_lead() {
        let post = RedditPost {
            title: "Drowning in manual reports".to_string(),
            selftext: "Every Friday I chase five people for updates.".to_string(),
            author: "ops_manager".to_string(),
            permalink: "/r/startups/comments/abc/drowning/".to_string(),
        };
        let lead = post.into_lead();
        assert_eq!(lead.platform, Platform::Reddit);
        assert_eq!(lead.author_handle, "ops_manager");
        assert_eq!(
            lead.post_url,
            "https://www.reddit.com/r/startups/comments/abc/drowning/"
        );
        assert_eq!(
            lead.author_profile_url.as_deref(),
            Some("https://www.reddit.com/user/ops_manager")
        );
        assert!(lead.post_excerpt.starts_with("Drowning in manual reports\n\n"));
    }

    #[test]
    fn deleted_author_has_no_profile_url() {
        let post = RedditPost {
            title: "t".to_string(),
            selftext: String::new(),
            author: "[deleted]".to_string(),
            permalink: "/r/startups/comments/abc/t/".to_string(),
        };
        assert!(post.into_lead().author_profile_url.is_none());
    }

    #[test]
    fn listing_parses_with_missing_fields() {
        let raw = r#"{
            "data": {
                "children": [
                    {"data": {"title": "only a title", "permalink": "/r/a/1/"}},
                    {"data": {"selftext": "no title", "author": "bob", "permalink": "/r/a/2/"}}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(raw).unwrap();
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.children[0].data.author, "[deleted]");
        assert_eq!(listing.data.children[1].data.author, "bob");
    }
}

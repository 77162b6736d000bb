use anyhow::Result;
use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gemini_client::GeminiClient;
use leadscout_common::{Lead, LeadScoutError, PainAnalysis, URGENCY_MAX};

use crate::traits::LeadAnalyzer;

const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// What the classifier returns for one post. Kept separate from
/// `PainAnalysis` so range/enum validation happens before anything is
/// trusted downstream.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct PainVerdict {
    /// Whether the author is a manager/founder expressing operational pain.
    has_pain: bool,
    /// One of: "Chasing updates", "Reporting delays", "Lack of visibility",
    /// "Tool overload", "Other".
    pain_category: Option<String>,
    /// Short explanation in plain English.
    pain_summary: Option<String>,
    /// 1 (low) to 10 (high).
    urgency_score: i64,
    /// Why this qualifies.
    reasoning: Option<String>,
}

const CLASSIFY_PREAMBLE: &str = r#"Analyze the following social media post for operational pain points experienced by managers or founders.

Criteria:
- has_pain: true only if the author is a manager/founder expressing frustration about operations, reporting, or visibility.
- urgency_score: 1 (low) to 10 (high).
- pain_category must be one of: "Chasing updates", "Reporting delays", "Lack of visibility", "Tool overload", "Other".

Return strictly valid JSON with no markdown formatting, matching this schema:"#;

const DRAFT_PREAMBLE: &str = r#"Draft a very short (max 3 sentences), casual, non-salesy DM to this person.
Pretend you are a rough-around-the-edges founder who solves this exact pain.

Rules:
- No emojis.
- No links.
- No "I hope this finds you well".
- Just relate to the pain and offer a quick "same here" or "we fixed this by X".
- Sound valid, not spammy."#;

/// Pain classifier and outreach drafter backed by Gemini.
pub struct GeminiAnalyzer {
    client: GeminiClient,
}

impl GeminiAnalyzer {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: GeminiClient::new(api_key, GEMINI_MODEL),
        }
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    fn classify_prompt(excerpt: &str) -> String {
        let schema = schema_for!(PainVerdict);
        let schema_json =
            serde_json::to_string_pretty(&schema).expect("verdict schema serializes");
        format!("{CLASSIFY_PREAMBLE}\n{schema_json}\n\nPost Content:\n{excerpt}")
    }

    fn draft_prompt(lead: &Lead) -> String {
        format!(
            "{DRAFT_PREAMBLE}\n\nContext:\nTheir Pain: {}\nCategory: {}",
            lead.pain_summary.as_deref().unwrap_or("(not summarized)"),
            lead.pain_category.as_deref().unwrap_or("Other"),
        )
    }
}

#[async_trait]
impl LeadAnalyzer for GeminiAnalyzer {
    async fn classify(&self, excerpt: &str) -> Result<PainAnalysis> {
        let prompt = Self::classify_prompt(excerpt);
        let verdict: PainVerdict = self
            .client
            .generate_json(&prompt)
            .await
            .map_err(|e| LeadScoutError::Classification(e.to_string()))?;
        debug!(has_pain = verdict.has_pain, urgency = verdict.urgency_score, "Classifier verdict");
        Ok(verdict_into_analysis(verdict)?)
    }

    async fn draft(&self, lead: &Lead) -> Result<String> {
        if !lead.has_pain {
            return Ok(String::new());
        }
        let message = self
            .client
            .generate_text(&Self::draft_prompt(lead))
            .await
            .map_err(|e| LeadScoutError::Draft(e.to_string()))?;
        Ok(message)
    }
}

/// Validate a raw verdict into a trusted analysis. Out-of-range scores and
/// unknown categories are contract violations, not data.
fn verdict_into_analysis(verdict: PainVerdict) -> Result<PainAnalysis, LeadScoutError> {
    if verdict.urgency_score < 0 || verdict.urgency_score > URGENCY_MAX as i64 {
        return Err(LeadScoutError::MalformedResponse(format!(
            "urgency_score {} out of range 0-{URGENCY_MAX}",
            verdict.urgency_score
        )));
    }

    let analysis = PainAnalysis {
        has_pain: verdict.has_pain,
        pain_category: verdict.pain_category,
        pain_summary: verdict.pain_summary,
        urgency_score: verdict.urgency_score as u8,
        reasoning: verdict.reasoning,
    };
    analysis.validate()?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_common::Platform;

    fn verdict(has_pain: bool, category: Option<&str>, urgency: i64) -> PainVerdict {
        PainVerdict {
            has_pain,
            pain_category: category.map(str::to_string),
            pain_summary: Some("summary".to_string()),
            urgency_score: urgency,
            reasoning: Some("reasoning".to_string()),
        }
    }

    #[test]
    fn valid_verdict_converts() {
        let analysis =
            verdict_into_analysis(verdict(true, Some("Reporting delays"), 8)).unwrap();
        assert!(analysis.has_pain);
        assert_eq!(analysis.urgency_score, 8);
        assert_eq!(analysis.pain_category.as_deref(), Some("Reporting delays"));
    }

    #[test]
    fn out_of_range_urgency_is_malformed() {
        assert!(verdict_into_analysis(verdict(true, Some("Other"), 11)).is_err());
        assert!(verdict_into_analysis(verdict(true, Some("Other"), -1)).is_err());
    }

    #[test]
    fn unknown_category_is_malformed() {
        assert!(verdict_into_analysis(verdict(true, Some("Bad vibes"), 5)).is_err());
    }

    #[test]
    fn no_pain_verdict_converts_without_category() {
        let analysis = verdict_into_analysis(verdict(false, None, 0)).unwrap();
        assert!(!analysis.has_pain);
    }

    #[test]
    fn verdict_parses_from_model_json() {
        let raw = r#"{
            "has_pain": true,
            "pain_category": "Chasing updates",
            "pain_summary": "Spends Fridays chasing status updates",
            "urgency_score": 7,
            "reasoning": "Founder describes recurring manual follow-ups"
        }"#;
        let verdict: PainVerdict = serde_json::from_str(raw).unwrap();
        assert!(verdict_into_analysis(verdict).is_ok());
    }

    #[test]
    fn draft_prompt_includes_pain_context() {
        let mut lead = Lead::new(Platform::Reddit, "alice", "https://r/1", "text", None);
        lead.apply_analysis(PainAnalysis {
            has_pain: true,
            pain_category: Some("Tool overload".to_string()),
            pain_summary: Some("five dashboards, zero answers".to_string()),
            urgency_score: 7,
            reasoning: None,
        });
        let prompt = GeminiAnalyzer::draft_prompt(&lead);
        assert!(prompt.contains("five dashboards, zero answers"));
        assert!(prompt.contains("Tool overload"));
    }
}

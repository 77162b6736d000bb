// End-to-end pipeline tests over the trait mocks: no network, no credentials.

use std::sync::Arc;

use leadscout_common::{Platform, EXCERPT_MAX_CHARS};
use leadscout_scout::scout::Scout;
use leadscout_scout::testing::{lead, no_pain, pain, MemoryLeadStore, MockAnalyzer, MockSource};
use leadscout_scout::traits::LeadSource;

const PAIN_POST: &str = "I am drowning in manual reports and excel sheets";
const SPAM_POST: &str = "Buy my crypto!";

const PAIN_URL: &str = "https://www.reddit.com/r/startups/comments/1/drowning/";
const SPAM_URL: &str = "https://www.reddit.com/r/startups/comments/2/crypto/";

const THRESHOLD: u8 = 6;

fn keywords() -> Vec<String> {
    vec!["reports".to_string(), "excel".to_string()]
}

fn build_scout(
    sources: Vec<Box<dyn LeadSource>>,
    analyzer: Arc<MockAnalyzer>,
    store: Arc<MemoryLeadStore>,
) -> Scout {
    Scout::new(sources, Box::new(analyzer), store, keywords(), THRESHOLD)
}

fn two_reddit_candidates() -> Vec<leadscout_common::Lead> {
    vec![
        lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST),
        lead(Platform::Reddit, "crypto_guy", SPAM_URL, SPAM_POST),
    ]
}

#[tokio::test]
async fn first_run_saves_pain_and_discards_spam() {
    let store = Arc::new(MemoryLeadStore::new());
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .on_classify(PAIN_POST, pain(8))
            .on_classify(SPAM_POST, no_pain()),
    );
    let source = MockSource::new(Platform::Reddit).with_leads(two_reddit_candidates());

    let scout = build_scout(vec![Box::new(source)], analyzer.clone(), store.clone());
    let stats = scout.run().await.unwrap();

    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.saved, 1);
    assert_eq!(stats.dupes, 0);
    assert_eq!(stats.low_quality, 1);

    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].author_handle, "drowning_dev");
    assert!(saved[0].has_pain);
    assert_eq!(saved[0].urgency_score, 8);
    assert!(saved[0].suggested_outreach_message.is_some());
}

#[tokio::test]
async fn second_run_dedups_saved_and_reclassifies_low_quality() {
    let store = Arc::new(MemoryLeadStore::new());

    let analyzer1 = Arc::new(
        MockAnalyzer::new()
            .on_classify(PAIN_POST, pain(8))
            .on_classify(SPAM_POST, no_pain()),
    );
    let source1 = MockSource::new(Platform::Reddit).with_leads(two_reddit_candidates());
    build_scout(vec![Box::new(source1)], analyzer1, store.clone())
        .run()
        .await
        .unwrap();

    // Unchanged feed, fresh run: the saved lead is now a duplicate; the
    // low-quality one was never recorded, so it must be re-classified and
    // discarded for quality again, not as a duplicate.
    let analyzer2 = Arc::new(MockAnalyzer::new().on_classify(SPAM_POST, no_pain()));
    let source2 = MockSource::new(Platform::Reddit).with_leads(two_reddit_candidates());
    let stats = build_scout(vec![Box::new(source2)], analyzer2.clone(), store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.saved, 0);
    assert_eq!(stats.dupes, 1);
    assert_eq!(stats.low_quality, 1);

    let calls = analyzer2.classify_calls();
    assert_eq!(calls, vec![SPAM_POST.to_string()]);
    assert_eq!(store.saved().len(), 1);
}

#[tokio::test]
async fn duplicates_never_reach_the_model() {
    let store = Arc::new(MemoryLeadStore::new());
    store.seed(&lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST));

    let analyzer = Arc::new(MockAnalyzer::new());
    let source = MockSource::new(Platform::Reddit)
        .with_leads(vec![lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST)]);

    let stats = build_scout(vec![Box::new(source)], analyzer.clone(), store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.dupes, 1);
    assert_eq!(stats.saved, 0);
    assert!(analyzer.classify_calls().is_empty());
    assert!(analyzer.draft_calls().is_empty());
}

#[tokio::test]
async fn author_dedup_within_one_run() {
    let store = Arc::new(MemoryLeadStore::new());
    let second_post = "Still drowning in excel reports, send help";
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .on_classify(PAIN_POST, pain(8))
            .on_classify(second_post, pain(9)),
    );
    let source = MockSource::new(Platform::Reddit).with_leads(vec![
        lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST),
        lead(
            Platform::Reddit,
            "drowning_dev",
            "https://www.reddit.com/r/startups/comments/3/still/",
            second_post,
        ),
    ]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    // One lead per author: the second post is suppressed by mark_seen
    assert_eq!(stats.saved, 1);
    assert_eq!(stats.dupes, 1);
    assert_eq!(store.saved().len(), 1);
}

#[tokio::test]
async fn classifier_failure_does_not_stop_the_run() {
    let store = Arc::new(MemoryLeadStore::new());
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .failing_on(SPAM_POST)
            .on_classify(PAIN_POST, pain(8)),
    );
    let source = MockSource::new(Platform::Reddit).with_leads(vec![
        lead(Platform::Reddit, "crypto_guy", SPAM_URL, SPAM_POST),
        lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST),
    ]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    // The failed classification falls through the quality gate; the next
    // candidate is processed normally
    assert_eq!(stats.low_quality, 1);
    assert_eq!(stats.saved, 1);
    assert_eq!(store.saved()[0].author_handle, "drowning_dev");
}

#[tokio::test]
async fn draft_failure_still_persists_qualified_lead() {
    let store = Arc::new(MemoryLeadStore::new());
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .on_classify(PAIN_POST, pain(8))
            .with_failing_draft(),
    );
    let source = MockSource::new(Platform::Reddit)
        .with_leads(vec![lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST)]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.saved, 1);
    let saved = store.saved();
    assert!(saved[0].suggested_outreach_message.is_none());
}

#[tokio::test]
async fn threshold_is_inclusive() {
    let store = Arc::new(MemoryLeadStore::new());
    let at_threshold = "excel reports everywhere, mildly annoyed";
    let below = "excel reports exist, mostly fine";
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .on_classify(at_threshold, pain(THRESHOLD))
            .on_classify(below, pain(THRESHOLD - 1)),
    );
    let source = MockSource::new(Platform::Reddit).with_leads(vec![
        lead(Platform::Reddit, "alice", "https://r/at", at_threshold),
        lead(Platform::Reddit, "bob", "https://r/below", below),
    ]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.saved, 1);
    assert_eq!(stats.low_quality, 1);
    assert_eq!(store.saved()[0].author_handle, "alice");
}

#[tokio::test]
async fn degraded_index_falls_back_to_store_recheck() {
    // Snapshot load fails, so the run starts with an empty index; the
    // store's own duplicate check is the backstop.
    let store = Arc::new(MemoryLeadStore::new().with_failing_load());
    store.seed(&lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST));

    let analyzer = Arc::new(MockAnalyzer::new().on_classify(PAIN_POST, pain(8)));
    let source = MockSource::new(Platform::Reddit)
        .with_leads(vec![lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST)]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.saved, 0);
    assert_eq!(stats.dupes, 1);
    assert_eq!(store.saved().len(), 1);
}

#[tokio::test]
async fn failing_source_does_not_block_others() {
    let store = Arc::new(MemoryLeadStore::new());
    let analyzer = Arc::new(MockAnalyzer::new().on_classify(PAIN_POST, pain(8)));
    let broken = MockSource::new(Platform::X).failing();
    let working = MockSource::new(Platform::Reddit)
        .with_leads(vec![lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST)]);

    let stats = build_scout(
        vec![Box::new(broken), Box::new(working)],
        analyzer,
        store.clone(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(stats.fetched, 1);
    assert_eq!(stats.saved, 1);
}

#[tokio::test]
async fn disabled_source_is_never_fetched() {
    let store = Arc::new(MemoryLeadStore::new());
    let analyzer = Arc::new(MockAnalyzer::new());
    // Would error if fetched; being disabled must short-circuit first
    let disabled = Arc::new(MockSource::new(Platform::LinkedIn).failing().disabled());

    let stats = build_scout(vec![Box::new(disabled.clone())], analyzer, store)
        .run()
        .await
        .unwrap();

    assert_eq!(disabled.fetch_count(), 0);
    assert_eq!(stats.fetched, 0);
}

#[tokio::test]
async fn write_failure_is_contained_per_candidate() {
    let store = Arc::new(MemoryLeadStore::new().with_failing_append());
    let second_post = "chasing updates across five excel sheets again";
    let analyzer = Arc::new(
        MockAnalyzer::new()
            .on_classify(PAIN_POST, pain(8))
            .on_classify(second_post, pain(7)),
    );
    let source = MockSource::new(Platform::Reddit).with_leads(vec![
        lead(Platform::Reddit, "drowning_dev", PAIN_URL, PAIN_POST),
        lead(Platform::Reddit, "update_chaser", "https://r/chasing", second_post),
    ]);

    let stats = build_scout(vec![Box::new(source)], analyzer.clone(), store.clone())
        .run()
        .await
        .unwrap();

    // Both candidates were attempted; neither write succeeded
    assert_eq!(analyzer.classify_calls().len(), 2);
    assert_eq!(stats.saved, 0);
    assert!(store.saved().is_empty());
}

#[tokio::test]
async fn excerpt_truncation_survives_the_pipeline() {
    let store = Arc::new(MemoryLeadStore::new());
    let long_excerpt = format!("manual excel reports {}", "x".repeat(EXCERPT_MAX_CHARS + 500));
    let candidate = lead(Platform::Reddit, "verbose_dev", "https://r/long", &long_excerpt);
    // The classifier sees the already-truncated excerpt
    let truncated = candidate.post_excerpt.clone();
    assert_eq!(truncated.chars().count(), EXCERPT_MAX_CHARS);

    let analyzer = Arc::new(MockAnalyzer::new().on_classify(&truncated, pain(9)));
    let source = MockSource::new(Platform::Reddit).with_leads(vec![candidate]);

    let stats = build_scout(vec![Box::new(source)], analyzer, store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.saved, 1);
    let saved = store.saved();
    assert_eq!(saved[0].post_excerpt, truncated);
    assert_eq!(saved[0].post_excerpt, long_excerpt[..long_excerpt
        .char_indices()
        .nth(EXCERPT_MAX_CHARS)
        .map(|(i, _)| i)
        .unwrap()]);
}

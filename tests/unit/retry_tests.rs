/*!
 * Tests for retry with id reconciliation
 */

use modlocai::errors::ProviderError;
use modlocai::providers::mock::MockProvider;
use modlocai::translation::retry::BatchContext;
use modlocai::translation::{failure_marker, RetryPolicy, RetryReconciler, TranslationItem};

use crate::common;

fn ctx() -> BatchContext<'static> {
    BatchContext {
        plugin: "Test.esp",
        record_type: "DIAL FULL",
        batch_no: 1,
    }
}

fn items(texts: &[&str]) -> Vec<TranslationItem> {
    texts.iter().enumerate().map(|(id, text)| TranslationItem::new(id, *text)).collect()
}

#[tokio::test]
async fn test_resolve_withPartialFirstAnswer_shouldResendOnlyMissingIds() {
    let mock = MockProvider::scripted(vec![
        Ok(vec![TranslationItem::new(0, "Bonjour")]),
        Ok(vec![TranslationItem::new(1, "Monde")]),
    ]);
    let reconciler = RetryReconciler::new(RetryPolicy::new(3, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["Hello", "World"]), &ctx()).await;

    assert_eq!(outcome.translated.get(&0).map(String::as_str), Some("Bonjour"));
    assert_eq!(outcome.translated.get(&1).map(String::as_str), Some("Monde"));
    assert!(outcome.unresolved.is_empty());
    assert_eq!(outcome.attempts, 2);
    assert_eq!(mock.calls(), vec![vec![0, 1], vec![1]]);
}

#[tokio::test]
async fn test_resolve_withAlwaysFailingRemote_shouldMarkEveryItemAfterAllAttempts() {
    let mock = MockProvider::failing();
    let reconciler = RetryReconciler::new(RetryPolicy::new(2, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["Hello", "World"]), &ctx()).await;

    assert_eq!(mock.call_count(), 3);
    assert_eq!(outcome.attempts, 3);
    assert!(outcome.translated.is_empty());
    assert_eq!(outcome.unresolved.len(), 2);

    let results = outcome.into_results();
    assert_eq!(results[&0], failure_marker("Hello"));
    assert_eq!(results[&1], "[translation failed: World]");
}

#[tokio::test]
async fn test_resolve_withTransportErrorThenSuccess_shouldRetryFullBatch() {
    let mock = MockProvider::scripted(vec![Err(ProviderError::ConnectionError("reset".to_string()))]);
    let reconciler = RetryReconciler::new(RetryPolicy::new(1, 0));
    let prompt = common::test_prompts().resolve("INFO NAM1").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["a", "b", "c"]), &ctx()).await;

    assert_eq!(mock.calls(), vec![vec![0, 1, 2], vec![0, 1, 2]]);
    assert_eq!(outcome.translated.len(), 3);
    assert!(outcome.unresolved.is_empty());
}

#[tokio::test]
async fn test_resolve_withUnknownAndDuplicateIds_shouldRejectThem() {
    let mock = MockProvider::scripted(vec![Ok(vec![
        TranslationItem::new(0, "first"),
        TranslationItem::new(0, "second"),
        TranslationItem::new(42, "stranger"),
    ])]);
    let reconciler = RetryReconciler::new(RetryPolicy::new(0, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["x", "y"]), &ctx()).await;

    assert_eq!(outcome.translated.len(), 1);
    assert_eq!(outcome.translated[&0], "first");
    assert!(!outcome.translated.contains_key(&42));
    assert_eq!(outcome.unresolved, vec![TranslationItem::new(1, "y")]);
}

#[tokio::test]
async fn test_resolve_withIdsAnsweredInLaterRound_shouldNotAcceptAlreadyResolvedIdsTwice() {
    // The second answer repeats id 0, which is no longer pending
    let mock = MockProvider::scripted(vec![
        Ok(vec![TranslationItem::new(0, "kept")]),
        Ok(vec![TranslationItem::new(0, "overwrite"), TranslationItem::new(1, "late")]),
    ]);
    let reconciler = RetryReconciler::new(RetryPolicy::new(3, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["p", "q"]), &ctx()).await;

    assert_eq!(outcome.translated[&0], "kept");
    assert_eq!(outcome.translated[&1], "late");
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test]
async fn test_resolve_withWithheldIds_shouldKeepCountsBalanced() {
    let mock = MockProvider::working().withholding([1, 3]);
    let reconciler = RetryReconciler::new(RetryPolicy::new(2, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();
    let submitted = items(&["a", "b", "c", "d", "e"]);

    let outcome = reconciler.resolve(&mock, &prompt, submitted.clone(), &ctx()).await;

    assert_eq!(outcome.translated.len() + outcome.unresolved.len(), submitted.len());
    let unresolved_ids: Vec<usize> = outcome.unresolved.iter().map(|i| i.id).collect();
    assert_eq!(unresolved_ids, vec![1, 3]);
    assert_eq!(mock.calls(), vec![vec![0, 1, 2, 3, 4], vec![1, 3], vec![1, 3]]);
}

#[tokio::test]
async fn test_resolve_withEmptyBatch_shouldNotCallRemote() {
    let mock = MockProvider::working();
    let reconciler = RetryReconciler::new(RetryPolicy::new(3, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, Vec::new(), &ctx()).await;

    assert_eq!(mock.call_count(), 0);
    assert_eq!(outcome.attempts, 0);
}

#[tokio::test]
async fn test_resolve_withEmptyAnswers_shouldUseExactlyRetriesPlusOneAttempts() {
    let mock = MockProvider::empty();
    let reconciler = RetryReconciler::new(RetryPolicy::new(4, 0));
    let prompt = common::test_prompts().resolve("DIAL FULL").clone();

    let outcome = reconciler.resolve(&mock, &prompt, items(&["only"]), &ctx()).await;

    assert_eq!(mock.call_count(), 5);
    assert_eq!(outcome.unresolved.len(), 1);
}

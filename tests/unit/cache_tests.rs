/*!
 * Tests for translation cache functionality
 */

use modlocai::translation::cache::TranslationCache;

#[test]
fn test_cache_new_shouldBeEmpty() {
    let cache = TranslationCache::new();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats(), (0, 0, 0.0));
}

#[test]
fn test_cache_set_withEntry_shouldBeReturnedByGet() {
    let cache = TranslationCache::new();
    cache.set("WEAP FULL", "Iron Sword", "鉄の剣");

    assert_eq!(cache.get("WEAP FULL", "Iron Sword"), Some("鉄の剣".to_string()));
}

#[test]
fn test_cache_get_withDifferentRecordType_shouldMiss() {
    let cache = TranslationCache::new();
    cache.set("DIAL FULL", "Goodbye", "さようなら");

    assert_eq!(cache.get("INFO NAM1", "Goodbye"), None);
    assert_eq!(cache.get("DIAL FULL", "goodbye"), None);
}

#[test]
fn test_cache_set_withSameKey_shouldOverwrite() {
    let cache = TranslationCache::new();
    cache.set("MISC FULL", "Bread", "パン");
    cache.set("MISC FULL", "Bread", "ブレッド");

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("MISC FULL", "Bread"), Some("ブレッド".to_string()));
}

#[test]
fn test_cache_stats_withHitsAndMisses_shouldCountBoth() {
    let cache = TranslationCache::new();
    cache.set("MISC FULL", "Bread", "パン");

    let _ = cache.get("MISC FULL", "Bread");
    let _ = cache.get("MISC FULL", "Bread");
    let _ = cache.get("MISC FULL", "Cheese");
    let _ = cache.get("MISC FULL", "Apple");

    let (hits, misses, rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 2);
    assert!((rate - 0.5).abs() < f64::EPSILON);
}

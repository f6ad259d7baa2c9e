// Cache integration tests
//
// Tests for cache key computation (hash.rs) and file-system cache store (store.rs).

use smart_compress::cache::hash::{CacheSettings, compute_cache_key};
use smart_compress::cache::store::CacheStore;
use smart_compress::codec::ImageData;
use smart_compress::compress::search::SearchConfig;
use smart_compress::compress::{CompressionResult, ContentHint, Outcome, Strategy};
use tempfile::tempdir;

fn settings(target_size_kb: u64) -> CacheSettings {
    CacheSettings {
        target_size_kb,
        hint: None,
        search: SearchConfig::default(),
    }
}

fn sample_result(bytes: Vec<u8>, quality: u8) -> CompressionResult<ImageData> {
    let size_bytes = bytes.len() as u64;
    CompressionResult {
        image: ImageData::from_bytes(bytes),
        quality,
        size_bytes,
        outcome: Outcome::Searched { attempts: 5 },
    }
}

fn cache_entries(cache_dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(cache_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---- hash.rs tests ----

/// compute_cache_key produces a valid SHA-256 hex string.
#[test]
fn test_compute_cache_key() {
    let key = compute_cache_key(b"source image bytes", &settings(100));

    assert_eq!(key.len(), 64, "Cache key should be 64 hex characters");
    assert!(
        key.chars()
            .all(|c: char| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        "Cache key should contain only lowercase hex characters"
    );
}

#[test]
fn test_cache_key_deterministic() {
    let key1 = compute_cache_key(b"same", &settings(100));
    let key2 = compute_cache_key(b"same", &settings(100));
    assert_eq!(key1, key2, "Same inputs should produce the same cache key");
}

#[test]
fn test_cache_key_differs_with_different_source() {
    let key_a = compute_cache_key(b"image A", &settings(100));
    let key_b = compute_cache_key(b"image B", &settings(100));
    assert_ne!(key_a, key_b);
}

#[test]
fn test_cache_key_differs_with_different_target() {
    let key_a = compute_cache_key(b"image", &settings(100));
    let key_b = compute_cache_key(b"image", &settings(0));
    assert_ne!(key_a, key_b);
}

#[test]
fn test_cache_key_differs_with_hint_and_config() {
    let base = compute_cache_key(b"image", &settings(0));

    let mut hinted = settings(0);
    hinted.hint = Some(ContentHint::new(Strategy::QualityPriority, 85));
    assert_ne!(base, compute_cache_key(b"image", &hinted));

    let mut tuned = settings(0);
    tuned.search.heuristic_iterations = 4;
    assert_ne!(base, compute_cache_key(b"image", &tuned));
}

// ---- store.rs tests ----

#[test]
fn test_store_and_retrieve_roundtrip() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let key = compute_cache_key(b"image", &settings(50));
    let result = sample_result(vec![0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9], 47);

    store.store(&key, &result).expect("store should succeed");
    assert!(store.contains(&key));

    let cached = store
        .retrieve(&key)
        .expect("retrieve should succeed")
        .expect("entry should exist");
    assert_eq!(cached.quality, 47);
    assert_eq!(cached.size_bytes, 7);
    assert_eq!(cached.image.bytes(), result.image.bytes());
    assert_eq!(cached.outcome, Outcome::Searched { attempts: 5 });
}

#[test]
fn test_retrieve_miss() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let key = compute_cache_key(b"never stored", &settings(0));

    assert!(store.retrieve(&key).unwrap().is_none());
    assert!(!store.contains(&key));
}

#[test]
fn test_short_circuit_results_are_not_stored() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let key = compute_cache_key(b"small", &settings(500));
    let result = CompressionResult {
        image: ImageData::from_bytes(b"small".to_vec()),
        quality: 100,
        size_bytes: 5,
        outcome: Outcome::ShortCircuit,
    };

    store.store(&key, &result).unwrap();
    assert!(!store.contains(&key));
}

#[test]
fn test_store_overwrites_existing_entry() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let key = compute_cache_key(b"image", &settings(0));

    store.store(&key, &sample_result(vec![1; 10], 60)).unwrap();
    store.store(&key, &sample_result(vec![2; 20], 40)).unwrap();

    let cached = store.retrieve(&key).unwrap().unwrap();
    assert_eq!(cached.quality, 40);
    assert_eq!(cached.image.bytes(), &[2u8; 20][..]);
    assert_eq!(cache_entries(dir.path()), vec![key]);
}

#[test]
fn test_concurrent_stores_with_same_key() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("cache"));
    let key = compute_cache_key(b"shared image", &settings(0));
    let result = sample_result(vec![9; 4096], 90);

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| scope.spawn(|| store.store(&key, &result)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for outcome in &outcomes {
        assert!(outcome.is_ok(), "store failed: {outcome:?}");
    }
    let cached = store.retrieve(&key).unwrap().expect("entry should exist");
    assert_eq!(cached.quality, 90);
    assert_eq!(cached.image.bytes(), result.image.bytes());
    // staging directories are gone once every writer has returned
    assert_eq!(cache_entries(&dir.path().join("cache")), vec![key]);
}

#[test]
fn test_truncated_entry_is_a_miss() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let key = compute_cache_key(b"image", &settings(0));
    store.store(&key, &sample_result(vec![7; 32], 55)).unwrap();

    std::fs::write(dir.path().join(&key).join("result.jpg"), [7u8; 8]).unwrap();

    assert!(store.retrieve(&key).unwrap().is_none());
}

#[test]
fn test_invalid_key_is_rejected() {
    let dir = tempdir().unwrap();
    let store = CacheStore::new(dir.path());

    assert!(store.retrieve("../etc/passwd").is_err());
    assert!(store.store("nothex", &sample_result(vec![1], 50)).is_err());
    assert!(!store.contains("nothex"));
}

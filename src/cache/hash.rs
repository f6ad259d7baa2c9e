// SHA-256（元画像バイト列 + 探索パラメータ）
//
// Computes a cache key from the source image bytes and every parameter that
// influences the search. The key is a SHA-256 hash encoded as a lowercase
// hexadecimal string.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::compress::ContentHint;
use crate::compress::search::SearchConfig;

/// 探索結果に影響するパラメータ。
///
/// キャッシュキー計算時にハッシュに含める値のみを保持する。
pub struct CacheSettings {
    pub target_size_kb: u64,
    pub hint: Option<ContentHint>,
    pub search: SearchConfig,
}

/// 設定を正規化JSON形式に変換する（キーはアルファベット順で固定）。
fn settings_to_canonical_json(settings: &CacheSettings) -> String {
    let mut map = BTreeMap::new();
    map.insert(
        "default_quality",
        serde_json::json!(settings.search.default_quality),
    );
    map.insert(
        "default_strategy",
        serde_json::json!(settings.search.default_strategy.as_str()),
    );
    map.insert(
        "heuristic_iterations",
        serde_json::json!(settings.search.heuristic_iterations),
    );
    let hint = settings.hint.map(|h| {
        serde_json::json!({
            "strategy": h.strategy.as_str(),
            "suggested_quality": h.suggested_quality,
        })
    });
    map.insert("hint", serde_json::json!(hint));
    map.insert("max_quality", serde_json::json!(settings.search.max_quality));
    map.insert("min_quality", serde_json::json!(settings.search.min_quality));
    map.insert(
        "target_size_kb",
        serde_json::json!(settings.target_size_kb),
    );
    map.insert(
        "targeted_iterations",
        serde_json::json!(settings.search.targeted_iterations),
    );
    serde_json::to_string(&map).expect("serializing primitive cache settings to JSON must not fail")
}

/// 元画像と設定からキャッシュキー（SHA-256ハッシュ）を計算する。
///
/// ハッシュ入力: `source_len || source_bytes || settings_canonical_json`
/// 設定は正規化されたJSON形式（キーのアルファベット順）で結合される。
pub fn compute_cache_key(source: &[u8], settings: &CacheSettings) -> String {
    let mut hasher = Sha256::new();
    hasher.update((source.len() as u64).to_le_bytes());
    hasher.update(source);

    // 設定を正規化JSON形式で追加（キーはアルファベット順で固定）
    let settings_json = settings_to_canonical_json(settings);
    hasher.update(settings_json.as_bytes());

    hex::encode(hasher.finalize())
}

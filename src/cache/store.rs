// ファイルシステムキャッシュ: hash → 圧縮結果
//
// Stores and retrieves search results on disk, keyed by SHA-256 hash.
// Entries: result.jpg, metadata.json
// Writers stage into a unique `<key>.XXXX.tmp` directory before renaming.

use crate::codec::ImageData;
use crate::compress::{CompressionResult, Outcome};
use crate::error::SmartCompressError;
use serde_json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// キャッシュエントリの必須ファイル。
const CACHE_FILES: &[&str] = &["result.jpg", "metadata.json"];

/// ファイルシステムベースのキャッシュストア。
///
/// `<cache_dir>/<hex_hash>/` 以下に圧縮結果を格納する。
pub struct CacheStore {
    cache_dir: PathBuf,
}

/// metadata.json に保存する探索結果のメタデータ。
#[derive(serde::Serialize, serde::Deserialize)]
struct CacheMetadata {
    cache_key: String,
    quality: u8,
    size_bytes: u64,
    outcome: Outcome,
}

/// キャッシュキーが有効な SHA-256 hex 文字列であることを検証する。
///
/// 有効なキーは正確に64文字の小文字16進数([0-9a-f])である必要がある。
/// パストラバーサルや不正なディレクトリアクセスを防止する。
fn validate_cache_key(key: &str) -> crate::error::Result<()> {
    if key.len() == 64 && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        Ok(())
    } else {
        Err(SmartCompressError::cache(format!(
            "invalid cache key: expected 64-character lowercase hex string, got '{}'",
            key
        )))
    }
}

impl CacheStore {
    /// 指定されたディレクトリをキャッシュルートとして新しい CacheStore を作成する。
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    /// キャッシュキーからディレクトリパスを計算する。
    fn key_dir(&self, key: &str) -> crate::error::Result<PathBuf> {
        validate_cache_key(key)?;
        Ok(self.cache_dir.join(key))
    }

    /// 圧縮結果をキャッシュに保存する。
    ///
    /// キャッシュディレクトリが存在しない場合は自動的に作成する。
    /// 書き込みはアトミック: 書き込みごとに一意な一時ディレクトリへファイルを
    /// 書き込み、最後にrenameで最終パスに移動する。同じキーへの並行書き込みは
    /// 先に公開されたエントリを残す。
    pub fn store(
        &self,
        key: &str,
        result: &CompressionResult<ImageData>,
    ) -> crate::error::Result<()> {
        validate_cache_key(key)?;

        // 元画像をそのまま返した結果はキャッシュ不要
        if result.outcome == Outcome::ShortCircuit {
            return Ok(());
        }

        let dir = self.key_dir(key)?;
        fs::create_dir_all(&self.cache_dir).map_err(|e| SmartCompressError::cache(e.to_string()))?;

        let prefix = format!("{key}.");
        let tmp_dir = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempdir_in(&self.cache_dir)
            .map_err(|e| SmartCompressError::cache(e.to_string()))?;

        fs::write(tmp_dir.path().join("result.jpg"), result.image.bytes())
            .map_err(|e| SmartCompressError::cache(e.to_string()))?;

        let metadata = CacheMetadata {
            cache_key: key.to_string(),
            quality: result.quality,
            size_bytes: result.size_bytes,
            outcome: result.outcome,
        };
        let metadata_json = serde_json::to_string(&metadata)?;
        fs::write(tmp_dir.path().join("metadata.json"), metadata_json.as_bytes())
            .map_err(|e| SmartCompressError::cache(e.to_string()))?;

        // 既存エントリは退避用の一時ディレクトリへ移し、drop時に削除させる
        let _stale = if dir.exists() {
            let stale = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".old")
                .tempdir_in(&self.cache_dir)
                .map_err(|e| SmartCompressError::cache(e.to_string()))?;
            let _ = fs::rename(&dir, stale.path().join(key));
            Some(stale)
        } else {
            None
        };

        match fs::rename(tmp_dir.path(), &dir) {
            Ok(()) => Ok(()),
            // 同じキーのエントリを別の書き込みが先に公開した
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::DirectoryNotEmpty | io::ErrorKind::AlreadyExists
                ) =>
            {
                Ok(())
            }
            Err(e) => Err(SmartCompressError::cache(e.to_string())),
        }
    }

    /// キャッシュから圧縮結果を取得する。キャッシュミスの場合は None を返す。
    pub fn retrieve(
        &self,
        key: &str,
    ) -> crate::error::Result<Option<CompressionResult<ImageData>>> {
        let dir = self.key_dir(key)?;
        if !dir.exists() {
            return Ok(None);
        }

        let metadata_str = fs::read_to_string(dir.join("metadata.json"))
            .map_err(|e| SmartCompressError::cache(e.to_string()))?;
        let metadata: CacheMetadata = serde_json::from_str(&metadata_str)?;

        if metadata.cache_key != key {
            return Err(SmartCompressError::cache(format!(
                "cache key mismatch: expected '{}', found '{}'",
                key, metadata.cache_key
            )));
        }

        let bytes =
            fs::read(dir.join("result.jpg")).map_err(|e| SmartCompressError::cache(e.to_string()))?;

        // 画像サイズがメタデータと一致しない場合は破損扱いでキャッシュミス
        if bytes.len() as u64 != metadata.size_bytes {
            return Ok(None);
        }

        Ok(Some(CompressionResult {
            image: ImageData::from_bytes(bytes),
            quality: metadata.quality,
            size_bytes: metadata.size_bytes,
            outcome: metadata.outcome,
        }))
    }

    /// キャッシュキーが存在するか確認する。
    pub fn contains(&self, key: &str) -> bool {
        let dir = match self.key_dir(key) {
            Ok(d) => d,
            Err(_) => return false,
        };

        CACHE_FILES.iter().all(|f| dir.join(f).exists())
    }
}

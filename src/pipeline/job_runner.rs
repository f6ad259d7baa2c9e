// ジョブ単位: 画像読込 -> ヒント解決 -> キャッシュ確認 -> 品質探索 -> 出力
// 固定品質ジョブ: 画像読込 -> 一回エンコード -> 出力

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::cache::hash::{CacheSettings, compute_cache_key};
use crate::cache::store::CacheStore;
use crate::codec::jpeg::JpegRecompressor;
use crate::codec::{ByteSizeProbe, ImageData};
use crate::compress::search::{SearchConfig, fixed_compress, smart_compress};
use crate::compress::{CompressionRequest, CompressionResult, ContentHint, LogProgress, Outcome};
use crate::error::SmartCompressError;
use crate::hint::load_hint_file;

/// Configuration for a single job.
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Target size in KB; 0 selects the heuristic search.
    pub target_size_kb: u64,
    /// Inline hint. Takes precedence over `hint_file`.
    pub hint: Option<ContentHint>,
    /// Classifier response JSON to read a hint from.
    pub hint_file: Option<PathBuf>,
    /// Encode once at this quality instead of searching. Target, hints and
    /// the cache are not consulted.
    pub fixed_quality: Option<u8>,
    pub search: SearchConfig,
    pub cache_dir: Option<PathBuf>,
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub original_size: u64,
    pub quality: u8,
    pub size_bytes: u64,
    pub outcome: Outcome,
    pub cache_hit: bool,
}

/// Run a single compression job.
///
/// Cache read and write failures are logged and otherwise ignored; the job
/// only fails on I/O of the input/output files or on codec errors.
pub fn run_job(config: &JobConfig) -> crate::error::Result<JobResult> {
    let source = ImageData::open(&config.input_path).map_err(|e| {
        SmartCompressError::job(format!(
            "failed to read {}: {e}",
            config.input_path.display()
        ))
    })?;
    let original_size = source.len() as u64;

    if let Some(quality) = config.fixed_quality {
        let result = fixed_compress(&JpegRecompressor, &ByteSizeProbe, &source, quality)?;
        result.image.write_to(&config.output_path)?;
        info!(
            "{}: fixed quality {}, {} -> {} bytes",
            config.input_path.display(),
            quality,
            original_size,
            result.size_bytes
        );
        return Ok(job_result(config, original_size, &result, false));
    }

    let hint = config
        .hint
        .or_else(|| config.hint_file.as_deref().and_then(load_hint_file));
    debug!("{}: hint {:?}", config.input_path.display(), hint);

    let cache_store = config.cache_dir.as_ref().map(CacheStore::new);
    let cache_key = cache_store.as_ref().map(|_| {
        let cache_settings = CacheSettings {
            target_size_kb: config.target_size_kb,
            hint,
            search: config.search.clone(),
        };
        compute_cache_key(source.bytes(), &cache_settings)
    });

    if let (Some(store), Some(key)) = (cache_store.as_ref(), cache_key.as_deref()) {
        match store.retrieve(key) {
            Ok(Some(cached)) => {
                info!(
                    "{}: cache hit (quality {})",
                    config.input_path.display(),
                    cached.quality
                );
                cached.image.write_to(&config.output_path)?;
                return Ok(job_result(config, original_size, &cached, true));
            }
            Ok(None) => {}
            Err(e) => warn!("cache lookup failed for {}: {e}", config.input_path.display()),
        }
    }

    let request = CompressionRequest::new(&source)
        .with_target_kb(config.target_size_kb)
        .with_hint(hint);
    let label = config.input_path.display().to_string();
    let mut progress = LogProgress {
        label: &label,
        budget: config.search.budget(request.target_bytes().is_some()),
    };

    let result = smart_compress(
        &JpegRecompressor,
        &ByteSizeProbe,
        &request,
        &mut progress,
        &config.search,
    )?;

    if let (Some(store), Some(key)) = (cache_store.as_ref(), cache_key.as_deref())
        && let Err(e) = store.store(key, &result)
    {
        warn!("cache store failed for {}: {e}", config.input_path.display());
    }

    result.image.write_to(&config.output_path)?;
    info!(
        "{}: quality {}, {} -> {} bytes ({:?})",
        config.input_path.display(),
        result.quality,
        original_size,
        result.size_bytes,
        result.outcome
    );

    Ok(job_result(config, original_size, &result, false))
}

fn job_result(
    config: &JobConfig,
    original_size: u64,
    result: &CompressionResult<ImageData>,
    cache_hit: bool,
) -> JobResult {
    JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        original_size,
        quality: result.quality,
        size_bytes: result.size_bytes,
        outcome: result.outcome,
        cache_hit,
    }
}

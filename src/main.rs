use std::path::{Path, PathBuf};
use std::process::ExitCode;

use smart_compress::config;
use smart_compress::config::job::JobFile;
use smart_compress::config::merged::MergedConfig;
use smart_compress::pipeline::job_runner::JobConfig;
use smart_compress::pipeline::orchestrator::run_all_jobs;
use smart_compress::report::{compression_rate, format_file_size};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: smart_compress <jobs.yaml>...");
        eprintln!("  Recompress images to JPEG as described by job files.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("smart_compress {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut job_configs: Vec<JobConfig> = Vec::new();
    let mut parallel_workers = 0;

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };
        parallel_workers = parallel_workers.max(settings.parallel_workers);

        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file: JobFile = match serde_yml::from_str(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        for job in &job_file.jobs {
            let merged = MergedConfig::new(&settings, job);

            let hint = match job.inline_hint() {
                Ok(h) => h,
                Err(e) => {
                    eprintln!("ERROR: {}: {e}", job.input);
                    return ExitCode::FAILURE;
                }
            };
            let fixed_quality = match job.fixed_quality() {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("ERROR: {}: {e}", job.input);
                    return ExitCode::FAILURE;
                }
            };

            job_configs.push(JobConfig {
                input_path: resolve_path(&job_dir, &job.input),
                output_path: resolve_path(&job_dir, &job.output),
                target_size_kb: job.target_size.unwrap_or(0),
                hint,
                hint_file: job.hint_file.as_deref().map(|p| resolve_path(&job_dir, p)),
                fixed_quality,
                search: merged.search_config(),
                cache_dir: merged
                    .use_cache
                    .then(|| resolve_path(&job_dir, &merged.cache_dir.to_string_lossy())),
            });
        }
    }

    let results = run_all_jobs(&job_configs, parallel_workers);

    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                eprintln!(
                    "OK: {} -> {} (quality {}, {} -> {}, {:.1}% smaller{})",
                    job_result.input_path.display(),
                    job_result.output_path.display(),
                    job_result.quality,
                    format_file_size(job_result.original_size),
                    format_file_size(job_result.size_bytes),
                    compression_rate(job_result.original_size, job_result.size_bytes),
                    if job_result.cache_hit { ", cached" } else { "" }
                );
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job_configs[i].input_path.display(),
                    job_configs[i].output_path.display()
                );
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

//! Target-size-seeking JPEG quality search.
//!
//! The search itself lives in [`search`]; the strategy table and the
//! acceptance policy live in [`strategy`]. The encoder and the size probe are
//! ports so the search can run against the real codec or against a model.

pub mod search;
pub mod strategy;

use serde::{Deserialize, Serialize};

/// Compression strategy, usually suggested by a content classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    QualityPriority,
    #[default]
    Balanced,
    SizePriority,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::QualityPriority => "quality-priority",
            Strategy::Balanced => "balanced",
            Strategy::SizePriority => "size-priority",
        }
    }

    /// Map a strategy name to a strategy. Unknown names fall back to `Balanced`.
    pub fn from_name_or_default(name: &str) -> Self {
        match name.trim() {
            "quality-priority" => Strategy::QualityPriority,
            "size-priority" => Strategy::SizePriority,
            _ => Strategy::Balanced,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory hint from a content classifier. Never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHint {
    pub strategy: Strategy,
    pub suggested_quality: u8,
}

impl ContentHint {
    /// Build a hint from an untrusted quality value, clamping it to 0-100.
    pub fn new(strategy: Strategy, suggested_quality: i64) -> Self {
        Self {
            strategy,
            suggested_quality: suggested_quality.clamp(0, 100) as u8,
        }
    }
}

/// A single compression call's input.
#[derive(Debug, Clone, Copy)]
pub struct CompressionRequest<'a, I> {
    pub source: &'a I,
    /// Target size in KB (1024 bytes). `0` selects the heuristic mode.
    pub target_size_kb: u64,
    pub hint: Option<ContentHint>,
}

impl<'a, I> CompressionRequest<'a, I> {
    pub fn new(source: &'a I) -> Self {
        Self {
            source,
            target_size_kb: 0,
            hint: None,
        }
    }

    pub fn with_target_kb(mut self, target_size_kb: u64) -> Self {
        self.target_size_kb = target_size_kb;
        self
    }

    pub fn with_hint(mut self, hint: Option<ContentHint>) -> Self {
        self.hint = hint;
        self
    }

    /// Explicit target in bytes, or `None` in heuristic mode.
    pub fn target_bytes(&self) -> Option<u64> {
        (self.target_size_kb > 0).then(|| self.target_size_kb.saturating_mul(1024))
    }
}

/// Which path produced a [`CompressionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The source already fit the target and was returned untouched.
    ShortCircuit,
    /// A search attempt was accepted.
    Searched { attempts: u32 },
    /// No attempt was accepted; one extra encode at the fallback quality.
    Fallback { attempts: u32 },
    /// Encoded once at a caller-chosen quality, without searching.
    Fixed,
}

#[derive(Debug, Clone)]
pub struct CompressionResult<I> {
    pub image: I,
    pub quality: u8,
    pub size_bytes: u64,
    pub outcome: Outcome,
}

/// Compress an image at a fixed JPEG quality (0-100).
pub trait Encoder {
    type Image;

    fn compress_at_quality(&self, source: &Self::Image, quality: u8)
    -> crate::error::Result<Self::Image>;
}

/// Measure the stored size of an image in bytes.
pub trait SizeProbe<I> {
    fn size_of(&self, image: &I) -> crate::error::Result<u64>;
}

/// Receives one notification per search attempt. Must not block.
pub trait ProgressObserver {
    /// `attempt` is 1-based.
    fn on_attempt(&mut self, quality: u8, attempt: u32);
}

impl ProgressObserver for () {
    fn on_attempt(&mut self, _quality: u8, _attempt: u32) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8, u32),
{
    fn on_attempt(&mut self, quality: u8, attempt: u32) {
        self(quality, attempt)
    }
}

/// Observer that emits a `tracing` event per attempt.
pub struct LogProgress<'a> {
    pub label: &'a str,
    pub budget: u32,
}

impl ProgressObserver for LogProgress<'_> {
    fn on_attempt(&mut self, quality: u8, attempt: u32) {
        tracing::debug!(
            "{}: attempt {}/{} at quality {}",
            self.label,
            attempt,
            self.budget,
            quality
        );
    }
}

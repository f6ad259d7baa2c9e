// Bounded quality search: short-circuit -> strategy bounds -> bisection -> fallback

use tracing::debug;

use super::strategy::{QualityBounds, hinted_bounds, judge_against_target, judge_heuristic};
use super::{
    CompressionRequest, CompressionResult, Encoder, Outcome, ProgressObserver, SizeProbe, Strategy,
};

/// Tunables of the search. Hint-derived bounds ignore `min_quality` and
/// `max_quality`; those only apply when no hint is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quality of the fallback encode when there is no hint.
    pub default_quality: u8,
    /// Strategy used when there is no hint.
    pub default_strategy: Strategy,
    pub min_quality: u8,
    pub max_quality: u8,
    /// Attempt budget with an explicit target size.
    pub targeted_iterations: u32,
    /// Attempt budget in heuristic mode.
    pub heuristic_iterations: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_quality: 80,
            default_strategy: Strategy::Balanced,
            min_quality: 10,
            max_quality: 100,
            targeted_iterations: 10,
            heuristic_iterations: 7,
        }
    }
}

impl SearchConfig {
    pub fn budget(&self, has_target: bool) -> u32 {
        if has_target {
            self.targeted_iterations
        } else {
            self.heuristic_iterations
        }
    }
}

/// Best accepted candidate so far.
struct Candidate<I> {
    image: I,
    quality: u8,
    size_bytes: u64,
}

/// Mutable state owned by one `smart_compress` call.
struct SearchState<I> {
    bounds: QualityBounds,
    best: Option<Candidate<I>>,
    attempts: u32,
}

/// Search for the JPEG quality that best satisfies `request`.
///
/// With a target size the search converges on the highest quality whose
/// output fits the target. Without one it probes the acceptance band of the
/// active strategy. Always returns a result unless a primitive fails.
pub fn smart_compress<E, P, O>(
    encoder: &E,
    probe: &P,
    request: &CompressionRequest<'_, E::Image>,
    observer: &mut O,
    config: &SearchConfig,
) -> crate::error::Result<CompressionResult<E::Image>>
where
    E: Encoder,
    E::Image: Clone,
    P: SizeProbe<E::Image>,
    O: ProgressObserver + ?Sized,
{
    let original_bytes = probe.size_of(request.source)?;
    let target_bytes = request.target_bytes();

    if let Some(target) = target_bytes
        && original_bytes <= target
    {
        debug!(
            "source ({} bytes) already within target ({} bytes)",
            original_bytes, target
        );
        return Ok(CompressionResult {
            image: request.source.clone(),
            quality: 100,
            size_bytes: original_bytes,
            outcome: Outcome::ShortCircuit,
        });
    }

    let (strategy, bounds) = match &request.hint {
        Some(hint) => (hint.strategy, hinted_bounds(hint)),
        None => (
            config.default_strategy,
            QualityBounds::new(config.min_quality.into(), config.max_quality.into()),
        ),
    };
    let budget = config.budget(target_bytes.is_some());
    debug!(
        "searching with strategy {} in [{}, {}], budget {}",
        strategy, bounds.min, bounds.max, budget
    );

    let mut state = SearchState {
        bounds,
        best: None,
        attempts: 0,
    };

    while state.attempts < budget && !state.bounds.is_crossed() {
        let quality = state.bounds.midpoint();
        state.attempts += 1;
        let q = quality.clamp(0, 100) as u8;
        observer.on_attempt(q, state.attempts);

        let image = encoder.compress_at_quality(request.source, q)?;
        let size_bytes = probe.size_of(&image)?;

        let verdict = match target_bytes {
            Some(target) => judge_against_target(size_bytes, target),
            None => judge_heuristic(strategy, size_bytes, original_bytes),
        };
        debug!(
            "quality {} -> {} bytes, accept={}, narrow={:?}",
            q, size_bytes, verdict.accept, verdict.narrow
        );

        if verdict.accept {
            state.best = Some(Candidate {
                image,
                quality: q,
                size_bytes,
            });
        }
        verdict.apply(&mut state.bounds, quality);
    }

    if let Some(best) = state.best {
        return Ok(CompressionResult {
            image: best.image,
            quality: best.quality,
            size_bytes: best.size_bytes,
            outcome: Outcome::Searched {
                attempts: state.attempts,
            },
        });
    }

    let fallback_quality = request
        .hint
        .map(|h| h.suggested_quality)
        .unwrap_or(config.default_quality);
    debug!(
        "no candidate accepted after {} attempts, falling back to quality {}",
        state.attempts, fallback_quality
    );
    let image = encoder.compress_at_quality(request.source, fallback_quality)?;
    let size_bytes = probe.size_of(&image)?;

    Ok(CompressionResult {
        image,
        quality: fallback_quality,
        size_bytes,
        outcome: Outcome::Fallback {
            attempts: state.attempts,
        },
    })
}

/// Encode `source` once at `quality` and measure it. No target, hint or
/// short-circuit applies.
pub fn fixed_compress<E, P>(
    encoder: &E,
    probe: &P,
    source: &E::Image,
    quality: u8,
) -> crate::error::Result<CompressionResult<E::Image>>
where
    E: Encoder,
    P: SizeProbe<E::Image>,
{
    let image = encoder.compress_at_quality(source, quality)?;
    let size_bytes = probe.size_of(&image)?;
    debug!("fixed quality {} -> {} bytes", quality, size_bytes);

    Ok(CompressionResult {
        image,
        quality,
        size_bytes,
        outcome: Outcome::Fixed,
    })
}

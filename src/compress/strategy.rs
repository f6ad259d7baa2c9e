// Strategy table (initial search bounds) and acceptance/bisection policy.

use super::{ContentHint, Strategy};

/// Inclusive quality interval. Signed so that `quality - 1` below the lowest
/// configured bound stays representable and crossing is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityBounds {
    pub min: i32,
    pub max: i32,
}

impl QualityBounds {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn is_crossed(&self) -> bool {
        self.max < self.min
    }

    /// Midpoint of the interval, rounded down.
    pub fn midpoint(&self) -> i32 {
        (self.min + self.max).div_euclid(2)
    }
}

/// Derive the initial search interval from a hint's suggested quality.
///
/// | strategy         | min            | max            |
/// |------------------|----------------|----------------|
/// | quality-priority | max(60, S-15)  | min(100, S+10) |
/// | size-priority    | 10             | min(80, S)     |
/// | balanced         | max(50, S-20)  | min(95, S+15)  |
pub fn hinted_bounds(hint: &ContentHint) -> QualityBounds {
    let s = i32::from(hint.suggested_quality);
    match hint.strategy {
        Strategy::QualityPriority => QualityBounds::new((s - 15).max(60), (s + 10).min(100)),
        Strategy::SizePriority => QualityBounds::new(10, s.min(80)),
        Strategy::Balanced => QualityBounds::new((s - 20).max(50), (s + 15).min(95)),
    }
}

/// How one attempt moves the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrow {
    /// Search higher: `min = quality + 1`.
    Raise,
    /// Search lower: `max = quality - 1`.
    Lower,
}

/// Decision for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub accept: bool,
    pub narrow: Narrow,
}

impl Verdict {
    const fn new(accept: bool, narrow: Narrow) -> Self {
        Self { accept, narrow }
    }

    /// Apply the narrowing step to `bounds` for an attempt at `quality`.
    pub fn apply(&self, bounds: &mut QualityBounds, quality: i32) {
        match self.narrow {
            Narrow::Raise => bounds.min = quality + 1,
            Narrow::Lower => bounds.max = quality - 1,
        }
    }
}

/// Fraction of the original size above which quality-priority accepts.
pub const QUALITY_PRIORITY_FLOOR: f64 = 0.8;
/// Fraction of the original size below which size-priority searches higher.
pub const SIZE_PRIORITY_CEILING: f64 = 0.3;
/// Balanced sweet spot, as fractions of the original size.
pub const BALANCED_LOW: f64 = 0.5;
pub const BALANCED_HIGH: f64 = 0.7;

/// Decide on a candidate when an explicit target is set.
///
/// Converges on the highest quality that still fits; an oversized candidate
/// is never accepted.
pub fn judge_against_target(size_bytes: u64, target_bytes: u64) -> Verdict {
    if size_bytes <= target_bytes {
        Verdict::new(true, Narrow::Raise)
    } else {
        Verdict::new(false, Narrow::Lower)
    }
}

/// Decide on a candidate in heuristic mode, relative to the original size.
pub fn judge_heuristic(strategy: Strategy, size_bytes: u64, original_bytes: u64) -> Verdict {
    let size = size_bytes as f64;
    let original = original_bytes as f64;

    match strategy {
        Strategy::QualityPriority => {
            if size > original * QUALITY_PRIORITY_FLOOR {
                Verdict::new(true, Narrow::Raise)
            } else {
                Verdict::new(false, Narrow::Lower)
            }
        }
        Strategy::SizePriority => {
            if size < original * SIZE_PRIORITY_CEILING {
                Verdict::new(true, Narrow::Raise)
            } else {
                Verdict::new(true, Narrow::Lower)
            }
        }
        Strategy::Balanced => {
            if size < original * BALANCED_LOW {
                Verdict::new(true, Narrow::Raise)
            } else if size > original * BALANCED_HIGH {
                Verdict::new(false, Narrow::Lower)
            } else {
                // in the sweet spot: keep it, but keep probing downward
                Verdict::new(true, Narrow::Lower)
            }
        }
    }
}

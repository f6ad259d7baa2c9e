//! Content hints produced by an external vision classifier.
//!
//! The classifier answers with a JSON envelope:
//!
//! ```json
//! {
//!   "success": true,
//!   "imageType": "portrait",
//!   "confidence": 0.85,
//!   "recommendation": {
//!     "strategy": "quality-priority",
//!     "suggestedQuality": 85,
//!     "reason": "...",
//!     "tips": "..."
//!   }
//! }
//! ```
//!
//! A hint is advisory. Anything that cannot be read becomes "no hint".

use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::compress::{ContentHint, Strategy};
use crate::error::SmartCompressError;

/// Quality the classifier recommends when it has nothing better.
pub const DEFAULT_SUGGESTED_QUALITY: i64 = 80;
/// Confidence assumed when a model reply omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageType {
    Portrait,
    Landscape,
    Text,
    Product,
    Screenshot,
    Other,
    #[default]
    Unknown,
}

impl ImageType {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "portrait" => ImageType::Portrait,
            "landscape" => ImageType::Landscape,
            "text" => ImageType::Text,
            "product" => ImageType::Product,
            "screenshot" => ImageType::Screenshot,
            "other" => ImageType::Other,
            _ => ImageType::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ImageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ImageType::from_name(&s))
    }
}

/// The classifier's recommendation, already normalized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default, deserialize_with = "deserialize_strategy")]
    pub strategy: Strategy,
    #[serde(
        default = "default_suggested_quality",
        deserialize_with = "deserialize_quality"
    )]
    pub suggested_quality: u8,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub tips: String,
}

impl Recommendation {
    /// Recommendation used when classification is unavailable.
    pub fn fallback() -> Self {
        Recommendation {
            strategy: Strategy::Balanced,
            suggested_quality: DEFAULT_SUGGESTED_QUALITY as u8,
            reason: "classification unavailable, using balanced defaults".to_string(),
            tips: String::new(),
        }
    }

    pub fn to_hint(&self) -> ContentHint {
        ContentHint::new(self.strategy, i64::from(self.suggested_quality))
    }
}

/// Response envelope returned by the classification service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image_type: ImageType,
    pub confidence: Option<f64>,
    pub recommendation: Option<Recommendation>,
    pub error: Option<String>,
}

impl ClassifierResponse {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            SmartCompressError::hint(format!("Failed to parse classifier response: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The hint carried by this response, or `None` when the call failed.
    pub fn hint(&self) -> Option<ContentHint> {
        if !self.success {
            return None;
        }
        self.recommendation.as_ref().map(Recommendation::to_hint)
    }
}

/// Read a classifier response file into a hint.
///
/// Unreadable or unsuccessful responses yield `None` and a warning; they are
/// never an error for the caller.
pub fn load_hint_file(path: &Path) -> Option<ContentHint> {
    match ClassifierResponse::from_file(path) {
        Ok(response) => {
            if !response.success {
                warn!(
                    "classifier reported failure in {}: {}",
                    path.display(),
                    response.error.as_deref().unwrap_or("no reason given")
                );
            }
            response.hint()
        }
        Err(e) => {
            warn!("ignoring hint file {}: {e}", path.display());
            None
        }
    }
}

/// Analysis extracted from a free-text model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnalysis {
    pub image_type: ImageType,
    pub confidence: f64,
    pub recommendation: Recommendation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModelReply {
    #[serde(default)]
    image_type: Option<ImageType>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(flatten)]
    recommendation: Recommendation,
}

/// Extract the analysis JSON object embedded in a model's text reply.
///
/// The object spans from the first `{` to the last `}`. Missing fields take
/// their defaults and the suggested quality is clamped to 0-100. Returns
/// `None` when no parsable object is present.
pub fn parse_model_reply(content: &str) -> Option<ModelAnalysis> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawModelReply = serde_json::from_str(&content[start..=end]).ok()?;
    let confidence = raw
        .confidence
        .filter(|c| *c != 0.0 && c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE);

    Some(ModelAnalysis {
        image_type: raw.image_type.unwrap_or_default(),
        confidence,
        recommendation: raw.recommendation,
    })
}

fn default_suggested_quality() -> u8 {
    DEFAULT_SUGGESTED_QUALITY as u8
}

fn deserialize_strategy<'de, D>(deserializer: D) -> Result<Strategy, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.as_deref()
        .map(Strategy::from_name_or_default)
        .unwrap_or_default())
}

/// Accepts a number or a numeric string. Unreadable values become the default
/// quality, readable ones are clamped to 0-100.
fn deserialize_quality<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(quality_from_value(&value))
}

fn quality_from_value(value: &serde_json::Value) -> u8 {
    let parsed = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => leading_integer(s),
        _ => None,
    };
    match parsed {
        // zero is treated as missing
        Some(0) | None => DEFAULT_SUGGESTED_QUALITY as u8,
        Some(q) => q.clamp(0, 100) as u8,
    }
}

/// Parse the integer prefix of a string (`"85%"` -> 85).
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

use serde::Deserialize;

use crate::compress::{ContentHint, Strategy};
use crate::hint::DEFAULT_SUGGESTED_QUALITY;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub input: String,
    pub output: String,
    /// 目標サイズ（KB）。未指定または0ならヒューリスティック探索。
    #[serde(default, deserialize_with = "deserialize_target_size")]
    pub target_size: Option<u64>,
    pub strategy: Option<Strategy>,
    pub suggested_quality: Option<u8>,
    /// 固定品質。指定時は探索せず一度だけエンコードする。
    pub quality: Option<u8>,
    pub hint_file: Option<String>,
    pub default_quality: Option<u8>,
    pub use_cache: Option<bool>,
}

impl Job {
    /// ジョブに直接記述されたヒント（strategy / suggested_quality）を解決する。
    ///
    /// どちらも未指定なら `None`。片方のみ指定された場合、strategy は
    /// balanced、suggested_quality は 80 を補う。
    pub fn inline_hint(&self) -> crate::error::Result<Option<ContentHint>> {
        if self.strategy.is_none() && self.suggested_quality.is_none() {
            return Ok(None);
        }
        if let Some(q) = self.suggested_quality
            && q > 100
        {
            return Err(crate::error::SmartCompressError::config(format!(
                "suggested_quality must be 0-100, got {q}"
            )));
        }

        let strategy = self.strategy.unwrap_or_default();
        let quality = self
            .suggested_quality
            .map(i64::from)
            .unwrap_or(DEFAULT_SUGGESTED_QUALITY);
        Ok(Some(ContentHint::new(strategy, quality)))
    }

    /// 固定品質（`quality`）を検証して返す。
    pub fn fixed_quality(&self) -> crate::error::Result<Option<u8>> {
        match self.quality {
            Some(q) if q > 100 => Err(crate::error::SmartCompressError::config(format!(
                "quality must be 0-100, got {q}"
            ))),
            q => Ok(q),
        }
    }
}

/// 目標サイズ文字列をパースしてKB単位の整数に変換する。
///
/// 形式:
/// - 単位なし: `"150"` (150 KB)
/// - B: `"800B"` (KB未満は切り捨て)
/// - KB: `"150KB"`, `"150 kb"`, `"150K"`
/// - MB: `"1.5MB"`, `"2M"` (1 MB = 1024 KB)
///
/// 小数は切り捨て。`"0"` は目標なしを意味する。
pub fn parse_target_size(s: &str) -> crate::error::Result<u64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(crate::error::SmartCompressError::config(
            "Target size cannot be empty",
        ));
    }

    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    let value: f64 = number.parse().map_err(|_| {
        crate::error::SmartCompressError::config(format!("Invalid target size: '{trimmed}'"))
    })?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "b" => 1.0 / 1024.0,
        "" | "k" | "kb" => 1.0,
        "m" | "mb" => 1024.0,
        other => {
            return Err(crate::error::SmartCompressError::config(format!(
                "Unknown target size unit: '{other}'"
            )));
        }
    };

    let kb = (value * multiplier).floor();
    if !kb.is_finite() || kb > u64::MAX as f64 {
        return Err(crate::error::SmartCompressError::config(format!(
            "Target size out of range: '{trimmed}'"
        )));
    }
    Ok(kb as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTargetSize {
    Kb(u64),
    Text(String),
}

/// serdeのdeserialize_withで使用する目標サイズデシリアライザ
fn deserialize_target_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawTargetSize>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawTargetSize::Kb(kb)) => Ok(Some(kb)),
        Some(RawTargetSize::Text(s)) => parse_target_size(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

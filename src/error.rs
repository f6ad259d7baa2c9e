use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmartCompressError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("JPEG encode error: {0}")]
    EncodeError(String),

    #[error("Size probe error: {0}")]
    SizeProbeError(String),

    #[error("Hint error: {0}")]
    HintError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Job error: {0}")]
    JobError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`SmartCompressError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl SmartCompressError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an image decode error.
    decode => DecodeError,
    /// Create a JPEG encode error.
    encode => EncodeError,
    /// Create a size probe error.
    size_probe => SizeProbeError,
    /// Create a hint error.
    hint => HintError,
    /// Create a cache error.
    cache => CacheError,
    /// Create a job error.
    job => JobError,
}

impl From<serde_json::Error> for SmartCompressError {
    fn from(e: serde_json::Error) -> Self {
        Self::CacheError(e.to_string())
    }
}

impl From<serde_yml::Error> for SmartCompressError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for SmartCompressError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                Self::DecodeError(e.to_string())
            }
            _ => Self::EncodeError(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartCompressError>;

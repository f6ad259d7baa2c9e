pub mod cache;
pub mod codec;
pub mod compress;
pub mod config;
pub mod error;
pub mod hint;
pub mod pipeline;
pub mod report;

//! Provider contract shared by every feed adapter.

use async_trait::async_trait;
use evac_core::{Coordinate, Feature};
use thiserror::Error;

/// Failure of a single provider call. Never fatal to an aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("provider returned HTTP {0}")]
    BadStatus(u16),
    #[error("unparseable response: {0}")]
    Unparseable(String),
    /// The provider answered but reported an error in-band.
    #[error("provider rejected request ({status}): {message}")]
    Rejected { status: String, message: String },
}

/// One external data source.
///
/// `Ok(vec![])` means the provider answered and had nothing; that is not an
/// error and lets the cascade move on.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Short stable identifier used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<Vec<Feature>, ProviderError>;
}

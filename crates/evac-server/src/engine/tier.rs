//! Concurrent execution of one cascade tier.

use evac_core::{Coordinate, Feature};
use evac_providers::{ProviderError, SharedProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::EngineError;

/// Everything one tier produced, after every provider finished.
#[derive(Debug, Default)]
pub struct TierReport {
    /// Features in provider order, regardless of completion order.
    pub features: Vec<Feature>,
    pub failures: Vec<(String, ProviderError)>,
    pub attempted: usize,
}

impl TierReport {
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failures.len() == self.attempted
    }
}

/// Run `providers` concurrently and wait for all of them.
///
/// Each call is bounded by `timeout`. A failed, timed-out or panicked
/// provider is recorded and never affects its siblings. Cancelling `cancel`
/// aborts every outstanding call and returns [`EngineError::Cancelled`].
pub async fn run_tier(
    tier: &str,
    providers: &[SharedProvider],
    center: Coordinate,
    radius_m: f64,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<TierReport, EngineError> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let mut tasks = JoinSet::new();
    for (idx, provider) in providers.iter().enumerate() {
        let provider = Arc::clone(provider);
        tasks.spawn(async move {
            let result = match tokio::time::timeout(timeout, provider.fetch(center, radius_m)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout),
            };
            (idx, result)
        });
    }

    let mut slots: Vec<Option<Vec<Feature>>> = (0..providers.len()).map(|_| None).collect();
    let mut failures = Vec::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tasks.abort_all();
                tracing::info!("Tier {} cancelled with {} calls outstanding", tier, tasks.len());
                return Err(EngineError::Cancelled);
            }
            joined = tasks.join_next() => {
                let Some(joined) = joined else {
                    break;
                };
                match joined {
                    Ok((idx, Ok(features))) => {
                        tracing::debug!(
                            "Tier {}: {} returned {} features",
                            tier,
                            providers[idx].name(),
                            features.len()
                        );
                        slots[idx] = Some(features);
                    }
                    Ok((idx, Err(err))) => {
                        let name = providers[idx].name().to_string();
                        tracing::warn!("Tier {}: provider {} failed: {}", tier, name, err);
                        failures.push((name, err));
                    }
                    Err(err) => {
                        tracing::warn!("Tier {}: provider task aborted: {}", tier, err);
                        failures.push(("unknown".to_string(), ProviderError::Network(err.to_string())));
                    }
                }
            }
        }
    }

    Ok(TierReport {
        features: slots.into_iter().flatten().flatten().collect(),
        failures,
        attempted: providers.len(),
    })
}

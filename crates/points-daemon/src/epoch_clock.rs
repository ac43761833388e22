// crates/points-daemon/src/epoch_clock.rs
//
// Wall-clock driver for the economy's epoch counter.
//
// Holds the governance capability and advances the economy by one epoch per
// configured interval until shutdown is signalled.

use std::sync::Arc;
use std::time::Duration;

use points_core::{Epoch, GovernanceCap};

use crate::shared::EconomyService;

/// Tick the economy forward every `interval` until shutdown.
///
/// Returns the epoch the economy was at when the clock stopped.
pub async fn run_epoch_clock(
    service: EconomyService,
    governance: Arc<GovernanceCap>,
    interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Epoch {
    tracing::info!("Epoch clock started (interval={:?})", interval);
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.tick_epoch(&governance).await {
                    Ok(epoch) => tracing::info!("=== EPOCH {} ===", epoch),
                    Err(e) => {
                        tracing::error!("Epoch clock stopped: {}", e);
                        break;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    let epoch = service.current_epoch().await;
    tracing::info!("Epoch clock stopped at epoch {}", epoch);
    epoch
}

// crates/points-daemon/src/event_relay.rs
//
// Relays published economy events to the log as JSON lines, for external
// indexers tailing the daemon's output.

use tokio::sync::broadcast::{self, error::RecvError};

use points_core::PointsEvent;

/// Consume events until the channel closes or shutdown is signalled.
///
/// Returns the number of events relayed.
pub async fn run_event_relay(
    mut events: broadcast::Receiver<PointsEvent>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> u64 {
    let mut relayed = 0u64;
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    relay(&event);
                    relayed += 1;
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Event relay lagged, {} events dropped", missed);
                }
                Err(RecvError::Closed) => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!("Event relay stopped after {} events", relayed);
    relayed
}

fn relay(event: &PointsEvent) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(target: "points::events", event = event.name(), "{}", json),
        Err(e) => tracing::warn!("Could not serialize {} event: {}", event.name(), e),
    }
}

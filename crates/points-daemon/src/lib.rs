// crates/points-daemon/src/lib.rs
//
// points-daemon: hosts a PointsEconomy behind a single-writer lock and relays
// its events.
//
// The library half is what embedders and the integration tests use; the
// binary in main.rs wires it to a config file and the tracing subscriber.

pub mod config;
pub mod epoch_clock;
pub mod event_relay;
pub mod shared;
pub mod telemetry;

pub use config::{ConfigError, DaemonConfig};
pub use epoch_clock::run_epoch_clock;
pub use event_relay::run_event_relay;
pub use shared::EconomyService;

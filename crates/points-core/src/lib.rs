// crates/points-core/src/lib.rs
//
// points-core: Core types, capabilities, events, and errors for the points
// economy.
//
// This is the leaf crate that the rest of the workspace depends on. It holds
// the identifiers, the unforgeable capability tokens that gate privileged
// calls, the event vocabulary, and the error taxonomy.

pub mod capability;
pub mod error;
pub mod events;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use points_core::PointsError;`

// Capability types
pub use capability::{
    issue_genesis_capabilities, CapabilityId, GenesisCapabilities, GovernanceCap, OracleCap,
};

// Identity types
pub use identity::{AccountId, ChainId, Epoch, LoanId, OracleId, StakeId};

// Event types
pub use events::{EarnSource, PointsEvent, SpendSource};

// Error type
pub use error::{ErrorKind, PointsError};

// Traits
pub use traits::{EventLog, EventSink, NullSink};

// crates/points-core/src/capability.rs
//
// Unforgeable authorization tokens.
//
// A capability can only be obtained from its issuer: the fields are private,
// there is no public constructor, and neither type is `Clone` or
// `Deserialize`. Privileged objects (the ledger, each rate oracle) remember
// the `CapabilityId` they were bound to and compare it on every call.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PointsError;

/// Fingerprint of a capability. Knowing it does not let anyone mint the
/// capability itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityId(Uuid);

impl CapabilityId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authority over ledger issuance and burning.
#[derive(Debug)]
pub struct GovernanceCap {
    id: CapabilityId,
}

impl GovernanceCap {
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// Mint a fresh oracle-update capability. Oracles are bound to the
    /// capability that created them, so each returned cap controls only the
    /// oracles it creates.
    pub fn issue_oracle_cap(&self) -> OracleCap {
        OracleCap {
            id: CapabilityId::random(),
        }
    }

    /// Fails with `Unauthorized` unless this cap is the one `expected` names.
    pub fn authorize(&self, expected: CapabilityId) -> Result<(), PointsError> {
        authorize("governance", self.id, expected)
    }
}

/// Authority over creating and updating rate oracles.
#[derive(Debug)]
pub struct OracleCap {
    id: CapabilityId,
}

impl OracleCap {
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    pub fn authorize(&self, expected: CapabilityId) -> Result<(), PointsError> {
        authorize("oracle", self.id, expected)
    }
}

fn authorize(kind: &str, presented: CapabilityId, expected: CapabilityId) -> Result<(), PointsError> {
    if presented != expected {
        return Err(PointsError::Unauthorized(format!(
            "{} capability {} does not match bound capability {}",
            kind, presented, expected
        )));
    }
    Ok(())
}

/// The capabilities created at system initialization.
#[derive(Debug)]
pub struct GenesisCapabilities {
    pub governance: GovernanceCap,
    pub oracle: OracleCap,
}

/// Trusted issuer: creates the governance and oracle capabilities. Call once
/// when the economy is initialized and hand the results to their holders.
pub fn issue_genesis_capabilities() -> GenesisCapabilities {
    GenesisCapabilities {
        governance: GovernanceCap {
            id: CapabilityId::random(),
        },
        oracle: OracleCap {
            id: CapabilityId::random(),
        },
    }
}

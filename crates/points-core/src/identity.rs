// crates/points-core/src/identity.rs
//
// Identifiers for accounts and the objects they own.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PointsError;

/// Discrete, externally advanced time unit. The core never reads a clock.
pub type Epoch = u64;

/// Address of a point holder (a 32-byte public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Parse a hex-encoded 32-byte address, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, PointsError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| PointsError::InvalidAccount(format!("bad hex {}: {}", s, e)))?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            PointsError::InvalidAccount(format!("{} must be exactly 32 bytes", s))
        })?;
        Ok(Self(array))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Opaque identifier of the chain a stake's principal originates from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Allocate a fresh, time-ordered identifier.
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

object_id!(
    /// Identity of a stake position.
    StakeId
);
object_id!(
    /// Identity of an open loan.
    LoanId
);
object_id!(
    /// Identity of a rate oracle.
    OracleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_hex_roundtrip_with_prefix() {
        let account = AccountId([0xab; 32]);
        let shown = account.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(AccountId::from_hex(&shown).unwrap(), account);
    }

    #[test]
    fn test_account_hex_wrong_length() {
        for input in ["0xabcd", "not-hex"] {
            let err = AccountId::from_hex(input).unwrap_err();
            assert!(matches!(err, PointsError::InvalidAccount(_)));
            assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(StakeId::generate(), StakeId::generate());
        assert_ne!(LoanId::generate(), LoanId::generate());
    }
}

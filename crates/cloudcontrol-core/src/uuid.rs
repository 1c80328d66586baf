//! Strongly-typed UUID wrappers for CloudControl resources.
//!
//! CloudControl identifies every resource by UUID. Wrapping each kind in its own type keeps a
//! VLAN id from being passed where a network domain id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Declares a CloudControl id type: parsed from and displayed as the canonical UUID string,
/// serialized transparently.
macro_rules! resource_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a random id.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses an id, failing with [`Error::InvalidUuid`].
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a valid UUID.
            pub fn parse_str(input: &str) -> Result<Self> {
                Uuid::parse_str(input)
                    .map(Self)
                    .map_err(|_| Error::InvalidUuid(input.to_string()))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

resource_id!(NetworkDomainId, "Network domain id.");
resource_id!(VlanId, "VLAN id.");
resource_id!(ServerId, "Server id.");
resource_id!(FirewallRuleId, "Firewall rule id.");
resource_id!(PublicIpBlockId, "Public IPv4 address block id.");
resource_id!(ImageId, "OS or customer image id; a server clone yields one.");

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_UUID: &str = "8cdfd607-f429-4df6-9352-162cfc0891be";

    #[test]
    fn test_parse_str_valid() {
        let id = NetworkDomainId::parse_str(VALID_UUID).unwrap();
        assert_eq!(id.to_string(), VALID_UUID);
    }

    #[test]
    fn test_parse_str_invalid() {
        let result = VlanId::parse_str("not-a-uuid");
        assert!(matches!(result, Err(Error::InvalidUuid(_))));
    }

    #[test]
    fn test_from_str() {
        let id: ServerId = VALID_UUID.to_uppercase().parse().unwrap();
        assert_eq!(id.to_string(), VALID_UUID);
    }

    #[test]
    fn test_serde_transparent() {
        let id = ImageId::parse_str(VALID_UUID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{VALID_UUID}\""));

        let back: ImageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_new_v4_is_random() {
        assert_ne!(VlanId::new_v4(), VlanId::new_v4());
    }
}

//! Information about the network the datapath runs on.

use serde::{Deserialize, Serialize};

/// IP families available on a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressFamily {
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
    /// Dual stack.
    #[default]
    V4V6,
}

impl AddressFamily {
    /// Whether IPv4 destinations are reachable.
    pub fn supports_v4(self) -> bool {
        matches!(self, Self::V4 | Self::V4V6)
    }

    /// Whether IPv6 destinations are reachable.
    pub fn supports_v6(self) -> bool {
        matches!(self, Self::V6 | Self::V4V6)
    }
}

/// Kind of underlying network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    /// Unknown network type.
    #[default]
    Unknown,
    /// Wi-Fi.
    Wifi,
    /// Cellular.
    Cellular,
}

/// The active network as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Platform network handle.
    pub network_id: Option<i64>,
    /// Network type.
    pub network_type: NetworkType,
    /// Available IP families.
    pub address_family: AddressFamily,
}

impl NetworkInfo {
    /// Network info with only the address family set.
    pub fn with_family(address_family: AddressFamily) -> Self {
        Self {
            address_family,
            ..Self::default()
        }
    }
}

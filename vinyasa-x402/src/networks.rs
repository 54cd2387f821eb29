//! Known networks and their USDC deployments.
//!
//! The demo supports Base mainnet and Base Sepolia. Each entry carries
//! the USDC token address, its decimals, and the EIP-712 signing domain
//! a client needs to construct a valid transfer authorization offline.

/// EIP-712 typed-data domain descriptor for a token deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Domain name (e.g., "USDC").
    pub name: &'static str,
    /// Domain version.
    pub version: &'static str,
}

/// A token deployment on a specific network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    /// Token contract address (EIP-55 checksummed).
    pub address: &'static str,
    /// Decimal places of the atomic unit.
    pub decimals: u32,
    /// Signing-domain metadata, when the deployment publishes one.
    pub eip712: Option<Eip712Domain>,
}

/// A known network with its default payment asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// V1 network name (e.g., "base-sepolia").
    pub name: &'static str,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// USDC deployment on this network.
    pub usdc: AssetInfo,
}

/// Networks this server can issue challenges for.
pub const KNOWN_NETWORKS: [NetworkInfo; 2] = [
    NetworkInfo {
        name: "base-sepolia",
        chain_id: 84532,
        usdc: AssetInfo {
            address: "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
            decimals: 6,
            eip712: Some(Eip712Domain {
                name: "USDC",
                version: "2",
            }),
        },
    },
    NetworkInfo {
        name: "base",
        chain_id: 8453,
        usdc: AssetInfo {
            address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            decimals: 6,
            eip712: Some(Eip712Domain {
                name: "USD Coin",
                version: "2",
            }),
        },
    },
];

/// Looks up a network by its V1 name.
#[must_use]
pub fn network_by_name(name: &str) -> Option<&'static NetworkInfo> {
    KNOWN_NETWORKS.iter().find(|n| n.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_networks() {
        assert_eq!(network_by_name("base-sepolia").unwrap().chain_id, 84532);
        assert_eq!(network_by_name("base").unwrap().chain_id, 8453);
        assert!(network_by_name("ethereum").is_none());
    }

    #[test]
    fn test_usdc_metadata_present() {
        for network in &KNOWN_NETWORKS {
            assert_eq!(network.usdc.decimals, 6);
            assert!(network.usdc.eip712.is_some());
        }
    }
}

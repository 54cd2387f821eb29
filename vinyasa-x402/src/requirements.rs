//! Payment requirements builder and proof matching.
//!
//! Requirements are derived, never stored: the 402 challenge builds them
//! from `(price, network, pay_to, resource)`, and verification rebuilds
//! them from the same tuple. The builder is deterministic so both sides
//! agree byte-for-byte.

use alloy_primitives::Address;
use serde_json::json;

use crate::error::X402Error;
use crate::networks::network_by_name;
use crate::price::price_to_atomic_units;
use crate::proto::{PaymentPayload, PaymentRequirements};

/// Seconds a payment authorization stays acceptable.
const MAX_TIMEOUT_SECONDS: u64 = 60;

/// The only scheme this server advertises.
const SCHEME: &str = "exact";

/// Inputs to [`build_payment_requirements`].
#[derive(Debug, Clone, Copy)]
pub struct RequirementsInput<'a> {
    /// Human price string (e.g., "$1.00").
    pub price: &'a str,
    /// V1 network name.
    pub network: &'a str,
    /// Recipient address.
    pub pay_to: &'a str,
    /// URL of the gated resource.
    pub resource: &'a str,
    /// Human-readable description.
    pub description: &'a str,
    /// HTTP method clients use to fetch the resource.
    pub method: &'a str,
}

/// Parses and checksums an EVM address.
///
/// # Errors
///
/// Returns [`X402Error::Config`] if the input is not a valid address.
pub fn checksum_address(raw: &str) -> Result<String, X402Error> {
    let address: Address = raw
        .parse()
        .map_err(|_| X402Error::Config(format!("invalid EVM address {raw:?}")))?;
    Ok(address.to_checksum(None))
}

/// Builds the single-asset, single-scheme requirement set for a 402
/// challenge.
///
/// # Errors
///
/// - [`X402Error::UnsupportedPrice`] if the price cannot be converted to
///   atomic units.
/// - [`X402Error::Config`] for an unknown network, an invalid recipient
///   address, or an asset without EIP-712 signing-domain metadata.
pub fn build_payment_requirements(
    input: &RequirementsInput<'_>,
) -> Result<Vec<PaymentRequirements>, X402Error> {
    let network = network_by_name(input.network)
        .ok_or_else(|| X402Error::Config(format!("unknown network {:?}", input.network)))?;
    let asset = &network.usdc;

    // The signing domain is what lets a client construct a valid signed
    // transfer offline; a deployment without one cannot be challenged for.
    let eip712 = asset.eip712.ok_or_else(|| {
        X402Error::Config(format!(
            "asset on {} has no EIP-712 domain metadata",
            network.name
        ))
    })?;

    let max_amount_required = price_to_atomic_units(input.price, asset.decimals)?;

    Ok(vec![PaymentRequirements {
        scheme: SCHEME.to_owned(),
        network: network.name.to_owned(),
        max_amount_required,
        resource: input.resource.to_owned(),
        description: input.description.to_owned(),
        mime_type: String::new(),
        output_schema: Some(json!({
            "input": {
                "type": "http",
                "method": input.method,
                "discoverable": true,
            },
        })),
        pay_to: checksum_address(input.pay_to)?,
        max_timeout_seconds: MAX_TIMEOUT_SECONDS,
        asset: checksum_address(asset.address)?,
        extra: Some(json!({
            "name": eip712.name,
            "version": eip712.version,
        })),
    }])
}

/// Compares two address strings for equality regardless of checksum case.
fn addresses_equal(a: &str, b: &str) -> bool {
    match (a.parse::<Address>(), b.parse::<Address>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Selects the requirement the decoded proof satisfies: same scheme and
/// network, recipient matching the authorization, and an authorized
/// amount covering the required one. Protects against a client
/// satisfying a cheaper, wrong-network, or wrong-recipient obligation.
#[must_use]
pub fn find_matching_requirement<'r>(
    requirements: &'r [PaymentRequirements],
    payload: &PaymentPayload,
) -> Option<&'r PaymentRequirements> {
    requirements.iter().find(|req| {
        if req.scheme != payload.scheme || req.network != payload.network {
            return false;
        }
        let authorization = &payload.payload.authorization;
        if !addresses_equal(&authorization.to, &req.pay_to) {
            return false;
        }
        match (
            authorization.value.parse::<u128>(),
            req.max_amount_required.parse::<u128>(),
        ) {
            (Ok(authorized), Ok(required)) => authorized >= required,
            _ => false,
        }
    })
}

/// Projects a requirement set into the `accepts` array of a 402 body.
/// Pure serialization; no business logic.
#[must_use]
pub fn to_accepts(requirements: &[PaymentRequirements]) -> serde_json::Value {
    serde_json::to_value(requirements).unwrap_or_else(|_| json!([]))
}

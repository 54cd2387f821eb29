//! V1 wire format types for the x402 protocol.
//!
//! All types serialize to JSON with camelCase field names; the protocol
//! version is carried in the `x402Version` field. Payment proofs travel
//! in the `X-PAYMENT` request header as base64-encoded JSON.
//!
//! The decode contract is deliberately narrow: only the fields the
//! verification pipeline branches on are typed; everything else an SDK
//! might attach is not inspected here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::{Deserialize, Serialize};

use crate::error::X402Error;

/// The x402 protocol version this server speaks.
pub const X402_VERSION: u8 = 1;

/// Payment terms advertised in a 402 challenge and rebuilt during
/// verification. Equal inputs must produce byte-identical records, so the
/// client-side match and the server-side rebuild agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Payment scheme (always "exact" here).
    pub scheme: String,
    /// V1 network name (e.g., "base-sepolia").
    pub network: String,
    /// Required amount in atomic units, as a decimal string.
    pub max_amount_required: String,
    /// URL of the resource being paid for.
    pub resource: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of the resource (empty in this demo).
    pub mime_type: String,
    /// Discovery metadata for the request shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    /// Recipient address, EIP-55 checksummed.
    pub pay_to: String,
    /// Seconds the authorization stays valid.
    pub max_timeout_seconds: u64,
    /// Token contract address, EIP-55 checksummed.
    pub asset: String,
    /// EIP-712 signing-domain data for the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// EIP-3009 transfer authorization signed by the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmAuthorization {
    /// Payer address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Amount in atomic units, as a decimal string.
    pub value: String,
    /// Unix time the authorization becomes valid.
    pub valid_after: String,
    /// Unix time the authorization expires.
    pub valid_before: String,
    /// Random 32-byte nonce, hex encoded.
    pub nonce: String,
}

/// Scheme payload for "exact" on EVM networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmPayload {
    /// EIP-712 signature over the authorization.
    pub signature: String,
    /// The signed transfer authorization.
    pub authorization: ExactEvmAuthorization,
}

/// A decoded payment proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Protocol version; stamped to [`X402_VERSION`] on decode.
    #[serde(default = "default_version")]
    pub x402_version: u8,
    /// Payment scheme claimed by the proof.
    pub scheme: String,
    /// V1 network name claimed by the proof.
    pub network: String,
    /// The scheme-specific signed payload.
    pub payload: ExactEvmPayload,
}

const fn default_version() -> u8 {
    X402_VERSION
}

/// HTTP 402 response body carrying the acceptable payment methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version.
    pub x402_version: u8,
    /// Why the request was not served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Acceptable payment methods.
    pub accepts: Vec<PaymentRequirements>,
}

/// Facilitator response to a verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the proof is valid and settleable.
    pub is_valid: bool,
    /// Machine-readable reason when invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// Payer address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Facilitator response to a settlement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    /// Whether the payment was broadcast and settled.
    pub success: bool,
    /// Machine-readable reason when settlement failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// On-chain transaction reference on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// Network the settlement happened on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Payer address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Decodes a base64 payment proof from the `X-PAYMENT` header into a
/// typed payload, stamping the protocol version.
///
/// # Errors
///
/// Returns [`X402Error::InvalidProof`] if the proof is not valid base64
/// or the JSON does not match the expected shape.
pub fn decode_payment(proof: &str) -> Result<PaymentPayload, X402Error> {
    let bytes = b64
        .decode(proof.trim())
        .map_err(|e| X402Error::InvalidProof(format!("base64 decode failed: {e}")))?;
    let mut payload: PaymentPayload = serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::InvalidProof(format!("payload parse failed: {e}")))?;
    payload.x402_version = X402_VERSION;
    Ok(payload)
}

/// Encodes a payment payload into the `X-PAYMENT` header form.
#[must_use]
pub fn encode_payment(payload: &PaymentPayload) -> String {
    // PaymentPayload always serializes: no maps with non-string keys.
    let json = serde_json::to_vec(payload).expect("payload serializes");
    b64.encode(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> PaymentPayload {
        PaymentPayload {
            x402_version: X402_VERSION,
            scheme: "exact".to_owned(),
            network: "base-sepolia".to_owned(),
            payload: ExactEvmPayload {
                signature: "0xsig".to_owned(),
                authorization: ExactEvmAuthorization {
                    from: "0x857b06519E91e3A54538791bDbb0E22373e36b66".to_owned(),
                    to: "0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_owned(),
                    value: "1000000".to_owned(),
                    valid_after: "0".to_owned(),
                    valid_before: "1999999999".to_owned(),
                    nonce: "0x00".to_owned(),
                },
            },
        }
    }

    #[test]
    fn test_proof_round_trip_stamps_version() {
        let mut payload = sample_payload();
        payload.x402_version = 99;
        let decoded = decode_payment(&encode_payment(&payload)).unwrap();
        assert_eq!(decoded.x402_version, X402_VERSION);
        assert_eq!(decoded.scheme, "exact");
        assert_eq!(decoded.payload.authorization.value, "1000000");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_payment("not base64!!!"),
            Err(X402Error::InvalidProof(_))
        ));
        // Valid base64, wrong shape.
        let encoded = b64.encode(b"{\"hello\": \"world\"}");
        assert!(matches!(
            decode_payment(&encoded),
            Err(X402Error::InvalidProof(_))
        ));
    }

    #[test]
    fn test_requirements_wire_format_is_camel_case() {
        let req = PaymentRequirements {
            scheme: "exact".to_owned(),
            network: "base-sepolia".to_owned(),
            max_amount_required: "1000000".to_owned(),
            resource: "https://shop.example/classes/1".to_owned(),
            description: String::new(),
            mime_type: String::new(),
            output_schema: None,
            pay_to: "0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_owned(),
            max_timeout_seconds: 60,
            asset: "0x036CbD53842c5426634e7929541eC2318f3dCF7e".to_owned(),
            extra: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["maxAmountRequired"], "1000000");
        assert_eq!(json["payTo"], "0x209693Bc6afc0C5328bA36FaF03C514EF312287C");
        assert_eq!(json["maxTimeoutSeconds"], 60);
        assert!(json.get("outputSchema").is_none());
    }
}

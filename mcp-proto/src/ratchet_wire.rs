//! Wire layout for the optional Double Ratchet encryption overlay (spec
//! §4.10). The cryptographic state machine itself lives in the server
//! crate's `RatchetService` — this module only describes the envelope
//! that carries it over the transport.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatchetHeader {
    /// Base64-encoded X25519 public key for the sender's current DH ratchet step.
    pub dh_public_key: String,
    pub previous_counter: u64,
    pub message_counter: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub jsonrpc: String,
    pub encrypted: bool,
    /// Base64-encoded AES-256-GCM ciphertext of a complete JSON-RPC frame.
    pub ciphertext: String,
    /// Base64-encoded 96-bit nonce.
    pub iv: String,
    pub ratchet_header: RatchetHeader,
}

impl EncryptedEnvelope {
    pub fn new(ciphertext: String, iv: String, ratchet_header: RatchetHeader) -> Self {
        Self {
            jsonrpc: crate::jsonrpc::JSONRPC_VERSION.to_string(),
            encrypted: true,
            ciphertext,
            iv,
            ratchet_header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let envelope = EncryptedEnvelope::new(
            "ct".to_string(),
            "iv".to_string(),
            RatchetHeader { dh_public_key: "pk".to_string(), previous_counter: 0, message_counter: 1 },
        );
        let json = serde_json::to_string(&envelope).unwrap();
        let back: EncryptedEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ratchet_header.message_counter, 1);
        assert!(back.encrypted);
    }
}

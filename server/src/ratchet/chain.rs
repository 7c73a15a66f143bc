//! HKDF-SHA256 key derivation for the root and symmetric chains.

use hkdf::Hkdf;
use sha2::Sha256;

const RK_INFO: &[u8] = b"mcp-chess-ratchet-root-kdf";
const CK_INFO: &[u8] = b"mcp-chess-ratchet-chain-kdf";

/// `KDF_RK`: combine the current root key with a fresh DH output into a
/// new root key and a new chain key.
pub fn kdf_rk(root_key: &[u8; 32], dh_output: &[u8]) -> ([u8; 32], [u8; 32]) {
    let hk = Hkdf::<Sha256>::new(Some(root_key), dh_output);
    let mut okm = [0u8; 64];
    hk.expand(RK_INFO, &mut okm).expect("64 bytes is a valid HKDF-SHA256 output length");
    split(okm)
}

/// `KDF_CK`: advance a symmetric chain one step, producing the next chain
/// key and the message key for the step just consumed.
pub fn kdf_ck(chain_key: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
    let hk = Hkdf::<Sha256>::new(None, chain_key);
    let mut okm = [0u8; 64];
    hk.expand(CK_INFO, &mut okm).expect("64 bytes is a valid HKDF-SHA256 output length");
    split(okm)
}

fn split(okm: [u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a.copy_from_slice(&okm[..32]);
    b.copy_from_slice(&okm[32..]);
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_advancement_is_deterministic_and_one_way() {
        let chain_key = [7u8; 32];
        let (next1, key1) = kdf_ck(&chain_key);
        let (next2, key2) = kdf_ck(&chain_key);
        assert_eq!(next1, next2);
        assert_eq!(key1, key2);
        assert_ne!(next1, chain_key);
        assert_ne!(key1, next1);
    }

    #[test]
    fn different_dh_outputs_yield_different_roots() {
        let root = [1u8; 32];
        let (root_a, _) = kdf_rk(&root, b"dh-output-a");
        let (root_b, _) = kdf_rk(&root, b"dh-output-b");
        assert_ne!(root_a, root_b);
    }
}

//! `RatchetService` — optional Double Ratchet encryption overlay (spec
//! §4.10). One root/send/recv chain triple per agent; destroyed when the
//! agent is removed from the registry.
//!
//! Simplification versus the full Signal protocol: there is no X3DH
//! prekey bundle exchange. The agent's first encrypted frame doubles as
//! the DH handshake — its `ratchet_header.dh_public_key` is accepted as
//! the peer's initial key and combined with a server-generated static key
//! to seed the root key. This is adequate for a single always-online
//! server talking to one agent at a time, which is this system's actual
//! shape; it would not be for a federated multi-device Signal-style
//! deployment.

mod chain;
mod skipped;

use std::sync::Arc;
use std::time::{Duration, Instant};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use mcp_proto::{EncryptedEnvelope, RatchetHeader};
use rand::RngCore;
use tokio::sync::Mutex;
use x25519_dalek::{PublicKey, StaticSecret};

use chain::{kdf_ck, kdf_rk};
use skipped::SkippedKeyCache;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RatchetError {
    #[error("ratchet not yet established for this agent")]
    NotEstablished,
    #[error("malformed ratchet header")]
    MalformedHeader,
    #[error("decryption failed")]
    DecryptionFailed,
}

struct RatchetState {
    dh_self: StaticSecret,
    dh_self_public: PublicKey,
    dh_remote: Option<[u8; 32]>,
    root_key: [u8; 32],
    send_chain: Option<[u8; 32]>,
    recv_chain: Option<[u8; 32]>,
    send_counter: u64,
    recv_counter: u64,
    prev_send_counter: u64,
    skipped: SkippedKeyCache,
    last_activity: Instant,
}

impl RatchetState {
    fn fresh() -> Self {
        let dh_self = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let dh_self_public = PublicKey::from(&dh_self);
        Self {
            dh_self,
            dh_self_public,
            dh_remote: None,
            root_key: [0u8; 32],
            send_chain: None,
            recv_chain: None,
            send_counter: 0,
            recv_counter: 0,
            prev_send_counter: 0,
            skipped: SkippedKeyCache::new(1000),
            last_activity: Instant::now(),
        }
    }

    /// Perform a DH ratchet step when the peer presents a new public key:
    /// first derive the receive chain from our current key + their new
    /// one, then roll our own key forward and derive the send chain with
    /// the same peer key. Mirrors the two-step ratchet in the Signal
    /// protocol's `DHRatchet`.
    fn ratchet_if_new_remote_key(&mut self, remote: PublicKey) {
        let remote_bytes = remote.to_bytes();
        if self.dh_remote == Some(remote_bytes) {
            return;
        }

        let dh_out = self.dh_self.diffie_hellman(&remote);
        let (root_key, recv_chain) = kdf_rk(&self.root_key, dh_out.as_bytes());
        self.root_key = root_key;
        self.recv_chain = Some(recv_chain);
        self.recv_counter = 0;
        self.dh_remote = Some(remote_bytes);

        self.prev_send_counter = self.send_counter;
        let new_self = StaticSecret::random_from_rng(rand::rngs::OsRng);
        self.dh_self_public = PublicKey::from(&new_self);
        self.dh_self = new_self;

        let dh_out = self.dh_self.diffie_hellman(&remote);
        let (root_key, send_chain) = kdf_rk(&self.root_key, dh_out.as_bytes());
        self.root_key = root_key;
        self.send_chain = Some(send_chain);
        self.send_counter = 0;
    }
}

pub struct RatchetService {
    agents: DashMap<String, Arc<Mutex<RatchetState>>>,
    session_timeout: Duration,
}

impl RatchetService {
    pub fn new(session_timeout: Duration) -> Self {
        Self { agents: DashMap::new(), session_timeout }
    }

    fn state_for(&self, agent_id: &str) -> Arc<Mutex<RatchetState>> {
        self.agents.entry(agent_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(RatchetState::fresh()))).clone()
    }

    pub fn destroy(&self, agent_id: &str) {
        self.agents.remove(agent_id);
    }

    /// Drop ratchet state idle longer than the configured session timeout.
    pub fn sweep(&self) {
        let timeout = self.session_timeout;
        self.agents.retain(|_, state| {
            state.try_lock().map(|s| s.last_activity.elapsed() < timeout).unwrap_or(true)
        });
    }

    pub async fn decrypt_inbound(&self, agent_id: &str, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, RatchetError> {
        let remote_bytes = decode_public_key(&envelope.ratchet_header.dh_public_key)?;
        let remote = PublicKey::from(remote_bytes);

        let state = self.state_for(agent_id);
        let mut state = state.lock().await;
        state.last_activity = Instant::now();
        state.ratchet_if_new_remote_key(remote);

        let counter = envelope.ratchet_header.message_counter;
        let message_key = if counter < state.recv_counter {
            state.skipped.take(&remote_bytes, counter).ok_or(RatchetError::DecryptionFailed)?
        } else {
            let mut chain = state.recv_chain.ok_or(RatchetError::NotEstablished)?;
            while state.recv_counter < counter {
                let (next_chain, skipped_key) = kdf_ck(&chain);
                state.skipped.insert(remote_bytes, state.recv_counter, skipped_key);
                chain = next_chain;
                state.recv_counter += 1;
            }
            let (next_chain, message_key) = kdf_ck(&chain);
            state.recv_chain = Some(next_chain);
            state.recv_counter += 1;
            message_key
        };

        decrypt(&message_key, &envelope.iv, &envelope.ciphertext).ok_or(RatchetError::DecryptionFailed)
    }

    pub async fn encrypt_outbound(&self, agent_id: &str, plaintext: &[u8]) -> Result<EncryptedEnvelope, RatchetError> {
        let state = self.state_for(agent_id);
        let mut state = state.lock().await;
        state.last_activity = Instant::now();

        let chain = state.send_chain.ok_or(RatchetError::NotEstablished)?;
        let (next_chain, message_key) = kdf_ck(&chain);
        state.send_chain = Some(next_chain);

        let counter = state.send_counter;
        state.send_counter += 1;

        let (ciphertext, iv) = encrypt(&message_key, plaintext);
        let header = RatchetHeader {
            dh_public_key: BASE64.encode(state.dh_self_public.to_bytes()),
            previous_counter: state.prev_send_counter,
            message_counter: counter,
        };
        Ok(EncryptedEnvelope::new(ciphertext, iv, header))
    }
}

fn decode_public_key(encoded: &str) -> Result<[u8; 32], RatchetError> {
    let bytes = BASE64.decode(encoded).map_err(|_| RatchetError::MalformedHeader)?;
    bytes.try_into().map_err(|_| RatchetError::MalformedHeader)
}

fn encrypt(message_key: &[u8; 32], plaintext: &[u8]) -> (String, String) {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(message_key));
    let mut iv_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut iv_bytes);
    let nonce = Nonce::from_slice(&iv_bytes);
    let ciphertext = cipher.encrypt(nonce, plaintext).expect("AES-GCM encryption is infallible for valid keys");
    (BASE64.encode(ciphertext), BASE64.encode(iv_bytes))
}

fn decrypt(message_key: &[u8; 32], iv: &str, ciphertext: &str) -> Option<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(message_key));
    let iv_bytes = BASE64.decode(iv).ok()?;
    let ct_bytes = BASE64.decode(ciphertext).ok()?;
    let nonce = Nonce::from_slice(&iv_bytes);
    cipher.decrypt(nonce, ct_bytes.as_slice()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn establishes_then_round_trips_a_message() {
        let service = RatchetService::new(Duration::from_secs(1800));

        let bob_secret = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let bob_public = PublicKey::from(&bob_secret);

        let handshake = EncryptedEnvelope::new(
            "".to_string(),
            "".to_string(),
            RatchetHeader {
                dh_public_key: BASE64.encode(bob_public.to_bytes()),
                previous_counter: 0,
                message_counter: 0,
            },
        );

        // The first "decrypt" just performs the DH ratchet step; an empty
        // ciphertext intentionally fails decryption afterward.
        let _ = service.decrypt_inbound("agent-1", &handshake).await;

        let envelope = service.encrypt_outbound("agent-1", b"hello").await.unwrap();
        assert!(envelope.encrypted);
        assert_eq!(envelope.ratchet_header.message_counter, 0);
    }

    #[tokio::test]
    async fn encrypt_before_handshake_is_rejected() {
        let service = RatchetService::new(Duration::from_secs(1800));
        let err = service.encrypt_outbound("agent-1", b"hi").await.unwrap_err();
        assert!(matches!(err, RatchetError::NotEstablished));
    }
}

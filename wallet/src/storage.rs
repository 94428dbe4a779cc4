use serde::{Deserialize, Serialize};

/// A seed persisted on disk, either in the clear or behind a master key.
/// The two modes are mutually exclusive: a wallet is either encrypted or
/// it isn't, for its whole lifetime.
#[derive(Clone, Serialize, Deserialize)]
pub enum SeedFile {
    Plain { seed: [u8; 32] },
    Encrypted(EncryptedSeed),
}

/// `uid` derives a sub-key from the master key; that sub-key encrypts both
/// the seed and a fixed plaintext used to verify the unlock key later
/// guessed correctly without ever storing the master key itself.
#[derive(Clone, Serialize, Deserialize)]
pub struct EncryptedSeed {
    pub uid: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
    pub verification_nonce: [u8; 12],
    pub verification_ciphertext: Vec<u8>,
}

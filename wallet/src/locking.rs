use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

use crate::error::WalletError;
use crate::seed::Seed;
use crate::storage::{EncryptedSeed, SeedFile};

const VERIFICATION_PLAINTEXT: &[u8] = b"pobs-wallet-verification";

fn sub_key(master: &[u8; 32], uid: &[u8; 16]) -> [u8; 32] {
    let digest = blake2b_simd::Params::new()
        .hash_length(32)
        .to_state()
        .update(master)
        .update(uid)
        .finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(digest.as_bytes());
    key
}

fn random_nonce() -> [u8; 12] {
    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypts `seed` under `master`: a random `uid` derives a sub-key, which
/// encrypts both the seed and the fixed verification plaintext.
pub fn encrypt_seed(master: &[u8; 32], seed: &Seed) -> EncryptedSeed {
    let mut uid = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut uid);
    let key = sub_key(master, &uid);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));

    let nonce = random_nonce();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), seed.0.as_slice())
        .expect("encryption with a freshly generated nonce cannot fail");

    let verification_nonce = random_nonce();
    let verification_ciphertext = cipher
        .encrypt(Nonce::from_slice(&verification_nonce), VERIFICATION_PLAINTEXT)
        .expect("encryption with a freshly generated nonce cannot fail");

    EncryptedSeed {
        uid,
        nonce,
        ciphertext,
        verification_nonce,
        verification_ciphertext,
    }
}

/// Recovers the `Seed` behind `file`. For an encrypted file, `unlock_key`
/// must decrypt the verification plaintext back to its expected value, or
/// this fails with `BadEncryptionKey`. For a plain file, `unlock_key` is
/// ignored.
pub fn recover_seed(file: &SeedFile, unlock_key: Option<&[u8; 32]>) -> Result<Seed, WalletError> {
    match file {
        SeedFile::Plain { seed } => Ok(Seed::from_bytes(*seed)),
        SeedFile::Encrypted(enc) => {
            let master = unlock_key.ok_or(WalletError::BadEncryptionKey)?;
            let key = sub_key(master, &enc.uid);
            let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));

            let verification = cipher
                .decrypt(Nonce::from_slice(&enc.verification_nonce), enc.verification_ciphertext.as_slice())
                .map_err(|_| WalletError::BadEncryptionKey)?;
            if verification != VERIFICATION_PLAINTEXT {
                return Err(WalletError::BadEncryptionKey);
            }

            let seed_bytes = cipher
                .decrypt(Nonce::from_slice(&enc.nonce), enc.ciphertext.as_slice())
                .map_err(|_| WalletError::BadEncryptionKey)?;
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&seed_bytes);
            Ok(Seed::from_bytes(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypted_round_trip_with_correct_master_key() {
        let master = [1u8; 32];
        let seed = Seed::from_bytes([2u8; 32]);
        let encrypted = encrypt_seed(&master, &seed);
        let file = SeedFile::Encrypted(encrypted);
        let recovered = recover_seed(&file, Some(&master)).unwrap();
        assert_eq!(recovered.0, seed.0);
    }

    #[test]
    fn wrong_master_key_fails_to_unlock() {
        let master = [1u8; 32];
        let wrong = [9u8; 32];
        let seed = Seed::from_bytes([2u8; 32]);
        let encrypted = encrypt_seed(&master, &seed);
        let file = SeedFile::Encrypted(encrypted);
        let err = recover_seed(&file, Some(&wrong)).unwrap_err();
        assert!(matches!(err, WalletError::BadEncryptionKey));
    }

    #[test]
    fn plain_seed_file_needs_no_key() {
        let seed = Seed::from_bytes([3u8; 32]);
        let file = SeedFile::Plain { seed: seed.0 };
        let recovered = recover_seed(&file, None).unwrap();
        assert_eq!(recovered.0, seed.0);
    }
}

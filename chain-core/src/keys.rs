use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use crate::hash::Hash;
use crate::unlock_hash::{UnlockHash, UnlockHashType};
use secp256k1::{Message, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// A public key under the single signature algorithm the wallet supports.
/// Encodes as its 33-byte compressed SEC1 form.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub secp256k1::PublicKey);

impl PublicKey {
    pub fn from_secret(secp: &Secp256k1<secp256k1::All>, sk: &SecretKey) -> PublicKey {
        PublicKey(secp256k1::PublicKey::from_secret_key(secp, sk))
    }

    /// The unlock hash that a `PubKey`-type condition over this key resolves to.
    pub fn unlock_hash(&self) -> UnlockHash {
        let digest = Hash::of_parts(&[&self.0.serialize()]);
        UnlockHash::new(UnlockHashType::PubKey, digest)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0.serialize()))
    }
}

impl Encode for PublicKey {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.serialize().encode(enc)
    }
}

impl Decode for PublicKey {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let bytes = <[u8; 33]>::decode(dec)?;
        let key = secp256k1::PublicKey::from_slice(&bytes)
            .map_err(|e| DecodeError::Decode(format!("invalid public key: {}", e)))?;
        Ok(PublicKey(key))
    }
}

/// A detached ECDSA signature, compact 64-byte form.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub secp256k1::ecdsa::Signature);

impl Signature {
    pub fn sign(secp: &Secp256k1<secp256k1::All>, sk: &SecretKey, digest: &Hash) -> Signature {
        let msg = Message::from_slice(digest.as_bytes()).expect("32-byte digest is a valid message");
        Signature(secp.sign_ecdsa(&msg, sk))
    }

    pub fn verify(&self, secp: &Secp256k1<secp256k1::All>, pk: &PublicKey, digest: &Hash) -> bool {
        let msg = match Message::from_slice(digest.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        secp.verify_ecdsa(&msg, &self.0, &pk.0).is_ok()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0.serialize_compact()))
    }
}

impl Encode for Signature {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.serialize_compact().encode(enc)
    }
}

impl Decode for Signature {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let bytes = <[u8; 64]>::decode(dec)?;
        let sig = secp256k1::ecdsa::Signature::from_compact(&bytes)
            .map_err(|e| DecodeError::Decode(format!("invalid signature: {}", e)))?;
        Ok(Signature(sig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[7u8; 32]).unwrap();
        let pk = PublicKey::from_secret(&secp, &sk);
        let digest = Hash::of_parts(&[b"message"]);
        let sig = Signature::sign(&secp, &sk, &digest);
        assert!(sig.verify(&secp, &pk, &digest));
    }
}

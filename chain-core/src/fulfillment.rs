use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use crate::keys::{PublicKey, Signature};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// The evidence presented to authorize spending under a condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnlockFulfillment {
    Nil,
    SingleSignature {
        pubkey: PublicKey,
        signature: Signature,
    },
    MultiSignature {
        pairs: Vec<(PublicKey, Signature)>,
    },
}

impl UnlockFulfillment {
    pub fn single_signature(pubkey: PublicKey, signature: Signature) -> UnlockFulfillment {
        UnlockFulfillment::SingleSignature { pubkey, signature }
    }
}

const TAG_NIL: u8 = 0;
const TAG_SINGLE_SIGNATURE: u8 = 1;
const TAG_MULTI_SIGNATURE: u8 = 2;

impl Encode for UnlockFulfillment {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            UnlockFulfillment::Nil => enc.write_byte(TAG_NIL),
            UnlockFulfillment::SingleSignature { pubkey, signature } => {
                enc.write_byte(TAG_SINGLE_SIGNATURE)?;
                pubkey.encode(enc)?;
                signature.encode(enc)
            }
            UnlockFulfillment::MultiSignature { pairs } => {
                enc.write_byte(TAG_MULTI_SIGNATURE)?;
                pairs.encode(enc)
            }
        }
    }
}

impl Decode for UnlockFulfillment {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        match dec.read_byte()? {
            TAG_NIL => Ok(UnlockFulfillment::Nil),
            TAG_SINGLE_SIGNATURE => Ok(UnlockFulfillment::SingleSignature {
                pubkey: PublicKey::decode(dec)?,
                signature: Signature::decode(dec)?,
            }),
            TAG_MULTI_SIGNATURE => Ok(UnlockFulfillment::MultiSignature {
                pairs: Vec::decode(dec)?,
            }),
            other => Err(DecodeError::Decode(format!(
                "unknown unlock fulfillment tag {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;
    use secp256k1::{Secp256k1, SecretKey};

    #[test]
    fn nil_roundtrips() {
        let f = UnlockFulfillment::Nil;
        let bytes = f.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = UnlockFulfillment::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn single_signature_roundtrips() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[3u8; 32]).unwrap();
        let pk = PublicKey::from_secret(&secp, &sk);
        let digest = crate::hash::Hash::of_parts(&[b"tx"]);
        let sig = Signature::sign(&secp, &sk, &digest);
        let f = UnlockFulfillment::single_signature(pk, sig);
        let bytes = f.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = UnlockFulfillment::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(f, back);
    }
}

use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// The discriminant carried alongside an [`UnlockHash`]'s digest.
///
/// `TimeLock` is a reserved pseudo-type: it is never the type of a value
/// actually stored in an `UnlockHash`, but exists so that code resolving a
/// `TimeLock`-wrapped condition's unlock hash can express "this resolves
/// to its inner type" without a separate enum.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum UnlockHashType {
    Nil = 0,
    PubKey = 1,
    MultiSig = 2,
    TimeLock = 3,
}

impl UnlockHashType {
    pub fn from_u8(v: u8) -> Result<UnlockHashType, DecodeError> {
        match v {
            0 => Ok(UnlockHashType::Nil),
            1 => Ok(UnlockHashType::PubKey),
            2 => Ok(UnlockHashType::MultiSig),
            3 => Ok(UnlockHashType::TimeLock),
            other => Err(DecodeError::Decode(format!("unknown unlock hash type {}", other))),
        }
    }
}

/// The chain's address form: a type tag plus a 32-byte digest over the
/// condition's canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnlockHash {
    pub kind: UnlockHashType,
    pub digest: Hash,
}

impl UnlockHash {
    pub fn new(kind: UnlockHashType, digest: Hash) -> UnlockHash {
        UnlockHash { kind, digest }
    }

    pub fn nil() -> UnlockHash {
        UnlockHash::new(UnlockHashType::Nil, Hash([0u8; 32]))
    }
}

impl fmt::Debug for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{}", self.kind as u8, self.digest)
    }
}

impl fmt::Display for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // type byte || digest || 6-byte checksum over both, all hex-encoded,
        // the conventional rendering for this address form.
        let mut buf = Vec::with_capacity(1 + Hash::LEN);
        buf.push(self.kind as u8);
        buf.extend_from_slice(self.digest.as_bytes());
        let checksum = Hash::of_parts(&[&buf]);
        write!(
            f,
            "{}{}",
            hex::encode(&buf),
            hex::encode(&checksum.as_bytes()[..6])
        )
    }
}

impl FromStr for UnlockHash {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| DecodeError::Decode(e.to_string()))?;
        if bytes.len() != 1 + Hash::LEN + 6 {
            return Err(DecodeError::Decode("unlock hash: wrong length".into()));
        }
        let (body, checksum) = bytes.split_at(1 + Hash::LEN);
        let expect = Hash::of_parts(&[body]);
        if &expect.as_bytes()[..6] != checksum {
            return Err(DecodeError::Decode("unlock hash: bad checksum".into()));
        }
        let kind = UnlockHashType::from_u8(body[0])?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&body[1..]);
        Ok(UnlockHash::new(kind, Hash(digest)))
    }
}

impl Encode for UnlockHash {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        (self.kind as u8).encode(enc)?;
        self.digest.encode(enc)
    }
}

impl Decode for UnlockHash {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let kind = UnlockHashType::from_u8(u8::decode(dec)?)?;
        let digest = Hash::decode(dec)?;
        Ok(UnlockHash::new(kind, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;

    #[test]
    fn roundtrips_through_codec() {
        let uh = UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[b"pk"]));
        let bytes = uh.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = UnlockHash::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(uh, back);
    }

    #[test]
    fn display_from_str_roundtrip() {
        let uh = UnlockHash::new(UnlockHashType::MultiSig, Hash::of_parts(&[b"multisig"]));
        let s = uh.to_string();
        let back: UnlockHash = s.parse().unwrap();
        assert_eq!(uh, back);
    }

    #[test]
    fn rejects_bad_checksum() {
        let uh = UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[b"pk"]));
        let mut s = uh.to_string();
        s.push('0');
        s.remove(0);
        assert!(s.parse::<UnlockHash>().is_err());
    }
}

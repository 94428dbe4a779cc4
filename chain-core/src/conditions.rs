use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use crate::context::FulfillContext;
use crate::fulfillment::UnlockFulfillment;
use crate::hash::Hash;
use crate::unlock_hash::{UnlockHash, UnlockHashType};
use chrono::{DateTime, Utc};
use secp256k1::Secp256k1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ConditionError {
    #[error("fulfillment did not satisfy condition: {0}")]
    Unfulfilled(String),
    #[error("condition is not standard: {0}")]
    NotStandard(String),
    #[error("time lock has not expired")]
    LockNotExpired,
}

/// `nLockTime`-style dual interpretation: values below the threshold are a
/// block height, values at or above it are a Unix timestamp in seconds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LockTime(pub u64);

impl LockTime {
    /// rivine's convention: below this value a `LockTime` is a height.
    pub const THRESHOLD: u64 = 500_000_000;

    pub fn is_height(&self) -> bool {
        self.0 < Self::THRESHOLD
    }

    pub fn has_expired(&self, height: crate::height::BlockHeight, time: DateTime<Utc>) -> bool {
        if self.is_height() {
            height.0 >= self.0
        } else {
            time.timestamp() >= 0 && time.timestamp() as u64 >= self.0
        }
    }
}

impl Encode for LockTime {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.encode(enc)
    }
}
impl Decode for LockTime {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok(LockTime(u64::decode(dec)?))
    }
}

/// A tagged unlock condition. Fixed, closed set of variants; new kinds of
/// spending rule are never added dynamically.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum UnlockCondition {
    Nil,
    UnlockHash(UnlockHash),
    MultiSig {
        owners: BTreeSet<UnlockHash>,
        min_sigs: u64,
    },
    TimeLock {
        until: LockTime,
        inner: Box<UnlockCondition>,
    },
}

const TAG_NIL: u8 = 0;
const TAG_UNLOCK_HASH: u8 = 1;
const TAG_MULTI_SIG: u8 = 2;
const TAG_TIME_LOCK: u8 = 3;

impl UnlockCondition {
    /// The variant's type, resolving `TimeLock` to the type its inner
    /// condition would report.
    pub fn condition_type(&self) -> UnlockHashType {
        match self {
            UnlockCondition::Nil => UnlockHashType::Nil,
            UnlockCondition::UnlockHash(uh) => uh.kind,
            UnlockCondition::MultiSig { .. } => UnlockHashType::MultiSig,
            UnlockCondition::TimeLock { inner, .. } => inner.condition_type(),
        }
    }

    /// A deterministic digest over the condition's canonical bytes,
    /// prefixed with its type tag. `TimeLock` resolution ignores the lock
    /// and reports its inner condition's unlock hash.
    pub fn unlock_hash(&self) -> UnlockHash {
        match self {
            UnlockCondition::Nil => UnlockHash::nil(),
            UnlockCondition::UnlockHash(uh) => *uh,
            UnlockCondition::MultiSig { .. } => {
                let bytes = self
                    .encode_to_vec(crate::codec::CodecFlavor::Compact)
                    .expect("in-memory encode cannot fail");
                UnlockHash::new(UnlockHashType::MultiSig, Hash::of_parts(&[&bytes]))
            }
            UnlockCondition::TimeLock { inner, .. } => inner.unlock_hash(),
        }
    }

    /// Only `PubKey`-unlock-hash, `MultiSig`, or a `TimeLock` wrapping one
    /// of those are admissible as mint conditions or as outputs' spending
    /// conditions under the current protocol rules.
    pub fn is_standard(&self, _ctx: &FulfillContext) -> Result<(), ConditionError> {
        match self {
            UnlockCondition::Nil => Err(ConditionError::NotStandard("nil condition".into())),
            UnlockCondition::UnlockHash(uh) => {
                if uh.kind == UnlockHashType::PubKey {
                    Ok(())
                } else {
                    Err(ConditionError::NotStandard(format!(
                        "unlock hash type {:?} is not standard",
                        uh.kind
                    )))
                }
            }
            UnlockCondition::MultiSig { owners, min_sigs } => {
                if *min_sigs == 0 || *min_sigs as usize > owners.len() {
                    Err(ConditionError::NotStandard("invalid multisig threshold".into()))
                } else {
                    Ok(())
                }
            }
            UnlockCondition::TimeLock { inner, .. } => inner.is_standard(_ctx),
        }
    }

    /// Verifies that `fulfillment` authorizes spending this condition at
    /// `ctx`. `TimeLock` first checks the time/height gate, then delegates
    /// to its inner condition.
    pub fn fulfill(
        &self,
        fulfillment: &UnlockFulfillment,
        ctx: &FulfillContext,
    ) -> Result<(), ConditionError> {
        match self {
            UnlockCondition::Nil => match fulfillment {
                UnlockFulfillment::Nil => Ok(()),
                _ => Err(ConditionError::Unfulfilled("nil condition requires nil fulfillment".into())),
            },
            UnlockCondition::UnlockHash(uh) => match fulfillment {
                UnlockFulfillment::SingleSignature { pubkey, signature } => {
                    if pubkey.unlock_hash() != *uh {
                        return Err(ConditionError::Unfulfilled("public key does not match unlock hash".into()));
                    }
                    let digest = signature_message(ctx);
                    let secp = Secp256k1::verification_only();
                    if signature.verify(&secp, pubkey, &digest) {
                        Ok(())
                    } else {
                        Err(ConditionError::Unfulfilled("signature does not verify".into()))
                    }
                }
                _ => Err(ConditionError::Unfulfilled("unlock hash condition requires a single signature".into())),
            },
            UnlockCondition::MultiSig { owners, min_sigs } => match fulfillment {
                UnlockFulfillment::MultiSignature { pairs } => {
                    let digest = signature_message(ctx);
                    let secp = Secp256k1::verification_only();
                    let mut seen = BTreeSet::new();
                    let mut valid = 0u64;
                    for (pk, sig) in pairs {
                        let uh = pk.unlock_hash();
                        if !owners.contains(&uh) || seen.contains(&uh) {
                            continue;
                        }
                        if sig.verify(&secp, pk, &digest) {
                            seen.insert(uh);
                            valid += 1;
                        }
                    }
                    if valid >= *min_sigs {
                        Ok(())
                    } else {
                        Err(ConditionError::Unfulfilled(format!(
                            "only {} of {} required signatures verified",
                            valid, min_sigs
                        )))
                    }
                }
                _ => Err(ConditionError::Unfulfilled("multisig condition requires a multi-signature".into())),
            },
            UnlockCondition::TimeLock { until, inner } => {
                if !until.has_expired(ctx.height, ctx.time) {
                    return Err(ConditionError::LockNotExpired);
                }
                inner.fulfill(fulfillment, ctx)
            }
        }
    }

    /// Whether the condition can be satisfied at `ctx` at all, i.e. its
    /// time lock (if any) has expired. Does not check a specific
    /// fulfillment.
    pub fn fulfillable(&self, ctx: &FulfillContext) -> bool {
        match self {
            UnlockCondition::TimeLock { until, inner } => {
                until.has_expired(ctx.height, ctx.time) && inner.fulfillable(ctx)
            }
            _ => true,
        }
    }
}

/// The message a signature commits to. Real signature hashes are computed
/// by the minting transaction controllers (§4.D) and threaded in via
/// `FulfillContext::with_signature_hash`; conditions never fall back to
/// hashing `ctx.transaction` here, since the transaction already carries
/// the fulfillment under verification and hashing it would make the digest
/// depend on the signature it is meant to authenticate. Callers that have
/// no signing digest to offer (condition-only unit tests) get a fixed
/// all-zero digest instead.
fn signature_message(ctx: &FulfillContext) -> Hash {
    ctx.signature_hash.unwrap_or(Hash([0u8; 32]))
}

impl Encode for UnlockCondition {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            UnlockCondition::Nil => enc.write_byte(TAG_NIL),
            UnlockCondition::UnlockHash(uh) => {
                enc.write_byte(TAG_UNLOCK_HASH)?;
                uh.encode(enc)
            }
            UnlockCondition::MultiSig { owners, min_sigs } => {
                enc.write_byte(TAG_MULTI_SIG)?;
                let owners_vec: Vec<UnlockHash> = owners.iter().copied().collect();
                owners_vec.encode(enc)?;
                min_sigs.encode(enc)
            }
            UnlockCondition::TimeLock { until, inner } => {
                enc.write_byte(TAG_TIME_LOCK)?;
                until.encode(enc)?;
                inner.encode(enc)
            }
        }
    }
}

impl Decode for UnlockCondition {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        match dec.read_byte()? {
            TAG_NIL => Ok(UnlockCondition::Nil),
            TAG_UNLOCK_HASH => Ok(UnlockCondition::UnlockHash(UnlockHash::decode(dec)?)),
            TAG_MULTI_SIG => {
                let owners_vec = Vec::<UnlockHash>::decode(dec)?;
                let min_sigs = u64::decode(dec)?;
                Ok(UnlockCondition::MultiSig {
                    owners: owners_vec.into_iter().collect(),
                    min_sigs,
                })
            }
            TAG_TIME_LOCK => {
                let until = LockTime::decode(dec)?;
                let inner = Box::new(UnlockCondition::decode(dec)?);
                Ok(UnlockCondition::TimeLock { until, inner })
            }
            other => Err(DecodeError::Decode(format!("unknown unlock condition tag {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;
    use crate::height::BlockHeight;

    fn ctx() -> FulfillContext<'static> {
        FulfillContext::new(BlockHeight(10), Utc::now())
    }

    #[test]
    fn nil_condition_roundtrips_and_fulfills_with_nil() {
        let c = UnlockCondition::Nil;
        let bytes = c.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = UnlockCondition::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(c, back);
        assert!(c.fulfill(&UnlockFulfillment::Nil, &ctx()).is_ok());
    }

    #[test]
    fn multisig_roundtrips() {
        let mut owners = BTreeSet::new();
        owners.insert(UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[b"a"])));
        owners.insert(UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[b"b"])));
        let c = UnlockCondition::MultiSig { owners, min_sigs: 2 };
        let bytes = c.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = UnlockCondition::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn timelock_blocks_fulfillment_until_expired() {
        let inner = Box::new(UnlockCondition::Nil);
        let c = UnlockCondition::TimeLock {
            until: LockTime(100),
            inner,
        };
        let early = FulfillContext::new(BlockHeight(10), Utc::now());
        assert_eq!(
            c.fulfill(&UnlockFulfillment::Nil, &early),
            Err(ConditionError::LockNotExpired)
        );
        let late = FulfillContext::new(BlockHeight(100), Utc::now());
        assert!(c.fulfill(&UnlockFulfillment::Nil, &late).is_ok());
    }

    #[test]
    fn only_pubkey_multisig_and_timelock_wrapping_them_are_standard() {
        let uh = UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[b"p"]));
        assert!(UnlockCondition::UnlockHash(uh).is_standard(&ctx()).is_ok());
        assert!(UnlockCondition::Nil.is_standard(&ctx()).is_err());
    }
}

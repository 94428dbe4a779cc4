use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// An arbitrary-precision, non-negative integer. Values never overflow a
/// fixed width and never go negative; `checked_sub` is the only way to
/// subtract, forcing callers to handle insufficient balance explicitly.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(num_bigint::BigUint);

impl Currency {
    pub fn zero() -> Currency {
        Currency(num_bigint::BigUint::from(0u32))
    }

    pub fn from_u64(v: u64) -> Currency {
        Currency(num_bigint::BigUint::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == num_bigint::BigUint::from(0u32)
    }

    pub fn checked_sub(&self, other: &Currency) -> Option<Currency> {
        if self.0 < other.0 {
            None
        } else {
            Some(Currency(&self.0 - &other.0))
        }
    }

    pub fn to_decimal_string(&self) -> String {
        self.0.to_str_radix(10)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::zero()
    }
}

impl Add for Currency {
    type Output = Currency;
    fn add(self, rhs: Currency) -> Currency {
        Currency(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Currency> for Currency {
    type Output = Currency;
    fn add(self, rhs: &'a Currency) -> Currency {
        Currency(self.0 + &rhs.0)
    }
}

impl AddAssign for Currency {
    fn add_assign(&mut self, rhs: Currency) {
        self.0 += rhs.0;
    }
}

impl Sub for Currency {
    type Output = Currency;
    /// Panics on underflow; prefer [`Currency::checked_sub`] when the
    /// operands are not already known to satisfy `self >= rhs`.
    fn sub(self, rhs: Currency) -> Currency {
        Currency(self.0 - rhs.0)
    }
}

impl SubAssign for Currency {
    fn sub_assign(&mut self, rhs: Currency) {
        self.0 -= rhs.0;
    }
}

impl Sum for Currency {
    fn sum<I: Iterator<Item = Currency>>(iter: I) -> Currency {
        iter.fold(Currency::zero(), |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Currency> for Currency {
    fn sum<I: Iterator<Item = &'a Currency>>(iter: I) -> Currency {
        iter.fold(Currency::zero(), |acc, v| acc + v)
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Encode for Currency {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        let bytes = self.0.to_bytes_be();
        enc.write_len(bytes.len() as u64)?;
        enc.write_bytes(&bytes)
    }
}

impl Decode for Currency {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let n = dec.read_slice_len(1)?;
        let bytes = dec.read_bytes(n)?;
        Ok(Currency(num_bigint::BigUint::from_bytes_be(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;

    #[test]
    fn roundtrips_through_codec() {
        let v = Currency::from_u64(123_456_789);
        let bytes = v.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = Currency::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn checked_sub_none_on_underflow() {
        let a = Currency::from_u64(5);
        let b = Currency::from_u64(10);
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let a = Currency::from_u64(9);
        let b = Currency::from_u64(10);
        assert!(a < b);
    }
}

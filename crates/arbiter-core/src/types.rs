//! Value types shared across the arbiter: weights, requester indices,
//! and the 4-bit request/grant line vectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};

/// Number of requesters competing for the shared resource.
pub const REQUESTERS: usize = 4;

/// Largest configurable weight (3-bit field).
pub const MAX_WEIGHT: u8 = 7;

const LINE_MASK: u8 = 0xF;

/// A per-requester weight in `0..=7`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

/// One weight per requester, indexed by requester.
pub type Weights = [Weight; REQUESTERS];

impl Weight {
    pub const ZERO: Weight = Weight(0);

    /// Range-checked constructor.
    pub fn new(value: u8) -> ArbiterResult<Self> {
        if value > MAX_WEIGHT {
            return Err(ArbiterError::WeightOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Keep only the low three bits, the way the register front-end does.
    pub fn masked(value: u8) -> Self {
        Self(value & MAX_WEIGHT)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn saturating_dec(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl TryFrom<u8> for Weight {
    type Error = ArbiterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(w: Weight) -> u8 {
        w.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build a weight table from raw values, rejecting anything above 7.
pub fn weights_from_raw(raw: [u8; REQUESTERS]) -> ArbiterResult<Weights> {
    let mut out = [Weight::ZERO; REQUESTERS];
    for (slot, value) in out.iter_mut().zip(raw) {
        *slot = Weight::new(value)?;
    }
    Ok(out)
}

/// Index of one requester, always in `0..4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequesterId(u8);

impl RequesterId {
    pub const ALL: [RequesterId; REQUESTERS] =
        [RequesterId(0), RequesterId(1), RequesterId(2), RequesterId(3)];

    pub fn new(index: usize) -> ArbiterResult<Self> {
        if index >= REQUESTERS {
            return Err(ArbiterError::RequesterOutOfRange(index));
        }
        Ok(Self(index as u8))
    }

    /// Reduce any integer to a requester index modulo 4.
    pub const fn wrapping(index: usize) -> Self {
        Self((index % REQUESTERS) as u8)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// The requester `offset` positions after this one, wrapping at 4.
    pub fn offset(self, offset: usize) -> Self {
        Self::wrapping(self.index() + offset)
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    /// Single-bit mask for this requester.
    pub fn bit(self) -> u8 {
        1 << self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four request lines packed into the low nibble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RequestVector(u8);

impl RequestVector {
    pub const EMPTY: RequestVector = RequestVector(0);
    pub const ALL: RequestVector = RequestVector(LINE_MASK);

    /// Upper bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & LINE_MASK)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_set(self, id: RequesterId) -> bool {
        self.0 & id.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn with(self, id: RequesterId) -> Self {
        Self(self.0 | id.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = RequesterId> {
        RequesterId::ALL.into_iter().filter(move |id| self.is_set(*id))
    }
}

impl FromIterator<RequesterId> for RequestVector {
    fn from_iter<I: IntoIterator<Item = RequesterId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, RequestVector::with)
    }
}

impl fmt::Display for RequestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// Grant lines: zero, or exactly one bit when produced by the arbiter.
///
/// `from_raw` exists for values read back over the register map, which
/// the monitor must be able to inspect even if they are malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct GrantVector(u8);

impl GrantVector {
    pub const NONE: GrantVector = GrantVector(0);

    pub fn one_hot(id: RequesterId) -> Self {
        Self(id.bit())
    }

    pub fn from_raw(bits: u8) -> Self {
        Self(bits & LINE_MASK)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count_ones(self) -> u32 {
        self.0.count_ones()
    }

    /// The granted requester, if exactly one line is set.
    pub fn holder(self) -> Option<RequesterId> {
        if self.count_ones() == 1 {
            Some(RequesterId::wrapping(self.0.trailing_zeros() as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for GrantVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// Which table the selection step compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Highest live weight wins; ties rotate.
    #[default]
    Strict,
    /// Highest remaining credit wins; credits reload from the live weights
    /// once every eligible requester has spent its share.
    Credit,
}

impl FromStr for SelectionPolicy {
    type Err = ArbiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "credit" => Ok(Self::Credit),
            other => Err(ArbiterError::Config(format!(
                "unknown selection policy '{other}' (expected strict or credit)"
            ))),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_rejects_values_above_seven() {
        assert_eq!(Weight::new(7).unwrap().get(), 7);
        assert_eq!(Weight::new(8), Err(ArbiterError::WeightOutOfRange(8)));
    }

    #[test]
    fn weight_masking_matches_three_bit_field() {
        assert_eq!(Weight::masked(0x0F).get(), 7);
        assert_eq!(Weight::masked(0x0A).get(), 2);
    }

    #[test]
    fn requester_offsets_wrap() {
        let r3 = RequesterId::new(3).unwrap();
        assert_eq!(r3.next().index(), 0);
        assert_eq!(r3.offset(6).index(), 1);
        assert!(RequesterId::new(4).is_err());
    }

    #[test]
    fn request_vector_masks_upper_bits() {
        let v = RequestVector::from_bits(0xF5);
        assert_eq!(v.bits(), 0x5);
        let ids: Vec<usize> = v.iter().map(RequesterId::index).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn line_vectors_serialize_masked_bits() {
        #[derive(Serialize)]
        struct Doc {
            req: RequestVector,
            gnt: GrantVector,
        }
        let doc = Doc {
            req: RequestVector::from_bits(0xF5),
            gnt: GrantVector::from_raw(0x24),
        };
        assert_eq!(toml::to_string(&doc).unwrap(), "req = 5\ngnt = 4\n");
    }

    #[test]
    fn grant_vector_holder_requires_single_bit() {
        let r2 = RequesterId::new(2).unwrap();
        assert_eq!(GrantVector::one_hot(r2).holder(), Some(r2));
        assert_eq!(GrantVector::from_raw(0b0110).holder(), None);
        assert_eq!(GrantVector::NONE.holder(), None);
    }

    #[test]
    fn weights_deserialize_with_range_check() {
        #[derive(Deserialize)]
        struct Doc {
            w: Vec<Weight>,
        }
        let ok: Doc = toml::from_str("w = [0, 3, 7]").unwrap();
        assert_eq!(ok.w[2].get(), 7);
        assert!(toml::from_str::<Doc>("w = [9]").is_err());
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Credit".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::Credit);
        assert!("lottery".parse::<SelectionPolicy>().is_err());
    }
}

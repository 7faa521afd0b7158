//! Eligibility and weighted round-robin selection.
//!
//! Everything here is a pure function of one tick's sampled inputs, the
//! effective weight table, and the rotation pointer.

use crate::types::{REQUESTERS, RequestVector, RequesterId, Weight, Weights};

/// Requests count only on ticks where `valid` is asserted.
pub fn eligible(requests: RequestVector, valid: bool) -> RequestVector {
    if valid { requests } else { RequestVector::EMPTY }
}

/// Highest weight among eligible requesters, `None` when nobody is eligible.
pub fn max_weight(eligible: RequestVector, weights: &Weights) -> Option<Weight> {
    eligible.iter().map(|id| weights[id.index()]).max()
}

/// Eligible requesters whose weight equals the eligible maximum.
pub fn tie_set(eligible: RequestVector, weights: &Weights) -> RequestVector {
    match max_weight(eligible, weights) {
        Some(max) => eligible
            .iter()
            .filter(|id| weights[id.index()] == max)
            .collect(),
        None => RequestVector::EMPTY,
    }
}

/// First set line of `mask` scanning from `pointer` (inclusive), wrapping.
pub fn pick_first(mask: RequestVector, pointer: RequesterId) -> Option<RequesterId> {
    (0..REQUESTERS)
        .map(|offset| pointer.offset(offset))
        .find(|id| mask.is_set(*id))
}

/// Weighted round-robin winner for one tick.
pub fn select(
    eligible: RequestVector,
    weights: &Weights,
    pointer: RequesterId,
) -> Option<RequesterId> {
    pick_first(tie_set(eligible, weights), pointer)
}

//! Shadow/live weight table.
//!
//! Weights are staged one at a time into the shadow snapshot and promoted
//! to the live snapshot as a whole by `commit`. The selection logic only
//! ever reads `live`.

use serde::Serialize;

use crate::types::{REQUESTERS, RequesterId, Weight, Weights};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeightTable {
    shadow: Weights,
    live: Weights,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a weight. Has no effect on `live` until `commit`.
    pub fn stage(&mut self, id: RequesterId, weight: Weight) {
        self.shadow[id.index()] = weight;
    }

    /// Stage all four weights at once.
    pub fn stage_all(&mut self, weights: Weights) {
        self.shadow = weights;
    }

    /// Copy the shadow snapshot into the live one.
    pub fn commit(&mut self) {
        self.live = self.shadow;
    }

    pub fn shadow(&self) -> &Weights {
        &self.shadow
    }

    pub fn live(&self) -> &Weights {
        &self.live
    }

    /// True when staged values differ from the live table.
    pub fn is_dirty(&self) -> bool {
        self.shadow != self.live
    }

    pub fn clear(&mut self) {
        self.shadow = [Weight::ZERO; REQUESTERS];
        self.live = [Weight::ZERO; REQUESTERS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::weights_from_raw;

    fn id(i: usize) -> RequesterId {
        RequesterId::new(i).unwrap()
    }

    #[test]
    fn staging_does_not_touch_live() {
        let mut table = WeightTable::new();
        table.stage(id(1), Weight::new(5).unwrap());
        table.stage(id(3), Weight::new(2).unwrap());

        assert_eq!(table.live(), &[Weight::ZERO; REQUESTERS]);
        assert_eq!(table.shadow()[1].get(), 5);
        assert!(table.is_dirty());
    }

    #[test]
    fn commit_promotes_whole_table() {
        let mut table = WeightTable::new();
        table.stage_all(weights_from_raw([2, 1, 1, 2]).unwrap());
        table.commit();

        assert_eq!(table.live(), &weights_from_raw([2, 1, 1, 2]).unwrap());
        assert!(!table.is_dirty());
    }

    #[test]
    fn clear_resets_both_snapshots() {
        let mut table = WeightTable::new();
        table.stage_all(weights_from_raw([7, 7, 7, 7]).unwrap());
        table.commit();
        table.clear();

        assert_eq!(table, WeightTable::default());
    }
}

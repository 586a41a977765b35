//! The delta builder: accumulates the changes a caller must ship to a
//! remote data plane — added/removed reals and a disjoint cover of painted
//! intervals — between two snapshots of a lookup array, using half-open
//! `[begin, end)` slices.

use std::collections::BTreeMap;

use crate::real::{Index, Real, RealId};

/// A half-open `[begin, end)` run of cells, all colored `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub begin: Index,
    pub end: Index,
    pub id: RealId,
}

/// The accumulated change set: reals added, reals removed, and the final
/// disjoint slice cover.
#[derive(Debug, Clone)]
pub struct Delta<R: Real> {
    pub added: Vec<(R, RealId)>,
    pub removed: Vec<RealId>,
    pub slices: Vec<Slice>,
}

/// Builds one [`Delta`] over a ring of size `lookup_size`.
pub struct DeltaBuilder<R: Real> {
    lookup_size: Index,
    added: Vec<(R, RealId)>,
    removed: Vec<RealId>,
    // Keyed by `begin`, kept as a disjoint, non-adjacent-same-id cover.
    slices: BTreeMap<Index, Slice>,
}

impl<R: Real> DeltaBuilder<R> {
    pub fn new(lookup_size: Index) -> Self {
        Self {
            lookup_size,
            added: Vec::new(),
            removed: Vec::new(),
            slices: BTreeMap::new(),
        }
    }

    pub fn add_real(&mut self, real: R, id: RealId) {
        self.added.push((real, id));
    }

    pub fn remove_real(&mut self, id: RealId) {
        self.removed.push(id);
    }

    /// Records that `[begin, end)` is now colored `id`. A slice that
    /// straddles the ring boundary (`begin > end`) is split into
    /// `[begin, L)` and `[0, end)` and inserted separately.
    pub fn add_slice(&mut self, begin: Index, end: Index, id: RealId) {
        if begin == end {
            return;
        }
        if begin > end {
            self.add_non_wrapping(begin, self.lookup_size, id);
            self.add_non_wrapping(0, end, id);
        } else {
            self.add_non_wrapping(begin, end, id);
        }
    }

    fn add_non_wrapping(&mut self, begin: Index, end: Index, id: RealId) {
        if begin == end {
            return;
        }

        let mut new_begin = begin;
        let mut new_end = end;

        // Slices wholly inside [begin, end) are removed outright. Slices
        // that overlap one edge are clipped (different id) or absorbed
        // (same id, extending the new slice's bound instead of leaving a
        // redundant neighbor).
        let overlapping: Vec<Index> = self
            .slices
            .range(..end)
            .filter(|(_, s)| s.end > begin)
            .map(|(&k, _)| k)
            .collect();

        for key in overlapping {
            let existing = self.slices.remove(&key).unwrap();

            let contains = existing.begin < begin && existing.end > end;
            let left_overlap = existing.begin < begin && existing.end > begin;
            let right_overlap = existing.begin < end && existing.end > end && existing.begin >= begin;
            let fully_covered = existing.begin >= begin && existing.end <= end;

            if fully_covered {
                continue;
            }

            if contains {
                if existing.id == id {
                    // The requested paint is already this color throughout;
                    // restore the untouched slice and skip this insert.
                    self.slices.insert(existing.begin, existing);
                    return;
                }
                self.slices.insert(
                    existing.begin,
                    Slice {
                        begin: existing.begin,
                        end: begin,
                        id: existing.id,
                    },
                );
                self.slices.insert(
                    end,
                    Slice {
                        begin: end,
                        end: existing.end,
                        id: existing.id,
                    },
                );
            } else if left_overlap {
                if existing.id == id {
                    new_begin = new_begin.min(existing.begin);
                } else {
                    self.slices.insert(
                        existing.begin,
                        Slice {
                            begin: existing.begin,
                            end: begin,
                            id: existing.id,
                        },
                    );
                }
            } else if right_overlap {
                if existing.id == id {
                    new_end = new_end.max(existing.end);
                } else {
                    self.slices.insert(
                        end,
                        Slice {
                            begin: end,
                            end: existing.end,
                            id: existing.id,
                        },
                    );
                }
            } else {
                // Disjoint from [begin, end) after the containment checks
                // above — shouldn't occur given the range filter, but keep
                // the original slice rather than silently drop it.
                self.slices.insert(existing.begin, existing);
            }
        }

        self.slices.insert(
            new_begin,
            Slice {
                begin: new_begin,
                end: new_end,
                id,
            },
        );
    }

    pub fn build(self) -> Delta<R> {
        Delta {
            added: self.added,
            removed: self.removed,
            slices: self.slices.into_values().collect(),
        }
    }
}

//! `RealId` allocator for callers that don't already have a stable integer
//! id per real: mints one on first sight of a real and reclaims it on
//! release, reusing the lowest freed id before minting a fresh one.

use std::collections::BTreeMap;

use crate::real::{Real, RealId};

/// Assigns and reclaims `RealId`s for a set of `Real`s, reusing the lowest
/// freed id before minting a new one.
#[derive(Debug, Default)]
pub struct IdManager<R: Real> {
    to_real: BTreeMap<RealId, R>,
    to_id: BTreeMap<R, RealId>,
    min_unassigned: RealId,
    freed: std::collections::BTreeSet<RealId>,
}

impl<R: Real> IdManager<R> {
    pub fn new() -> Self {
        Self {
            to_real: BTreeMap::new(),
            to_id: BTreeMap::new(),
            min_unassigned: 0,
            freed: std::collections::BTreeSet::new(),
        }
    }

    /// Returns `real`'s existing id, or mints one (preferring the lowest
    /// freed id over a fresh one).
    pub fn assign(&mut self, real: R) -> RealId {
        if let Some(&id) = self.to_id.get(&real) {
            return id;
        }

        let id = if let Some(&reused) = self.freed.iter().next() {
            self.freed.remove(&reused);
            reused
        } else {
            let id = self.min_unassigned;
            self.min_unassigned += 1;
            id
        };

        self.to_id.insert(real.clone(), id);
        self.to_real.insert(id, real);
        id
    }

    /// Releases `real`'s id, making it eligible for reuse. A no-op if `real`
    /// was never assigned.
    pub fn release(&mut self, real: &R) {
        if let Some(id) = self.to_id.remove(real) {
            self.to_real.remove(&id);
            self.freed.insert(id);
        }
    }

    pub fn get_id(&self, real: &R) -> Option<RealId> {
        self.to_id.get(real).copied()
    }

    pub fn get_real(&self, id: RealId) -> Option<&R> {
        self.to_real.get(&id)
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }
}

//! The head assigner: populates each real's head list by walking the
//! lookup index space in bit-reversed order,
//! drawing a real from the unweighted pool at each step, and periodically
//! rebalancing so the bit-reversed interleaving can't drift too far from an
//! even split while construction is in progress.

use std::collections::BTreeMap;

use rand::RngCore;

use crate::ring::{next, pow2_lower_bound, reverse_bits};
use crate::real::{Index, RealId};
use crate::unweighted::UnweightedPool;

/// Assigns ring positions to reals. Returns one `Vec<Index>` of head
/// positions per id, each close to `max_weight * segments_per_weight` in
/// length (exactly that count once rebalanced, summed over every real,
/// clamped to `lookup_size`).
pub fn assign_heads(
    ids: &[RealId],
    pool: &UnweightedPool,
    lookup_size: u32,
    segments_per_weight: u32,
    max_weight: u32,
    rng: &mut dyn RngCore,
) -> BTreeMap<RealId, Vec<Index>> {
    let real_count = ids.len() as u32;
    let mut heads: BTreeMap<RealId, Vec<Index>> =
        ids.iter().map(|&id| (id, Vec::new())).collect();

    let need = (real_count * max_weight * segments_per_weight).min(lookup_size);
    let bits = pow2_lower_bound(lookup_size);
    let rebalance_every = segments_per_weight * real_count;

    let mut u: u32 = 0;
    let mut distributed: u32 = 0;
    let mut i: u64 = 0;

    while distributed < need {
        let pos = reverse_bits(bits, i as u32);
        i += 1;
        if pos >= lookup_size {
            continue;
        }

        let ring = pool.ring(u as usize);
        u = next(pool.len() as u32, u);

        let key = rng.next_u32();
        let candidate = ring.match_key(key);
        heads.get_mut(&candidate)
            .expect("ring match returned an id outside the configured real set")
            .push(pos);
        distributed += 1;

        if rebalance_every > 0 && distributed % rebalance_every == 0 {
            rebalance(&mut heads, distributed / real_count);
        }
    }

    heads
}

/// Moves head positions from reals whose list is longer than `target` to
/// reals whose list is shorter, until no real differs from `target` by more
/// than one element. Moves a position, not a painting, so it is safe to
/// call before any lookup array exists. Donors and receivers are collected
/// in id order so the move sequence — and therefore the resulting head
/// assignment — depends only on the inputs, not on incidental map layout.
fn rebalance(heads: &mut BTreeMap<RealId, Vec<Index>>, target: u32) {
    let mut donors: Vec<RealId> = Vec::new();
    let mut receivers: Vec<RealId> = Vec::new();
    for (&id, positions) in heads.iter() {
        let len = positions.len() as u32;
        if len > target {
            donors.push(id);
        } else if len < target {
            receivers.push(id);
        }
    }

    if donors.is_empty() || receivers.is_empty() {
        return;
    }

    let mut d = 0usize;
    let mut r = 0usize;
    while r < receivers.len() {
        let moved = heads
            .get_mut(&donors[d])
            .unwrap()
            .pop()
            .expect("donor below target before reaching it");
        heads.get_mut(&receivers[r]).unwrap().push(moved);

        if heads[&receivers[r]].len() as u32 == target {
            r += 1;
        }
        if heads[&donors[d]].len() as u32 == target {
            d += 1;
            if d == donors.len() {
                break;
            }
        }
    }
}

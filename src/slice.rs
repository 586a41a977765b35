//! The slice engine: enables and disables one "slice" — a head plus the
//! run of following cells it owns — while maintaining the lookup array's
//! painting and the enabled-head bitmap.

use std::collections::BTreeMap;

use crate::real::{Index, RealId, Weight};
use crate::ring::{next, prev};

/// Per-real bookkeeping: its assigned head positions, how many of them are
/// currently enabled (a prefix of `heads`), and its last configured weight.
#[derive(Debug, Clone, Default)]
pub struct RealInfo {
    pub heads: Vec<Index>,
    pub enabled: u32,
    pub weight: Weight,
}

/// Paints the maximal run of cells starting at `start` that are currently
/// colored with whatever `lookup[start]` holds and are not themselves an
/// enabled head, switching them to `id`. Returns the number of cells
/// repainted; `0` if `lookup[start]` was already `id` (a no-op merge with a
/// same-colored neighbor, which is allowed).
fn color_slice(
    id: RealId,
    start: Index,
    lookup: &mut [RealId],
    enabled_bitmap: &[bool],
    lookup_size: Index,
) -> Index {
    let tint = lookup[start as usize];
    if tint == id {
        return 0;
    }
    let mut changed = 0;
    let mut i = start;
    while lookup[i as usize] == tint && !enabled_bitmap[i as usize] {
        lookup[i as usize] = id;
        changed += 1;
        i = next(lookup_size, i);
    }
    changed
}

/// Disables `id`'s last enabled head, merging its slice into whichever real
/// owns the cell immediately to its left on the ring. The caller (see
/// `updater.rs::update_weight`) is responsible for the "every
/// real disabled" edge case: when that leaves no real enabled at all, it
/// overwrites the whole lookup with the invalid sentinel instead of relying
/// on this function's local repaint.
///
/// Panics if `id` is unknown or has no enabled head — both are caller
/// preconditions enforced by `updater.rs`.
pub fn disable_slice(
    id: RealId,
    infos: &mut BTreeMap<RealId, RealInfo>,
    lookup: &mut [RealId],
    enabled_bitmap: &mut [bool],
    lookup_size: Index,
) -> Index {
    let info = infos.get_mut(&id).expect("disable_slice on unknown real");
    debug_assert!(info.enabled > 0);
    info.enabled -= 1;
    let disable_pos = info.heads[info.enabled as usize];

    let shadow = lookup[prev(lookup_size, disable_pos) as usize];
    enabled_bitmap[disable_pos as usize] = false;

    color_slice(shadow, disable_pos, lookup, enabled_bitmap, lookup_size)
}

/// Enables `id`'s next disabled head and paints its slice. `system_disabled`
/// must reflect whether every real was disabled *before* this call — in
/// that case the whole lookup is first filled with `id` in the "fully
/// disabled" branch. Returns the number of cells repainted (`0` if
/// `id` has no remaining heads to enable).
pub fn enable_slice(
    id: RealId,
    infos: &mut BTreeMap<RealId, RealInfo>,
    lookup: &mut [RealId],
    enabled_bitmap: &mut [bool],
    lookup_size: Index,
    system_disabled: bool,
) -> Index {
    let info = infos.get_mut(&id).expect("enable_slice on unknown real");
    if info.enabled as usize == info.heads.len() {
        return 0;
    }

    if system_disabled {
        lookup.fill(id);
        let pos = info.heads[info.enabled as usize];
        enabled_bitmap[pos as usize] = true;
        info.enabled += 1;
        return lookup_size;
    }

    let start = info.heads[info.enabled as usize];
    let changed = color_slice(id, start, lookup, enabled_bitmap, lookup_size);
    enabled_bitmap[start as usize] = true;
    info.enabled += 1;
    changed
}

#[cfg(test)]
mod test {
    use super::*;

    fn info(heads: Vec<Index>, enabled: u32) -> RealInfo {
        RealInfo {
            heads,
            enabled,
            weight: 0,
        }
    }

    #[test]
    fn enable_then_disable_round_trips_painting() {
        // Two reals, ring of size 8: real 0 owns head 0, real 1 owns head 4.
        let mut infos = BTreeMap::new();
        infos.insert(0, info(vec![0], 1));
        infos.insert(1, info(vec![4], 0));

        let mut lookup = vec![0u32; 8];
        let mut enabled_bitmap = vec![false; 8];
        enabled_bitmap[0] = true;
        lookup.fill(0);

        let changed = enable_slice(1, &mut infos, &mut lookup, &mut enabled_bitmap, 8, false);
        assert_eq!(changed, 4); // cells 4..8 repainted to real 1
        assert_eq!(&lookup, &[0, 0, 0, 0, 1, 1, 1, 1]);

        let changed = disable_slice(1, &mut infos, &mut lookup, &mut enabled_bitmap, 8);
        assert_eq!(changed, 4);
        assert_eq!(&lookup, &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn disable_into_same_colored_neighbor_reports_zero_changed() {
        let mut infos = BTreeMap::new();
        infos.insert(0, info(vec![0, 4], 2));

        let mut lookup = vec![0u32; 8];
        let mut enabled_bitmap = vec![false; 8];
        enabled_bitmap[0] = true;
        enabled_bitmap[4] = true;

        // Disabling head at index 4 merges into the real at index 3, which
        // is also real 0 — a same-color no-op.
        let changed = disable_slice(0, &mut infos, &mut lookup, &mut enabled_bitmap, 8);
        assert_eq!(changed, 0);
        assert_eq!(&lookup, &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn enable_from_fully_disabled_fills_whole_lookup() {
        let mut infos = BTreeMap::new();
        infos.insert(0, info(vec![3], 0));

        let mut lookup = vec![RealId::MAX; 8];
        let mut enabled_bitmap = vec![false; 8];

        let changed = enable_slice(0, &mut infos, &mut lookup, &mut enabled_bitmap, 8, true);
        assert_eq!(changed, 8);
        assert!(lookup.iter().all(|&x| x == 0));
        assert!(enabled_bitmap[3]);
    }
}

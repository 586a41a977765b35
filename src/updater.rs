//! The weight updater: the public façade for construction, weight
//! application, lookup initialization, and the optional
//! deviation-bounded adjustment pass.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config;
use crate::error::ConfigError;
use crate::head_assign::assign_heads;
use crate::real::{is_valid, Index, Real, RealId, Weight, INVALID};
use crate::slice::{self, RealInfo};
use crate::unweighted::UnweightedPool;

/// Builds and mutates a weighted consistent-hash lookup table.
///
/// One instance owns exactly one set of reals; structure (which reals
/// exist) is immutable after [`WeightUpdater::make`], but weights are
/// mutable via [`WeightUpdater::update_weight`] / [`WeightUpdater::update_lookup`].
/// All mutations are sequential; no operation on an updater or the lookup
/// array it owns is safe to call concurrently with another on the same pair.
pub struct WeightUpdater {
    segments_per_weight: u32,
    infos: BTreeMap<RealId, RealInfo>,
    enabled_bitmap: Vec<bool>,
    lookup_size: u32,
    reals_active: u32,
    total_weight: u32,
}

impl WeightUpdater {
    /// The lookup size that accommodates every real at `MAX_WEIGHT`:
    /// `real_count * MAX_WEIGHT * segments_per_weight`.
    pub fn required_lookup_size(real_count: u32, segments_per_weight: u32) -> u32 {
        real_count * config::MAX_WEIGHT * segments_per_weight
    }

    pub fn lookup_size(&self) -> u32 {
        self.lookup_size
    }

    /// Builds an updater from index-aligned `reals`/`ids`/`weights`.
    /// `lookup_size` defaults to [`WeightUpdater::required_lookup_size`]
    /// when `None`.
    ///
    /// # Errors
    /// See [`ConfigError`] for the three failure kinds.
    pub fn make<R: Real>(
        reals: &[R],
        ids: &[RealId],
        weights: &[Weight],
        pool_size: u32,
        segments_per_weight: u32,
        lookup_size: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let cnt = reals.len();
        if cnt == 0 || ids.len() != cnt || weights.len() != cnt {
            return Err(ConfigError::InvalidConfiguration);
        }
        if pool_size == 0 {
            return Err(ConfigError::InvalidConfiguration);
        }
        if pool_size.checked_add(segments_per_weight * config::MAX_WEIGHT) == Some(0) {
            return Err(ConfigError::InvalidConfiguration);
        }

        let required_min = segments_per_weight * config::MAX_WEIGHT;
        let lookup_size =
            lookup_size.unwrap_or_else(|| Self::required_lookup_size(cnt as u32, segments_per_weight));
        if lookup_size < required_min {
            return Err(ConfigError::InvalidConfiguration);
        }

        let mut seen_ids = HashSet::with_capacity(cnt);
        for &id in ids {
            if !is_valid(id) || !seen_ids.insert(id) {
                return Err(ConfigError::InvalidConfiguration);
            }
        }
        for &w in weights {
            if w > config::MAX_WEIGHT {
                return Err(ConfigError::InvalidConfiguration);
            }
        }

        let mut infos: BTreeMap<RealId, RealInfo> = BTreeMap::new();
        let mut reals_active = 0u32;
        let mut total_weight = 0u32;
        for (&id, &w) in ids.iter().zip(weights) {
            let enabled = w * segments_per_weight;
            if enabled != 0 {
                reals_active += 1;
            }
            total_weight += w;
            infos.insert(
                id,
                RealInfo {
                    heads: Vec::new(),
                    enabled,
                    weight: w,
                },
            );
        }

        // One deterministic RNG stream feeds both the pool's salts and the
        // per-position match keys the head assigner draws, in that order —
        // this is what makes construction reproducible.
        let mut rng = ChaCha8Rng::seed_from_u64(config::RNG_SEED);
        let salts: Vec<u32> = (0..pool_size).map(|_| rng.next_u32()).collect();
        let pool = UnweightedPool::build(reals, ids, salts.into_iter())
            .ok_or(ConfigError::PoolCollision)?;

        let heads = assign_heads(
            ids,
            &pool,
            lookup_size,
            segments_per_weight,
            config::MAX_WEIGHT,
            &mut rng,
        );

        for (id, positions) in heads {
            let info = infos
                .get_mut(&id)
                .ok_or(ConfigError::InternalInvariant)?;
            info.heads = positions;
            // When a custom, tight `lookup_size` leaves a real fewer heads
            // than its weight would otherwise entitle it to, its enabled
            // prefix can never exceed what it actually has.
            info.enabled = info.enabled.min(info.heads.len() as u32);
        }

        let mut enabled_bitmap = vec![false; lookup_size as usize];
        for info in infos.values() {
            for &pos in &info.heads[..info.enabled as usize] {
                enabled_bitmap[pos as usize] = true;
            }
        }

        Ok(Self {
            segments_per_weight,
            infos,
            enabled_bitmap,
            lookup_size,
            reals_active,
            total_weight,
        })
    }

    /// `true` if no real currently has an enabled head.
    pub fn disabled(&self) -> bool {
        self.infos.values().all(|info| info.enabled == 0)
    }

    /// Paints `lookup` from the current heads/enabled state.
    /// `lookup.len()` must equal [`WeightUpdater::lookup_size`].
    pub fn init_lookup(&self, lookup: &mut [RealId]) {
        assert_eq!(lookup.len(), self.lookup_size as usize);
        lookup.fill(INVALID);

        if self.disabled() {
            return;
        }

        for (&id, info) in &self.infos {
            for &pos in &info.heads[..info.enabled as usize] {
                lookup[pos as usize] = id;
            }
        }

        let mut tint = lookup[0];
        if !is_valid(tint) {
            tint = lookup
                .iter()
                .rev()
                .find(|&&cell| is_valid(cell))
                .copied()
                .expect("at least one enabled head exists when the system is not disabled");
        }
        for cell in lookup.iter_mut() {
            if is_valid(*cell) {
                tint = *cell;
            }
            *cell = tint;
        }
    }

    /// Disables/enables `id`'s slices one at a time until its enabled count
    /// matches `weight * segments_per_weight`. A no-op if `id` is unknown
    /// (not an error).
    pub fn update_weight(&mut self, id: RealId, weight: Weight, lookup: &mut [RealId]) {
        if !self.infos.contains_key(&id) {
            return;
        }
        let was = self.infos.get(&id).unwrap().enabled;
        let target = weight * self.segments_per_weight;

        while self.infos.get(&id).unwrap().enabled > target {
            slice::disable_slice(id, &mut self.infos, lookup, &mut self.enabled_bitmap, self.lookup_size);
        }
        while self.infos.get(&id).unwrap().enabled < target {
            let system_disabled = self.disabled();
            slice::enable_slice(
                id,
                &mut self.infos,
                lookup,
                &mut self.enabled_bitmap,
                self.lookup_size,
                system_disabled,
            );
        }

        if was == 0 && weight != 0 {
            self.reals_active += 1;
        }
        if weight == 0 && was != 0 {
            self.reals_active -= 1;
            if self.reals_active == 0 {
                lookup.fill(INVALID);
            }
        }

        let info = self.infos.get_mut(&id).unwrap();
        self.total_weight = self.total_weight - info.weight + weight;
        info.weight = weight;
    }

    /// Applies [`WeightUpdater::update_weight`] in input order. Different
    /// orders can yield different intermediate (and final) colorings —
    /// determinism is per-order, not order-independent.
    pub fn update_lookup(&mut self, ids: &[RealId], weights: &[Weight], lookup: &mut [RealId]) {
        for (&id, &weight) in ids.iter().zip(weights) {
            self.update_weight(id, weight, lookup);
        }
    }

    /// Updates enabled counts/bitmap directly without painting any lookup
    /// array. Useful when a caller wants to stage weight changes and paint
    /// once later via a fresh [`WeightUpdater::init_lookup`].
    pub fn set_weights(&mut self, ids: &[RealId], weights: &[Weight]) {
        for (&id, &weight) in ids.iter().zip(weights) {
            let Some(info) = self.infos.get_mut(&id) else {
                continue;
            };
            if info.enabled == 0 && weight != 0 {
                self.reals_active += 1;
            }
            if weight == 0 && info.enabled != 0 {
                self.reals_active -= 1;
            }

            let current = info.enabled;
            let updated = (weight * self.segments_per_weight).min(info.heads.len() as u32);
            if updated > current {
                for &pos in &info.heads[current as usize..updated as usize] {
                    self.enabled_bitmap[pos as usize] = true;
                }
            } else {
                for &pos in &info.heads[updated as usize..current as usize] {
                    self.enabled_bitmap[pos as usize] = false;
                }
            }
            info.enabled = updated;
            self.total_weight = self.total_weight - info.weight + weight;
            info.weight = weight;
        }
    }

    fn configured_cells(&self, weight: Weight) -> u32 {
        ((self.lookup_size as u64) * (weight as u64) / (self.total_weight as u64)) as u32
    }

    fn deviation(&self, weight: Weight, effective_cells: u32) -> f64 {
        let target = self.configured_cells(weight) as f64;
        (effective_cells as f64 - target) / target
    }

    /// The optional deviation-bounded adjustment pass.
    /// Trims or grows each real's painted share toward its configured
    /// share, sacrificing some slice-change locality for a tighter
    /// weight/cell-count correspondence. A no-op while every real is
    /// disabled.
    pub fn adjust(&mut self, lookup: &mut [RealId]) {
        if self.disabled() {
            return;
        }

        let mut distribution: HashMap<RealId, u32> = HashMap::new();
        for &cell in lookup.iter() {
            *distribution.entry(cell).or_insert(0) += 1;
        }

        let ids: Vec<RealId> = self.infos.keys().copied().collect();
        for id in ids {
            let weight = self.infos[&id].weight;
            if weight == 0 {
                continue;
            }
            let effective = *distribution.get(&id).unwrap_or(&0);
            let target = self.configured_cells(weight);
            let deviation = self.deviation(weight, effective);

            if deviation > config::DEFAULT_DEVIATION_TOLERANCE {
                self.adjust_down(id, lookup, effective, target);
            } else if deviation < -config::DEFAULT_DEVIATION_TOLERANCE {
                self.adjust_up(id, lookup, effective, target);
            }
        }
    }

    fn adjust_down(&mut self, id: RealId, lookup: &mut [RealId], mut effective: Index, target: Index) {
        while self.infos[&id].enabled > 1 && effective > target {
            effective -=
                slice::disable_slice(id, &mut self.infos, lookup, &mut self.enabled_bitmap, self.lookup_size);
        }
    }

    fn adjust_up(&mut self, id: RealId, lookup: &mut [RealId], mut effective: Index, target: Index) {
        while (self.infos[&id].enabled as usize) < self.infos[&id].heads.len() && effective < target {
            effective += slice::enable_slice(
                id,
                &mut self.infos,
                lookup,
                &mut self.enabled_bitmap,
                self.lookup_size,
                false,
            );
        }
        if effective > target && self.infos[&id].enabled > 0 {
            slice::disable_slice(id, &mut self.infos, lookup, &mut self.enabled_bitmap, self.lookup_size);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fair_four() -> (Vec<String>, Vec<RealId>, Vec<Weight>) {
        (
            vec!["alpha", "beta", "gamma", "delta"]
                .into_iter()
                .map(String::from)
                .collect(),
            vec![1, 2, 3, 4],
            vec![100, 100, 100, 100],
        )
    }

    #[test]
    fn make_rejects_empty_real_set() {
        let reals: Vec<String> = vec![];
        let err = WeightUpdater::make(&reals, &[], &[], 10, 20, None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfiguration);
    }

    #[test]
    fn make_rejects_invalid_sentinel_as_id() {
        let reals = vec!["a".to_string()];
        let err = WeightUpdater::make(&reals, &[INVALID], &[100], 10, 20, None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfiguration);
    }

    #[test]
    fn make_rejects_duplicate_ids() {
        let reals = vec!["a".to_string(), "b".to_string()];
        let err = WeightUpdater::make(&reals, &[1, 1], &[100, 100], 10, 20, None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfiguration);
    }

    #[test]
    fn make_rejects_weight_out_of_range() {
        let reals = vec!["a".to_string()];
        let err = WeightUpdater::make(&reals, &[1], &[101], 10, 20, None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfiguration);
    }

    #[test]
    fn make_rejects_too_small_lookup_size() {
        let reals = vec!["a".to_string()];
        let err = WeightUpdater::make(&reals, &[1], &[100], 10, 20, Some(5)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfiguration);
    }

    /// Four reals at equal weight land within 2% of an even split after
    /// init.
    #[test]
    fn fair_four_within_two_percent() {
        let (reals, ids, weights) = fair_four();
        let updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let l = updater.lookup_size() as usize;
        assert_eq!(l, 8000);

        let mut lookup = vec![INVALID; l];
        updater.init_lookup(&mut lookup);

        let mut counts: HashMap<RealId, u32> = HashMap::new();
        for &cell in &lookup {
            assert!(is_valid(cell));
            *counts.entry(cell).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 4);
        for &id in &ids {
            let c = counts[&id] as f64;
            let expected = l as f64 / 4.0;
            assert!((c - expected).abs() / expected <= 0.02, "id {id}: {c} vs {expected}");
        }
    }

    /// A custom `lookup_size` larger than `required_lookup_size` still
    /// paints every cell and keeps the four reals within 2% of even.
    #[test]
    fn custom_larger_lookup_size_stays_balanced() {
        let (reals, ids, weights) = fair_four();
        let updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, Some(24_000)).unwrap();
        let l = updater.lookup_size() as usize;
        assert_eq!(l, 24_000);

        let mut lookup = vec![INVALID; l];
        updater.init_lookup(&mut lookup);

        let mut counts: HashMap<RealId, u32> = HashMap::new();
        for &cell in &lookup {
            assert!(is_valid(cell));
            *counts.entry(cell).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 4);
        for &id in &ids {
            let c = counts[&id] as f64;
            let expected = l as f64 / 4.0;
            assert!((c - expected).abs() / expected <= 0.02, "id {id}: {c} vs {expected}");
        }
    }

    /// Identical input produces identical output.
    #[test]
    fn identical_input_produces_identical_output() {
        let (reals, ids, weights) = fair_four();
        let a = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let b = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();

        let mut la = vec![INVALID; a.lookup_size() as usize];
        let mut lb = vec![INVALID; b.lookup_size() as usize];
        a.init_lookup(&mut la);
        b.init_lookup(&mut lb);
        assert_eq!(la, lb);
    }

    /// Re-running init_lookup is idempotent.
    #[test]
    fn reinit_is_idempotent() {
        let (reals, ids, weights) = fair_four();
        let updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut l1 = vec![INVALID; updater.lookup_size() as usize];
        let mut l2 = l1.clone();
        updater.init_lookup(&mut l1);
        updater.init_lookup(&mut l2);
        assert_eq!(l1, l2);
    }

    /// Disabling one real of four merges its cells into whatever neighbor
    /// absorbs them, and it disappears entirely.
    #[test]
    fn disable_one_removes_it_from_lookup() {
        let (reals, ids, weights) = fair_four();
        let mut updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut lookup = vec![INVALID; updater.lookup_size() as usize];
        updater.init_lookup(&mut lookup);

        updater.update_weight(4, 0, &mut lookup);
        assert!(lookup.iter().all(|&c| c != 4));
        assert!(lookup.iter().all(|&c| is_valid(c)));
    }

    /// Disabling every real in sequence fills the lookup with the invalid
    /// sentinel.
    #[test]
    fn disable_all_fills_sentinel() {
        let (reals, ids, weights) = fair_four();
        let mut updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut lookup = vec![INVALID; updater.lookup_size() as usize];
        updater.init_lookup(&mut lookup);

        for &id in &ids {
            updater.update_weight(id, 0, &mut lookup);
        }
        assert!(lookup.iter().all(|&c| c == INVALID));
        assert!(updater.disabled());
    }

    /// update_weight only touches cells that were this real's color
    /// (disable) or are newly painted (enable) — never a third party's
    /// untouched cells.
    #[test]
    fn local_mutation_only() {
        let (reals, ids, weights) = fair_four();
        let mut updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut lookup = vec![INVALID; updater.lookup_size() as usize];
        updater.init_lookup(&mut lookup);
        let before = lookup.clone();

        updater.update_weight(4, 50, &mut lookup);

        for i in 0..before.len() {
            if before[i] != lookup[i] {
                assert_eq!(before[i], 4, "cell {i} changed but wasn't real 4's");
            }
        }
    }

    #[test]
    fn unknown_id_update_weight_is_a_silent_no_op() {
        let (reals, ids, weights) = fair_four();
        let mut updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut lookup = vec![INVALID; updater.lookup_size() as usize];
        updater.init_lookup(&mut lookup);
        let before = lookup.clone();
        updater.update_weight(999, 50, &mut lookup);
        assert_eq!(before, lookup);
    }

    /// A heavily skewed configuration stays within documented bounds, and
    /// `adjust` tightens deviation afterward.
    #[test]
    fn one_big_and_adjust_tightens() {
        let reals: Vec<String> = vec!["a", "b", "c", "d"].into_iter().map(String::from).collect();
        let ids: Vec<RealId> = vec![1, 2, 3, 4];
        let weights: Vec<Weight> = vec![100, 1, 1, 1];
        let updater = WeightUpdater::make(&reals, &ids, &weights, 100, 20, None).unwrap();
        let mut lookup = vec![INVALID; updater.lookup_size() as usize];
        updater.init_lookup(&mut lookup);

        let mut counts: HashMap<RealId, u32> = HashMap::new();
        for &c in &lookup {
            *counts.entry(c).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 4);
        let l = lookup.len() as f64;
        assert!((counts[&1] as f64 / l) <= 0.78);

        let mut updater = updater;
        updater.adjust(&mut lookup);
        let mut counts: HashMap<RealId, u32> = HashMap::new();
        for &c in &lookup {
            *counts.entry(c).or_insert(0) += 1;
        }
        let target = 100.0 / 103.0;
        let effective = counts[&1] as f64 / l;
        assert!((effective - target).abs() / target <= 0.2);
    }
}

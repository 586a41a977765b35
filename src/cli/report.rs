//! Human-readable reports over a populated lookup array: a per-real
//! cell-count histogram and a run-length fragmentation report.

use std::collections::BTreeMap;
use std::fmt;

use crate::real::RealId;

/// Per-real cell counts, ordered by id.
pub struct Weights(BTreeMap<RealId, usize>);

pub fn weights(lookup: &[RealId]) -> Weights {
    let mut counts = BTreeMap::new();
    for &id in lookup {
        *counts.entry(id).or_insert(0) += 1;
    }
    Weights(counts)
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, count) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{{{id}: {count}}}")?;
        }
        Ok(())
    }
}

/// Per-real run-length histogram: for each id, how many runs of each
/// contiguous length it appears in. A real painted in three separated runs
/// of length 20, 20, and 5 reports `{20: 2, 5: 1}` under its id — useful for
/// judging how fragmented (vs. contiguous) a real's slice is.
pub struct Clumps(BTreeMap<RealId, BTreeMap<usize, usize>>);

pub fn clumps(lookup: &[RealId]) -> Clumps {
    let mut m: BTreeMap<RealId, BTreeMap<usize, usize>> = BTreeMap::new();
    if lookup.is_empty() {
        return Clumps(m);
    }

    // Find a run boundary to start at, so a lookup that is one single run
    // (wrapping all the way around) is reported as one clump, not split at
    // an arbitrary index-0 cut.
    let len = lookup.len();
    let mut start = 1;
    while start < len && lookup[start] == lookup[start - 1] {
        start += 1;
    }
    if start == len {
        m.entry(lookup[0]).or_default().insert(len, 1);
        return Clumps(m);
    }

    let mut id = lookup[start % len];
    let mut run = 0usize;
    for i in 0..len {
        let curr = lookup[(start + i) % len];
        if curr == id {
            run += 1;
        } else {
            *m.entry(id).or_default().entry(run).or_insert(0) += 1;
            id = curr;
            run = 1;
        }
    }
    *m.entry(id).or_default().entry(run).or_insert(0) += 1;

    Clumps(m)
}

impl fmt::Display for Clumps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, runs) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{{{id}: [")?;
            let mut run_first = true;
            for (len, count) in runs {
                if !run_first {
                    write!(f, ", ")?;
                }
                run_first = false;
                write!(f, "{len}x{count}")?;
            }
            write!(f, "]}}")?;
        }
        Ok(())
    }
}

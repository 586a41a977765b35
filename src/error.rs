//! Core error type.
//!
//! A plain, non-allocating enum with a hand-written `Display`/`Error` impl
//! rather than a derive-macro error crate, since construction must stay
//! total and allocation-free on well-formed input. The CLI demo layer uses
//! `anyhow` instead; see `src/cli`.

use std::fmt;

/// Errors returned from [`crate::updater::WeightUpdater::make`].
///
/// All other `WeightUpdater` methods are total on well-formed input: an
/// unknown `RealId` passed to `update_weight` is a silent no-op by contract,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// One of: empty real set, `pool_size == 0`, `lookup_size` smaller than
    /// `segments_per_weight * MAX_WEIGHT`, a weight outside `[0, MAX_WEIGHT]`,
    /// a duplicate `RealId`, or use of the invalid sentinel as an id.
    InvalidConfiguration,
    /// Across every ring in the unweighted pool, at least one configured
    /// real has no surviving entry — every occurrence of it was lost to
    /// collision. Indicates the pool is too small for the real count.
    PoolCollision,
    /// A data-model invariant was violated during construction. This should
    /// only fire on a library bug, never on caller input.
    InternalInvariant,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::InvalidConfiguration => "invalid weight-updater configuration",
            ConfigError::PoolCollision => {
                "unweighted pool failed to cover every configured real"
            }
            ConfigError::InternalInvariant => "internal weight-updater invariant violated",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ConfigError {}

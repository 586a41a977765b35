//! Compile-time configuration constants for the weight updater, collected
//! here as documented constants rather than runtime knobs.

/// Largest weight a real may be configured with. Weight `0` disables a real
/// administratively without discarding its head list.
pub const MAX_WEIGHT: u32 = 100;

/// Head positions granted per unit of weight.
pub const DEFAULT_SEGMENTS_PER_WEIGHT: u32 = 20;

/// Number of unweighted rings round-robined during head assignment (`M`).
pub const DEFAULT_POOL_SIZE: u32 = 20_000;

/// Deterministic seed for the salt/key RNG stream. Fixed, not exposed as a
/// runtime option, so that two updaters built from identical real/weight
/// input reliably produce identical lookup tables.
pub const RNG_SEED: u64 = 42;

/// Default allowed deviation between a real's configured and effective cell
/// share before `adjust` touches it.
pub const DEFAULT_DEVIATION_TOLERANCE: f64 = 0.05;

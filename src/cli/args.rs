//! Command-line argument schema for `chash-demo`, using `clap::Parser`
//! derive rather than hand-rolled flag matching.

use clap::Parser;

use crate::config;

/// Builds a weighted lookup table from a config file (or a small built-in
/// default set) and prints before/after/adjusted reports.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a config file of `<name> <id> <weight>` lines. Falls back to
    /// a built-in five-real demo set when omitted.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Total number of unweighted rings in the pool.
    #[arg(short = 'p', long, default_value_t = config::DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    /// Head positions granted per unit of weight.
    #[arg(short = 's', long, default_value_t = config::DEFAULT_SEGMENTS_PER_WEIGHT)]
    pub segments_per_weight: u32,

    /// Run the deviation-bounded adjustment pass after initializing the
    /// lookup table and print a third report.
    #[arg(short, long)]
    pub adjust: bool,
}

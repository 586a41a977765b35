//! Binary entry point for `chash-demo`: builds a weighted lookup table from
//! a config file (or a small built-in default set), prints its initial
//! distribution, applies a second round of weights, and optionally runs the
//! deviation-bounded adjustment pass.

use anyhow::Context;
use clap::Parser;

use chash::cli::args::Args;
use chash::cli::{ingest, report};
use chash::real::INVALID;
use chash::WeightUpdater;

fn default_reals() -> (Vec<String>, Vec<u32>, Vec<u32>) {
    (
        vec!["alpha", "beta", "gamma", "delta", "epsilon"]
            .into_iter()
            .map(String::from)
            .collect(),
        vec![0, 1, 2, 3, 4],
        vec![100, 100, 50, 10, 1],
    )
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (reals, ids, weights) = match &args.config {
        Some(path) => ingest::read_config(std::path::Path::new(path))
            .with_context(|| format!("reading config file {path}"))?,
        None => default_reals(),
    };

    println!("Demo start.");
    println!("-----------------------------------------------------------");
    println!("  Reals requested");
    println!("-----------------------------------------------------------");
    for ((real, &id), &weight) in reals.iter().zip(&ids).zip(&weights) {
        println!("  {real} id={id} weight={weight}");
    }
    println!();

    let updater = WeightUpdater::make(&reals, &ids, &weights, args.pool_size, args.segments_per_weight, None)
        .context("failed to build updater")?;

    let mut lookup = vec![INVALID; updater.lookup_size() as usize];
    updater.init_lookup(&mut lookup);

    println!("-----------------------------------------------------------");
    println!("  Init statistics");
    println!("-----------------------------------------------------------");
    println!("weights: {}", report::weights(&lookup));
    println!("clumps: {}", report::clumps(&lookup));
    println!();

    // A second round of weight changes, halving every weight, to show
    // update_lookup's localized repaint.
    let halved: Vec<u32> = weights.iter().map(|&w| w / 2).collect();
    println!("-----------------------------------------------------------");
    println!("  Apply weights");
    println!("-----------------------------------------------------------");
    for (&id, &w) in ids.iter().zip(&halved) {
        println!("  id={id} weight={w}");
    }
    println!();

    let mut updater = updater;
    updater.update_lookup(&ids, &halved, &mut lookup);
    println!("weights: {}", report::weights(&lookup));
    println!("clumps: {}", report::clumps(&lookup));
    println!();

    if args.adjust {
        println!("-----------------------------------------------------------");
        println!("  Adjust");
        println!("-----------------------------------------------------------");
        updater.adjust(&mut lookup);
        println!("weights: {}", report::weights(&lookup));
        println!("clumps: {}", report::clumps(&lookup));
    }

    Ok(())
}

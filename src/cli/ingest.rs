//! Reads a `<name> <id> <weight>` config file, one real per line, rejecting
//! trailing garbage and out-of-range weights.
//!
//! Uses `anyhow` rather than `crate::error::ConfigError` for these
//! user-facing failures, since the CLI layer wants formatted, allocating
//! diagnostics while the core stays allocation-free.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::config::MAX_WEIGHT;
use crate::real::{RealId, Weight};

/// Parses a config file into index-aligned `(reals, ids, weights)`.
pub fn read_config(path: &Path) -> anyhow::Result<(Vec<String>, Vec<RealId>, Vec<Weight>)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;

    let mut reals = Vec::new();
    let mut ids = Vec::new();
    let mut weights = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = fields
            .next()
            .with_context(|| format!("line {}: missing real name", lineno + 1))?;
        let id: RealId = fields
            .next()
            .with_context(|| format!("line {}: missing id", lineno + 1))?
            .parse()
            .with_context(|| format!("line {}: id is not an integer", lineno + 1))?;
        let weight: Weight = fields
            .next()
            .with_context(|| format!("line {}: missing weight", lineno + 1))?
            .parse()
            .with_context(|| format!("line {}: weight is not an integer", lineno + 1))?;

        if fields.next().is_some() {
            bail!("line {}: wrong config file format", lineno + 1);
        }
        if weight > MAX_WEIGHT {
            bail!("line {}: weight out of range", lineno + 1);
        }

        reals.push(name.to_string());
        ids.push(id);
        weights.push(weight);
    }

    Ok((reals, ids, weights))
}

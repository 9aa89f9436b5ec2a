use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use rk_conformance::{ConformanceSuite, Tolerance};
use rk_tensor::DType;

/// Which kernel a run exercises, with its extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `n x n @ n x n`.
    Matmul { n: usize },
    /// `n x n` input, `k x k` kernel.
    Conv2d { n: usize, k: usize },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Matmul { .. } => "matmul",
            Operation::Conv2d { .. } => "conv2d",
        }
    }

    /// Number of scalar multiply-adds in the reference sense used for
    /// `log_size`: `n^3` for matmul, `n^2 * k^2` for conv2d.
    pub fn work(&self) -> u128 {
        match *self {
            Operation::Matmul { n } => (n as u128).pow(3),
            Operation::Conv2d { n, k } => (n as u128).pow(2) * (k as u128).pow(2),
        }
    }
}

/// How operand buffers are initialised before a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Zeros,
    Ones,
    /// A deterministic, non-constant pattern in `[0, 1)`.
    Pattern,
    /// Uniform in `[-1, 1)` from a seeded RNG.
    Random,
}

impl FromStr for Fill {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zeros" => Ok(Fill::Zeros),
            "ones" => Ok(Fill::Ones),
            "pattern" => Ok(Fill::Pattern),
            "random" => Ok(Fill::Random),
            other => Err(anyhow!("unknown fill '{}'", other)),
        }
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Fill::Zeros => "zeros",
            Fill::Ones => "ones",
            Fill::Pattern => "pattern",
            Fill::Random => "random",
        };
        f.write_str(s)
    }
}

/// Settings for one timed kernel run, collected from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub op: Operation,
    pub fill: Fill,
    pub dtype: DType,
    pub seed: u64,
    pub warmup: usize,
    pub reps: usize,
    pub json: bool,
}

impl RunConfig {
    /// Builds a config from the `matmul` or `conv2d` subcommand matches.
    pub fn from_matches(name: &str, m: &ArgMatches) -> Result<Self> {
        let n = *m.get_one::<usize>("size").context("missing --size")?;
        let op = match name {
            "matmul" => Operation::Matmul { n },
            "conv2d" => Operation::Conv2d {
                n,
                k: *m.get_one::<usize>("kernel").context("missing --kernel")?,
            },
            other => bail!("'{}' is not a kernel subcommand", other),
        };

        let fill = m
            .get_one::<String>("fill")
            .map(|s| s.parse::<Fill>())
            .transpose()?
            .unwrap_or(Fill::Ones);
        let dtype = m
            .get_one::<String>("dtype")
            .map(|s| s.parse::<DType>())
            .transpose()?
            .unwrap_or(DType::F32);

        let reps = *m.get_one::<usize>("reps").unwrap_or(&9);
        if reps == 0 {
            bail!("--reps must be at least 1");
        }

        Ok(RunConfig {
            op,
            fill,
            dtype,
            seed: *m.get_one::<u64>("seed").unwrap_or(&0),
            warmup: *m.get_one::<usize>("warmup").unwrap_or(&3),
            reps,
            json: m.get_flag("json"),
        })
    }
}

/// Builds the conformance suite described by the `check` subcommand.
pub fn suite_from_matches(m: &ArgMatches) -> Result<ConformanceSuite> {
    let tolerance = match m.get_one::<String>("tolerance").map(String::as_str) {
        None | Some("exact") => Tolerance::BitExact,
        Some("relaxed") => Tolerance::relaxed(),
        Some(other) => bail!("unknown tolerance '{}'", other),
    };
    let mut suite = ConformanceSuite::new(tolerance);
    if let Some(seed) = m.get_one::<u64>("seed") {
        suite = suite.with_seed(*seed);
    }
    Ok(suite)
}

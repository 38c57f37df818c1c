// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use counterpoint::{harmonize_file, JobConfig};
use tracing::Level;

fn print_usage() {
    println!("COUNTERPOINT - Two-voice counterpoint generator");
    println!();
    println!("Usage: counterpoint <INPUT.mid> <OUTPUT.mid> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --key <KEY>        Key signature, e.g. C, F#m, Bb (default C)");
    println!("  --seed <N>         Seed the random generator for repeatable output");
    println!("  --config <FILE>    Load job settings from a YAML or TOML file");
    println!("  --verbose, -v      Log every generated note");
    println!("  --help, -h         Show this help message");
}

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    key: Option<String>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    verbose: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--key" => {
                let value = iter.next().ok_or_else(|| anyhow!("--key requires a value"))?;
                parsed.key = Some(value.clone());
            }
            "--seed" => {
                let value = iter.next().ok_or_else(|| anyhow!("--seed requires a value"))?;
                parsed.seed = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("Invalid seed: {}", value))?,
                );
            }
            "--config" => {
                let value = iter.next().ok_or_else(|| anyhow!("--config requires a file"))?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => parsed.help = true,
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => {
                if parsed.input.is_none() {
                    parsed.input = Some(PathBuf::from(other));
                } else if parsed.output.is_none() {
                    parsed.output = Some(PathBuf::from(other));
                } else {
                    bail!("Unexpected argument: {}", other);
                }
            }
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if args.help {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let (input, output) = match (args.input, args.output) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            eprintln!("Error: both an input and an output file are required");
            print_usage();
            std::process::exit(1);
        }
    };

    let mut config = match &args.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };
    if let Some(key) = args.key {
        config.key = key;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let result = harmonize_file(&input, &output, &config)?;

    println!(
        "Wrote {} melody notes and {} counter notes in {} to {}",
        result.melody.len(),
        result.counterpoint.len(),
        result.key,
        output.display()
    );
    Ok(())
}

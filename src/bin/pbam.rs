// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use pbam::{Input, MultipoleSolver};
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use serde::Serialize;
use std::{io::Write, path::PathBuf};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve for the self-consistent multipoles
    #[clap(arg_required_else_help = true)]
    Solve {
        /// Input file in YAML format
        #[clap(long, short = 'i')]
        input: PathBuf,
    },
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action, global = true)]
    pub verbose: bool,
    /// Output file in YAML format
    #[clap(long, short = 'o', default_value = "output.yaml", global = true)]
    pub output: PathBuf,
}

/// Expansions of one molecule as rows of (re, im), m = -n..=n
#[derive(Serialize)]
struct MoleculeOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    multipoles: Vec<Vec<(f64, f64)>>,
    local: Vec<Vec<(f64, f64)>>,
}

fn main() {
    if let Err(err) = do_main() {
        eprintln!("Error: {:#}", &err);
        std::process::exit(1);
    }
}

fn do_main() -> Result<()> {
    let args = Args::parse();
    if args.verbose && std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(DEFAULT_FILTER_ENV, "Debug");
    }
    pretty_env_logger::init();

    match args.command {
        Commands::Solve { input } => {
            let mut yaml_output = std::fs::File::create(&args.output)?;
            solve(input, &mut yaml_output)?;
        }
    }
    Ok(())
}

/// Helper function to serialize data to an existing YAML file
fn write_yaml<T: serde::Serialize>(
    data: &T,
    output: &mut std::fs::File,
    key: Option<&str>,
) -> Result<()> {
    let yaml = match key {
        Some(key) => {
            let mut wrapper = std::collections::BTreeMap::new();
            wrapper.insert(key.to_string(), data);
            serde_yaml::to_string(&wrapper)?
        }
        None => serde_yaml::to_string(data)?,
    };
    output.write_all(yaml.as_bytes())?;
    Ok(())
}

fn solve(input: PathBuf, yaml_output: &mut std::fs::File) -> Result<()> {
    let input = Input::from_file(&input)?;
    let system = input.system();
    log::info!("{}", input.medium());
    log::info!(
        "{} molecules with a total charge of {:.2}",
        system.len(),
        system.molecules().iter().map(|m| m.net_charge()).sum::<f64>()
    );

    let settings = input.solver().clone();
    let mut solver = MultipoleSolver::new(&system, input.medium(), settings.clone())?;

    let pb = ProgressBar::new(*settings.max_iterations() as u64);
    let status = solver.solve_with(*settings.tolerance(), |iteration, _| {
        pb.set_position(iteration as u64)
    })?;
    pb.finish_and_clear();
    if status.is_converged() {
        log::info!("Solver {}", status);
    } else {
        log::warn!("Solver {}", status);
    }

    let local = solver.local_expansions()?;
    let molecules: Vec<_> = system
        .molecules()
        .iter()
        .zip(solver.multipoles().iter().zip(local.iter()))
        .map(|(molecule, (multipoles, local))| MoleculeOutput {
            name: molecule.name().as_deref(),
            multipoles: multipoles.rows(),
            local: local.rows(),
        })
        .collect();

    write_yaml(input.medium(), yaml_output, Some("medium"))?;
    write_yaml(&settings, yaml_output, Some("solver"))?;
    write_yaml(&status, yaml_output, Some("status"))?;
    write_yaml(&solver.history(), yaml_output, Some("history"))?;
    write_yaml(&molecules, yaml_output, Some("molecules"))?;
    Ok(())
}

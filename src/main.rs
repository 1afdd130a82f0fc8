use cmapd_rust::assign::{GreedyAssigner, TaskAssigner};
use cmapd_rust::config::{Cli, Config, SolverKind};
use cmapd_rust::instance::Instance;
use cmapd_rust::solver::{Reservation, Solver, CBS, PP};

use anyhow::{bail, Context};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let instance = Instance::from_files(&config.instance_path, &config.map_path)
        .with_context(|| format!("error loading instance: {}", config.instance_path))?;
    let waypoints = GreedyAssigner.assign(&instance, config.capacity)?;

    let options = config.solver_options();
    let solution = match config.solver {
        SolverKind::Cbs => CBS::new(&instance, &waypoints, options)?.solve(),
        SolverKind::Pp => PP::new(&instance, &waypoints, options)?.solve(),
        SolverKind::Pbs => {
            PP::with_reservation(&instance, &waypoints, options, Reservation::Wall)?.solve()
        }
    }
    .with_context(|| format!("{} solve fails", config.solver))?;

    if !solution.verify(&instance) {
        error!("{} solution does not verify", config.solver);
        bail!("invalid solution");
    }

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("cannot create output file: {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &solution)?;
        info!("solution written to {output_path}");
    }

    Ok(())
}

//! Supply Chain Simulator CLI
//!
//! Load a run configuration and a network topology, build the agents, run
//! the simulation to completion and print the results as JSON.
//!
//! # Example
//!
//! ```bash
//! # Run the configured scenario
//! scsim --config config/simulation.yaml
//!
//! # Same scenario on another network, shorter horizon, results to a file
//! scsim --config config/simulation.yaml --network data/small.json --ticks 30 --output results.json
//! ```

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use supply_chain_sim_core_rs::core::logging;
use supply_chain_sim_core_rs::events::schedule_scenario_events;
use supply_chain_sim_core_rs::network::Topology;
use supply_chain_sim_core_rs::{
    AgentRegistry, NetworkGraph, SimulationLoop, SimulationResults, SimulatorConfig,
};
use tracing::{error, info, warn};

/// Supply Chain Simulator
///
/// Runs a day-by-day agent-based simulation of a supply chain network.
#[derive(Parser, Debug)]
#[command(name = "scsim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Run configuration (YAML or JSON)
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Topology file, overriding network_config.network_data_file
    #[arg(short = 'n', long)]
    network: Option<PathBuf>,

    /// Number of ticks to run, overriding simulation_settings.total_ticks
    #[arg(short = 't', long)]
    ticks: Option<usize>,

    /// Write results JSON to this file as well as stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match SimulatorConfig::from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.apply_overrides(args.ticks, args.network.clone()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    let _guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config, args.output.as_ref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &SimulatorConfig, output: Option<&PathBuf>) -> Result<SimulationResults, Box<dyn Error>> {
    let settings = &config.simulation_settings;
    info!(
        simulation = %settings.simulation_name,
        total_ticks = settings.total_ticks,
        "Starting supply chain simulator"
    );

    let network_file = config
        .network_config
        .network_data_file
        .as_ref()
        .ok_or("no network file: set network_config.network_data_file or pass --network")?;
    let topology = Topology::from_path(network_file)?;
    let (mut graph, report) = NetworkGraph::from_topology(&settings.simulation_name, topology);
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "Some topology entries were skipped");
    }

    let agents = AgentRegistry::from_network(
        &graph,
        &config.agent_configs,
        &config.disruption_agent_default_config,
    )?;

    let mut sim = SimulationLoop::new(
        settings.simulation_name.clone(),
        &mut graph,
        agents,
        settings.total_ticks,
    );
    schedule_scenario_events(&mut sim, &config.scenario_events);
    let results = sim.run()?;

    let rendered = serde_json::to_string_pretty(&results)?;
    println!("{}", rendered);
    if let Some(path) = output {
        fs::write(path, &rendered)?;
        info!(path = %path.display(), "Wrote results");
    }
    Ok(results)
}

mod config;
mod init;
mod logging;
mod render;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uap_jobs::{JobResult, JobTrigger, Routine};
use uap_state::{Domain, StateStore};

use crate::config::{CliOverrides, Config};

/// Status server and maintenance runner for the Unix admin platform.
#[derive(Parser)]
#[command(name = "uap", version, about = "Unix admin platform status server")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Platform base directory (scripts, web/templates, web/static)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Directory holding the state artifacts (default: <base-dir>/data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP status server
    Serve {
        /// Port to listen on
        #[arg(long, env = "UAP_PORT")]
        port: Option<u16>,
    },

    /// Print the JSON view of one domain
    Show {
        /// system, monitoring, security or backups
        domain: Domain,
    },

    /// Run a maintenance routine and print its result
    Run {
        /// monitor, security-scan or backup
        routine: Routine,
    },

    /// Create the platform directories and install default templates
    Init,
}

fn main() {
    let cli = Cli::parse();

    let port = match &cli.command {
        Commands::Serve { port } => *port,
        _ => None,
    };
    let overrides = CliOverrides {
        port,
        base_dir: cli.base_dir,
        data_dir: cli.data_dir,
    };
    let config = match config::load(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve { .. } => cmd_serve(config),
        Commands::Show { domain } => cmd_show(&config, domain),
        Commands::Run { routine } => cmd_run(config, routine),
        Commands::Init => cmd_init(&config),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    }
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: could not serialize output: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_serve(config: Config) {
    let _log = logging::init("info", config.log_dir.as_deref());
    let rt = runtime();
    if let Err(e) = rt.block_on(serve::start_server(config)) {
        tracing::error!("server error: {}", e);
        eprintln!("Server error: {}", e);
        process::exit(1);
    }
}

fn cmd_show(config: &Config, domain: Domain) {
    let _log = logging::init("warn", None);
    let store = StateStore::new(config.state.clone());
    print_json(&store.view(domain));
}

fn cmd_run(config: Config, routine: Routine) {
    let _log = logging::init("warn", config.log_dir.as_deref());
    let trigger = JobTrigger::new(config.routines);
    let rt = runtime();

    let result = match rt.block_on(trigger.trigger(routine)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {}", e);
            JobResult::failure(e.to_string())
        }
    };
    print_json(&result);
    if !result.success {
        process::exit(1);
    }
}

fn cmd_init(config: &Config) {
    let _log = logging::init("warn", None);
    match init::run(config) {
        Ok(report) => {
            for path in &report.written {
                println!("created {}", path.display());
            }
            for path in &report.kept {
                println!("kept    {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

mod commands;
mod script;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fluxcell_storage::{EnergyPool, PoolConfig, STORAGE_KEY};
use tracing_subscriber::EnvFilter;

use script::{PoolSpec, Step};

#[derive(Parser)]
#[command(name = "fluxcell-cli", about = "CLI tool for fluxcell energy pools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How to build the pool a command operates on.
#[derive(Args, Debug)]
struct PoolArgs {
    /// YAML or JSON pool config; overrides the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "10000")]
    capacity: i64,
    #[arg(long)]
    max_transfer: Option<i64>,
    #[arg(long)]
    max_receive: Option<i64>,
    #[arg(long)]
    max_extract: Option<i64>,
    /// Initial stored energy
    #[arg(long)]
    stored: Option<i64>,
}

impl PoolArgs {
    fn config(&self) -> anyhow::Result<PoolConfig> {
        if let Some(path) = &self.config {
            return PoolConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()));
        }
        Ok(PoolConfig {
            capacity: self.capacity,
            max_transfer: self.max_transfer,
            max_receive: self.max_receive,
            max_extract: self.max_extract,
            initial_stored: self.stored,
        })
    }

    fn build(&self) -> anyhow::Result<EnergyPool> {
        Ok(EnergyPool::from_config(&self.config()?)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and record key conventions
    Info,
    /// Run a transfer script against a pool
    Simulate {
        #[command(flatten)]
        pool: PoolArgs,
        /// Steps such as give:100 take:30 recv32:5 extr32:5 sim-give:10 sim-take:10
        #[arg(required = true)]
        steps: Vec<Step>,
    },
    /// Merge pool B into pool A (each given as stored/capacity)
    Merge {
        a: PoolSpec,
        b: PoolSpec,
    },
    /// Save a pool into a record store
    Save {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        pool: PoolArgs,
    },
    /// Load a pool from a record store into a pool built from the given config
    Load {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        pool: PoolArgs,
    },
    /// List records in a store, or dump one as JSON
    Inspect {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
}

fn print_pool(label: &str, pool: &EnergyPool) {
    println!(
        "{label}: stored={}/{} (legacy {}/{}), max_receive={}, max_extract={}",
        pool.stored(),
        pool.capacity(),
        pool.stored_legacy(),
        pool.capacity_legacy(),
        pool.max_receive(),
        pool.max_extract()
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("fluxcell-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("owner record key: {STORAGE_KEY}");
            println!("pool record key: {}", fluxcell_storage::ENERGY_KEY);
            println!("narrow max: {}", fluxcell_common::NARROW_MAX);
            println!("store schema: v{}", fluxcell_persist::STORE_SCHEMA_VERSION);
        }
        Commands::Simulate { pool, steps } => {
            let mut pool = pool.build()?;
            print_pool("start", &pool);
            for step in steps {
                let moved = step.apply(&mut pool);
                println!("{:<16} -> {moved:>12}  stored={}", step.to_string(), pool.stored());
            }
            print_pool("end", &pool);
        }
        Commands::Merge { a, b } => {
            print_pool("a", &a.build());
            print_pool("b", &b.build());
            print_pool("merged", &commands::merge_pools(a, b));
        }
        Commands::Save { store, name, pool } => {
            let pool = pool.build()?;
            commands::save_pool(&store, &name, &pool)?;
            print_pool(&name, &pool);
        }
        Commands::Load { store, name, pool } => {
            let mut pool = pool.build()?;
            commands::load_pool(&store, &name, &mut pool)?;
            print_pool(&name, &pool);
        }
        Commands::Inspect { store, name } => {
            println!("{}", commands::inspect(&store, name.as_deref())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_args(args: &[&str]) -> PoolArgs {
        let argv = ["fluxcell-cli", "simulate"]
            .into_iter()
            .chain(args.iter().copied())
            .chain(["give:1"]);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Simulate { pool, .. } => pool,
            _ => unreachable!(),
        }
    }

    #[test]
    fn flags_build_the_pool() {
        let pool = pool_args(&["--capacity", "500", "--max-receive", "20", "--stored", "7"])
            .build()
            .unwrap();
        assert_eq!(pool.capacity(), 500);
        assert_eq!(pool.max_receive(), 20);
        assert_eq!(pool.stored(), 7);
    }

    #[test]
    fn config_file_overrides_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("pool.yaml");
        std::fs::write(&config, "capacity: 2000\nmax_transfer: 50\ninitial_stored: 900\n").unwrap();
        let config = config.to_string_lossy().into_owned();

        let pool = pool_args(&["--config", &config, "--capacity", "10", "--stored", "3"])
            .build()
            .unwrap();
        assert_eq!(pool.capacity(), 2000);
        assert_eq!(pool.max_receive(), 50);
        assert_eq!(pool.max_extract(), 50);
        assert_eq!(pool.stored(), 900);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("absent.yaml").to_string_lossy().into_owned();
        let err = pool_args(&["--config", &config]).build().unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }

    #[test]
    fn save_command_parses_store_arguments() {
        let cli = Cli::try_parse_from([
            "fluxcell-cli", "save", "--store", "data", "--name", "cell", "--capacity", "64",
        ])
        .unwrap();
        let Commands::Save { store, name, pool } = cli.command else {
            panic!("expected save");
        };
        assert_eq!(store, PathBuf::from("data"));
        assert_eq!(name, "cell");
        assert_eq!(pool.build().unwrap().capacity(), 64);
    }
}

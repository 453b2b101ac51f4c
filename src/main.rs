use anyhow::{Context, Result};
use clap::Parser;
use solbuild::{
    artifacts::{EvmVersion, Optimizer, Settings},
    BuildPaths, BuildRunner, Solc, DEFAULT_CONTRACT_FILE,
};
use std::{path::PathBuf, process};
use tracing_subscriber::EnvFilter;
use yansi::Paint;

/// Compile one Solidity contract and write its ABI and bytecode artifacts
#[derive(Parser)]
#[command(name = "solbuild", version, about, long_about = None)]
struct Cli {
    /// Contract file name, relative to the contracts directory
    #[arg(short, long, default_value = DEFAULT_CONTRACT_FILE)]
    contract: String,

    /// Project root the default directories live under
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Contracts directory (default: <root>/contracts)
    #[arg(long)]
    contracts_dir: Option<PathBuf>,

    /// Build output directory (default: <root>/build)
    #[arg(short = 'o', long)]
    build_dir: Option<PathBuf>,

    /// Dependency root for resolving library imports; omitting it disables
    /// import resolution
    #[arg(long)]
    lib_dir: Option<PathBuf>,

    /// Path to the solc binary (default: $SOLC_PATH, then `solc` on PATH)
    #[arg(long)]
    solc: Option<PathBuf>,

    /// Enable the optimizer
    #[arg(long)]
    optimize: bool,

    /// Optimizer runs
    #[arg(long, default_value_t = 200)]
    optimizer_runs: u32,

    /// Target EVM version, e.g. `london`
    #[arg(long)]
    evm_version: Option<EvmVersion>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("solbuild=info")),
        )
        .without_time()
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("{} {:#}", Paint::red("error:").bold(), err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut paths = BuildPaths::new(&cli.root)
        .with_context(|| format!("could not resolve project root \"{}\"", cli.root.display()))?;
    if let Some(dir) = cli.contracts_dir {
        paths.contracts = dir;
    }
    if let Some(dir) = cli.build_dir {
        paths.artifacts = dir;
    }
    paths.libraries = cli.lib_dir;
    paths.contract_file = cli.contract;

    let solc = cli.solc.map(Solc::new).unwrap_or_default();
    if let Ok(version) = solc.version() {
        println!(
            "Compiling {} with solc {}.{}.{}",
            paths.contract_file, version.major, version.minor, version.patch
        );
    }

    let settings = Settings {
        optimizer: Optimizer {
            enabled: cli.optimize.then_some(true),
            runs: cli.optimize.then_some(cli.optimizer_runs),
        },
        evm_version: cli.evm_version,
        ..Default::default()
    };

    let runner = BuildRunner::builder().paths(paths).settings(settings).solc(solc).build();
    let output = runner.run()?;
    print!("{}", output);
    Ok(())
}

#![doc = include_str!("../README.md")]

pub mod artifacts;
pub use artifacts::{CompilerInput, CompilerOutput};

mod compile;
pub use compile::{Compiler, Solc, SOLC};

mod config;
pub use config::{BuildPaths, BuildPathsBuilder, DEFAULT_CONTRACT_FILE};

pub mod error;
pub use error::BuildError;

mod resolver;
pub use resolver::{ImportResolution, LibraryResolver};

pub mod utils;

use crate::artifacts::{Contract, Settings, Source, Sources};
use error::Result;
use std::{fmt, fs, path::PathBuf};
use tracing::{error, info, trace, warn};

/// Compiles one contract file and persists its artifacts.
///
/// The pipeline is linear: read the source, optionally expand its library
/// imports, invoke the compiler, inspect diagnostics, write one `.abi` and
/// one `.bin` file per contract into the build directory.
#[derive(Debug)]
pub struct BuildRunner<C = Solc> {
    /// The layout of the build
    pub paths: BuildPaths,
    /// How the compiler invocation is configured
    pub settings: Settings,
    /// The compiler invoked for the build
    pub compiler: C,
}

impl BuildRunner<Solc> {
    /// Configure a runner against the system `solc`
    ///
    /// # Example
    ///
    /// ```rust
    /// use solbuild::BuildRunner;
    /// let runner = BuildRunner::builder().build();
    /// ```
    pub fn builder() -> BuildRunnerBuilder {
        BuildRunnerBuilder::default()
    }
}

impl<C: Compiler> BuildRunner<C> {
    /// Creates a runner over the given compiler
    pub fn new(paths: BuildPaths, compiler: C) -> Self {
        Self { paths, settings: Settings::default(), compiler }
    }

    /// Runs the build and reports the written artifact paths.
    ///
    /// Fails on an unreadable source, a failed compiler invocation, any
    /// error-severity diagnostic, or an unwritable build directory. Nothing
    /// is persisted unless every diagnostic is non-fatal.
    pub fn run(&self) -> Result<BuildOutput> {
        let contract_path = self.paths.contract_path();
        trace!("reading contract source from {}", contract_path.display());
        let source = Source::read(&contract_path)?;

        let mut sources = Sources::new();
        sources.insert(self.paths.contract_file.clone(), source);

        if let Some(libraries) = &self.paths.libraries {
            let unresolved = LibraryResolver::new(libraries).expand_sources(&mut sources);
            if !unresolved.is_empty() {
                warn!(
                    "{} import(s) not found under {}",
                    unresolved.len(),
                    libraries.display()
                );
            }
        }

        trace!("invoking compiler with {} source(s)", sources.len());
        let input = CompilerInput::with_sources(sources).settings(self.settings.clone());
        let output = self.compiler.compile(&input)?;

        let mut fatal = false;
        for err in &output.errors {
            if err.severity.is_error() {
                fatal = true;
                error!("{}", err);
            } else if err.severity.is_warning() {
                warn!("{}", err);
            } else {
                info!("{}", err);
            }
        }
        if fatal {
            return Err(BuildError::Diagnostics(output.errors))
        }

        self.ensure_build_dir()?;

        let mut artifacts = Vec::new();
        if let Some(contracts) = output.contracts.get(&self.paths.contract_file) {
            for (name, contract) in contracts {
                artifacts.push(self.write_artifacts(name, contract)?);
            }
        }
        if artifacts.is_empty() {
            warn!("no output from compilation for {}", self.paths.contract_file);
            return Ok(BuildOutput::Empty)
        }
        Ok(BuildOutput::Compiled { artifacts })
    }

    /// Creates the build directory if absent; an existing directory is
    /// reused as is
    fn ensure_build_dir(&self) -> Result<()> {
        let dir = &self.paths.artifacts;
        if dir.exists() {
            return Ok(())
        }
        fs::create_dir(dir).map_err(|source| BuildError::OutputDir { path: dir.clone(), source })
    }

    fn write_artifacts(&self, name: &str, contract: &Contract) -> Result<ContractArtifacts> {
        let abi = self.paths.abi_path(name);
        fs::write(&abi, serde_json::to_vec_pretty(&contract.abi)?)
            .map_err(|err| BuildError::io(err, &abi))?;
        trace!("ABI saved to {}", abi.display());

        let object = contract.bytecode_object().ok_or_else(|| {
            BuildError::msg(format!("no bytecode object in compiler output for {}", name))
        })?;
        let bytecode = self.paths.bytecode_path(name);
        fs::write(&bytecode, object).map_err(|err| BuildError::io(err, &bytecode))?;
        trace!("bytecode saved to {}", bytecode.display());

        Ok(ContractArtifacts { contract: name.to_string(), abi, bytecode })
    }
}

pub struct BuildRunnerBuilder {
    paths: Option<BuildPaths>,
    settings: Option<Settings>,
    solc: Option<Solc>,
}

impl BuildRunnerBuilder {
    pub fn paths(mut self, paths: BuildPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn solc(mut self, solc: impl Into<Solc>) -> Self {
        self.solc = Some(solc.into());
        self
    }

    pub fn build(self) -> BuildRunner<Solc> {
        let Self { paths, settings, solc } = self;
        BuildRunner {
            paths: paths.unwrap_or_default(),
            settings: settings.unwrap_or_default(),
            compiler: solc.unwrap_or_default(),
        }
    }
}

impl Default for BuildRunnerBuilder {
    fn default() -> Self {
        Self { paths: None, settings: None, solc: None }
    }
}

/// Artifact files written for one compiled contract
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContractArtifacts {
    /// Name of the contract as declared in the source
    pub contract: String,
    /// Where the pretty-printed ABI was written
    pub abi: PathBuf,
    /// Where the hex bytecode text was written
    pub bytecode: PathBuf,
}

/// The result of a completed run
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BuildOutput {
    /// Artifacts were compiled and written to the build directory
    Compiled { artifacts: Vec<ContractArtifacts> },
    /// The compiler returned no contracts for the requested file
    Empty,
}

impl BuildOutput {
    /// The written artifacts, empty for [`BuildOutput::Empty`]
    pub fn artifacts(&self) -> &[ContractArtifacts] {
        match self {
            BuildOutput::Compiled { artifacts } => artifacts,
            BuildOutput::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BuildOutput::Empty)
    }
}

impl fmt::Display for BuildOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutput::Empty => writeln!(f, "no output from compilation"),
            BuildOutput::Compiled { artifacts } => {
                for artifact in artifacts {
                    writeln!(f, "Contract: {}", artifact.contract)?;
                    writeln!(f, "  ABI saved to {}", artifact.abi.display())?;
                    writeln!(f, "  bytecode saved to {}", artifact.bytecode.display())?;
                }
                Ok(())
            }
        }
    }
}

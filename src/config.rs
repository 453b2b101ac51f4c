use std::{io, path::PathBuf};

/// The contract compiled when no file name is configured
pub const DEFAULT_CONTRACT_FILE: &str = "BondAuctionFactory.sol";

/// Where to find the contract source and where to write its artifacts
#[derive(Debug, Clone)]
pub struct BuildPaths {
    /// Where to find sources
    pub contracts: PathBuf,
    /// Where to store build artifacts
    pub artifacts: PathBuf,
    /// Dependency root used to resolve library imports, if enabled
    pub libraries: Option<PathBuf>,
    /// File name of the contract to build, relative to `contracts`
    pub contract_file: String,
}

impl BuildPaths {
    pub fn builder() -> BuildPathsBuilder {
        BuildPathsBuilder::default()
    }

    /// Creates the conventional layout below the canonicalized root path:
    /// sources under `<root>/contracts`, artifacts under `<root>/build`
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = dunce::canonicalize(root.into())?;
        Ok(Self {
            contracts: root.join("contracts"),
            artifacts: root.join("build"),
            libraries: None,
            contract_file: DEFAULT_CONTRACT_FILE.to_string(),
        })
    }

    /// Path of the configured contract source
    pub fn contract_path(&self) -> PathBuf {
        self.contracts.join(&self.contract_file)
    }

    /// Path the pretty-printed ABI of `contract` is written to
    pub fn abi_path(&self, contract: &str) -> PathBuf {
        self.artifacts.join(format!("{}.abi", contract))
    }

    /// Path the hex bytecode text of `contract` is written to
    pub fn bytecode_path(&self, contract: &str) -> PathBuf {
        self.artifacts.join(format!("{}.bin", contract))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildPathsBuilder {
    contracts: Option<PathBuf>,
    artifacts: Option<PathBuf>,
    libraries: Option<PathBuf>,
    contract_file: Option<String>,
}

impl BuildPathsBuilder {
    pub fn contracts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contracts = Some(dir.into());
        self
    }

    pub fn artifacts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts = Some(dir.into());
        self
    }

    /// Enables import resolution against the given dependency root
    pub fn libraries(mut self, dir: impl Into<PathBuf>) -> Self {
        self.libraries = Some(dir.into());
        self
    }

    pub fn contract_file(mut self, name: impl Into<String>) -> Self {
        self.contract_file = Some(name.into());
        self
    }

    pub fn build(self) -> BuildPaths {
        BuildPaths {
            contracts: self.contracts.unwrap_or_else(|| PathBuf::from("contracts")),
            artifacts: self.artifacts.unwrap_or_else(|| PathBuf::from("build")),
            libraries: self.libraries,
            contract_file: self
                .contract_file
                .unwrap_or_else(|| DEFAULT_CONTRACT_FILE.to_string()),
        }
    }
}

impl Default for BuildPaths {
    fn default() -> Self {
        Self::builder().build()
    }
}

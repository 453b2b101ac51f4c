use crate::{
    artifacts::{CompilerInput, CompilerOutput},
    error::{BuildError, Result},
};
use semver::Version;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    io::BufRead,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    str::FromStr,
};

/// The name of the `solc` binary on the system
pub const SOLC: &str = "solc";

/// Turns a [`CompilerInput`] into a [`CompilerOutput`].
///
/// The build pipeline is generic over this so it can run against a stub
/// compiler returning controlled diagnostics and artifacts.
pub trait Compiler {
    /// Compiles the given input, returning the full standard-json output.
    ///
    /// An `Err` means the invocation itself failed; diagnostics the compiler
    /// reports about the source live inside the returned output.
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput>;
}

/// Abstraction over the `solc` command line utility
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord)]
pub struct Solc(pub PathBuf);

impl Default for Solc {
    fn default() -> Self {
        std::env::var("SOLC_PATH").map(Solc::new).unwrap_or_else(|_| Solc::new(SOLC))
    }
}

impl Solc {
    /// A new instance which points to `solc`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Solc(path.into())
    }

    /// Run `solc --standard-json` and return the output as [`CompilerOutput`]
    pub fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        self.compile_as(input)
    }

    /// Run `solc --standard-json` and deserialize the output into the given
    /// json output type
    pub fn compile_as<T: Serialize, D: DeserializeOwned>(&self, input: &T) -> Result<D> {
        let output = self.compile_output(input)?;
        Ok(serde_json::from_slice(&output)?)
    }

    /// Run `solc --standard-json` and return the raw output
    pub fn compile_output<T: Serialize>(&self, input: &T) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.0)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| {
                BuildError::solc(format!("failed to spawn \"{}\": {}", self.0.display(), err))
            })?;
        let stdin = child.stdin.take().unwrap();

        serde_json::to_writer(stdin, input)?;
        let output = child
            .wait_with_output()
            .map_err(|err| BuildError::solc(format!("solc did not exit cleanly: {}", err)))?;
        compile_output(output)
    }

    /// Returns the version from the configured `solc`
    pub fn version(&self) -> Result<Version> {
        let output = Command::new(&self.0)
            .arg("--version")
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .stdout(Stdio::piped())
            .output()
            .map_err(|err| {
                BuildError::solc(format!(
                    "failed to run \"{} --version\": {}",
                    self.0.display(),
                    err
                ))
            })?;
        version_from_output(output)
    }
}

impl Compiler for Solc {
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        Solc::compile(self, input)
    }
}

fn compile_output(output: Output) -> Result<Vec<u8>> {
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(BuildError::solc(String::from_utf8_lossy(&output.stderr).to_string()))
    }
}

fn version_from_output(output: Output) -> Result<Version> {
    if output.status.success() {
        let version = output
            .stdout
            .lines()
            .last()
            .ok_or_else(|| BuildError::solc("version not found in solc output"))?
            .map_err(|err| BuildError::solc(err.to_string()))?;
        // NOTE: semver doesn't like `+` in g++ in build metadata which is invalid semver
        Ok(Version::from_str(&version.trim_start_matches("Version: ").replace(".g++", ".gcc"))?)
    } else {
        Err(BuildError::solc(String::from_utf8_lossy(&output.stderr).to_string()))
    }
}

impl AsRef<Path> for Solc {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl<T: Into<PathBuf>> From<T> for Solc {
    fn from(solc: T) -> Self {
        Solc(solc.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_version_metadata() {
        let _version = Version::from_str("0.6.6+commit.6c089d02.Linux.gcc").unwrap();
    }

    #[test]
    fn solc_path_conversions() {
        let solc = Solc::from("/usr/local/bin/solc");
        assert_eq!(solc.as_ref(), Path::new("/usr/local/bin/solc"));
    }
}

//! Build pipeline tests against a stub compiler

use pretty_assertions::assert_eq;
use solbuild::{
    artifacts::{CompilerInput, CompilerOutput},
    error::Result,
    BuildError, BuildOutput, BuildPaths, BuildRunner, Compiler, DEFAULT_CONTRACT_FILE,
};
use std::{fs, path::Path, sync::Mutex};
use tempfile::TempDir;

const BOND_FACTORY_OUT: &str = include_str!("../test-data/out/bond-factory.json");
const SYNTAX_ERROR_OUT: &str = include_str!("../test-data/out/syntax-error.json");

const SOURCE: &str = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.13;\ncontract BondAuctionFactory {}\n";

/// Serves a canned output and records every input it was invoked with
struct FakeCompiler {
    output: CompilerOutput,
    seen: Mutex<Vec<CompilerInput>>,
}

impl FakeCompiler {
    fn new(output: CompilerOutput) -> Self {
        Self { output, seen: Mutex::new(Vec::new()) }
    }

    fn from_fixture(json: &str) -> Self {
        Self::new(serde_json::from_str(json).unwrap())
    }

    fn last_input(&self) -> CompilerInput {
        self.seen.lock().unwrap().last().cloned().expect("compiler was never invoked")
    }
}

impl Compiler for &FakeCompiler {
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        self.seen.lock().unwrap().push(input.clone());
        Ok(self.output.clone())
    }
}

/// Always fails the invocation itself, as a crashed `solc` would
struct FailingCompiler;

impl Compiler for FailingCompiler {
    fn compile(&self, _input: &CompilerInput) -> Result<CompilerOutput> {
        Err(BuildError::Solc("exit code: 1".to_string()))
    }
}

fn setup(source: &str) -> (TempDir, BuildPaths) {
    let tmp = tempfile::tempdir().unwrap();
    let contracts = tmp.path().join("contracts");
    fs::create_dir(&contracts).unwrap();
    fs::write(contracts.join(DEFAULT_CONTRACT_FILE), source).unwrap();

    let paths = BuildPaths::builder()
        .contracts(contracts)
        .artifacts(tmp.path().join("build"))
        .build();
    (tmp, paths)
}

fn artifact_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}

#[test]
fn writes_abi_and_bin_per_contract() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);

    let output = BuildRunner::new(paths.clone(), &compiler).run().unwrap();

    assert_eq!(output.artifacts().len(), 2);
    assert_eq!(
        artifact_files(&paths.artifacts),
        vec![
            "BondAuction.abi",
            "BondAuction.bin",
            "BondAuctionFactory.abi",
            "BondAuctionFactory.bin"
        ]
    );

    let expected = compiler.output.contracts["BondAuctionFactory.sol"]["BondAuction"]
        .bytecode_object()
        .unwrap();
    let written = fs::read_to_string(paths.bytecode_path("BondAuction")).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn abi_round_trips_through_the_artifact_file() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);

    BuildRunner::new(paths.clone(), &compiler).run().unwrap();

    let written = fs::read_to_string(paths.abi_path("BondAuctionFactory")).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&written).unwrap();
    assert_eq!(
        parsed,
        compiler.output.contracts["BondAuctionFactory.sol"]["BondAuctionFactory"].abi
    );
}

#[test]
fn fatal_diagnostics_abort_before_writing() {
    let (_tmp, paths) = setup("contract Broken {");
    let compiler = FakeCompiler::from_fixture(SYNTAX_ERROR_OUT);

    let err = BuildRunner::new(paths.clone(), &compiler).run().unwrap_err();
    match err {
        BuildError::Diagnostics(diagnostics) => {
            assert!(diagnostics.iter().any(|d| d.severity.is_error()))
        }
        other => panic!("expected diagnostics, got {:?}", other),
    }
    assert!(!paths.artifacts.exists());
}

#[test]
fn warnings_do_not_fail_the_build() {
    let (_tmp, paths) = setup(SOURCE);
    // the fixture carries a state-mutability warning next to its contracts
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);

    let output = BuildRunner::new(paths, &compiler).run().unwrap();
    assert!(!output.is_empty());
}

#[test]
fn empty_output_is_reported_without_files() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::new(CompilerOutput::default());

    let output = BuildRunner::new(paths.clone(), &compiler).run().unwrap();
    assert_eq!(output, BuildOutput::Empty);
    assert!(artifact_files(&paths.artifacts).is_empty());
}

#[test]
fn creates_build_dir_when_absent_and_reuses_it_when_present() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);
    let runner = BuildRunner::new(paths.clone(), &compiler);

    assert!(!paths.artifacts.exists());
    runner.run().unwrap();
    assert!(paths.artifacts.is_dir());

    // a second run over the populated directory must not error
    runner.run().unwrap();
}

#[test]
fn reruns_produce_byte_identical_bytecode() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);
    let runner = BuildRunner::new(paths.clone(), &compiler);

    runner.run().unwrap();
    let first = fs::read(paths.bytecode_path("BondAuctionFactory")).unwrap();
    runner.run().unwrap();
    let second = fs::read(paths.bytecode_path("BondAuctionFactory")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_source_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = BuildPaths::builder()
        .contracts(tmp.path().join("contracts"))
        .artifacts(tmp.path().join("build"))
        .build();
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);

    let err = BuildRunner::new(paths, &compiler).run().unwrap_err();
    assert!(matches!(err, BuildError::Io(_)));
}

#[test]
fn failed_invocation_is_distinct_from_diagnostics() {
    let (_tmp, paths) = setup(SOURCE);

    let err = BuildRunner::new(paths.clone(), FailingCompiler).run().unwrap_err();
    assert!(matches!(err, BuildError::Solc(_)));
    assert!(!paths.artifacts.exists());
}

#[test]
fn resolved_imports_reach_the_compiler_input() {
    let (tmp, mut paths) = setup(
        "import \"tokens/Bond.sol\";\npragma solidity ^0.8.13;\ncontract BondAuctionFactory {}\n",
    );
    let lib = tmp.path().join("node_modules");
    fs::create_dir_all(lib.join("tokens")).unwrap();
    fs::write(lib.join("tokens/Bond.sol"), "contract Bond {}").unwrap();
    paths.libraries = Some(lib);

    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);
    BuildRunner::new(paths, &compiler).run().unwrap();

    let input = compiler.last_input();
    assert_eq!(input.sources.len(), 2);
    assert!(input.sources.contains_key(DEFAULT_CONTRACT_FILE));
    assert_eq!(input.sources["tokens/Bond.sol"].content, "contract Bond {}");
}

#[test]
fn unresolved_imports_are_left_to_the_compiler() {
    let (tmp, mut paths) = setup(
        "import \"tokens/Gone.sol\";\npragma solidity ^0.8.13;\ncontract BondAuctionFactory {}\n",
    );
    let lib = tmp.path().join("node_modules");
    fs::create_dir(&lib).unwrap();
    paths.libraries = Some(lib);

    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);
    BuildRunner::new(paths, &compiler).run().unwrap();

    // the missing file is not in the input; whether that is fatal is the
    // compiler's call
    let input = compiler.last_input();
    assert_eq!(input.sources.len(), 1);
    assert!(input.sources.contains_key(DEFAULT_CONTRACT_FILE));
}

#[test]
fn only_contracts_of_the_requested_file_are_persisted() {
    let (_tmp, paths) = setup(SOURCE);
    let output: CompilerOutput = serde_json::from_value(serde_json::json!({
        "contracts": {
            "BondAuctionFactory.sol": {
                "BondAuctionFactory": {
                    "abi": [],
                    "evm": { "bytecode": { "object": "6080604052" } }
                }
            },
            "tokens/Bond.sol": {
                "Bond": {
                    "abi": [],
                    "evm": { "bytecode": { "object": "60806040ff" } }
                }
            }
        }
    }))
    .unwrap();
    let compiler = FakeCompiler::new(output);

    let built = BuildRunner::new(paths.clone(), &compiler).run().unwrap();
    assert_eq!(built.artifacts().len(), 1);
    assert_eq!(
        artifact_files(&paths.artifacts),
        vec!["BondAuctionFactory.abi", "BondAuctionFactory.bin"]
    );
}

#[test]
fn output_display_reports_each_artifact_path() {
    let (_tmp, paths) = setup(SOURCE);
    let compiler = FakeCompiler::from_fixture(BOND_FACTORY_OUT);

    let output = BuildRunner::new(paths.clone(), &compiler).run().unwrap();
    let report = output.to_string();
    assert!(report.contains("Contract: BondAuction"));
    assert!(report.contains(&paths.abi_path("BondAuction").display().to_string()));
    assert!(report.contains(&paths.bytecode_path("BondAuctionFactory").display().to_string()));

    assert_eq!(BuildOutput::Empty.to_string(), "no output from compilation\n");
}

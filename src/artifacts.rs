//! Solc artifact types
//!
//! The request/response types of the `solc --standard-json` protocol, pared
//! down to the artifact kinds this runner selects: the contract ABI and the
//! EVM bytecode object.

use crate::{error::SolcIoError, utils};
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::Path,
    str::FromStr,
};
use yansi::Paint;

/// An ordered mapping of source unit name to file content
pub type Sources = BTreeMap<String, Source>;

/// file name -> (contract name -> Contract)
pub type Contracts = BTreeMap<String, BTreeMap<String, Contract>>;

const SOLIDITY: &str = "Solidity";

/// Input type `solc` expects
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerInput {
    pub language: String,
    pub sources: Sources,
    pub settings: Settings,
}

impl CompilerInput {
    /// Creates an input with default settings from the given sources
    pub fn with_sources(sources: Sources) -> Self {
        Self { language: SOLIDITY.to_string(), sources, settings: Settings::default() }
    }

    /// Creates an input for a single named source
    pub fn with_source(name: impl Into<String>, source: Source) -> Self {
        let mut sources = Sources::new();
        sources.insert(name.into(), source);
        Self::with_sources(sources)
    }

    /// Sets the settings for compilation
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub optimizer: Optimizer,
    #[serde(
        default,
        with = "display_from_str_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub evm_version: Option<EvmVersion>,
    #[serde(default)]
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Settings {
    /// Output selection requesting the ABI and the bytecode object for every
    /// contract in every file
    pub fn default_output_selection() -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        let mut output_selection = BTreeMap::default();
        let mut contract_selection = BTreeMap::default();
        contract_selection
            .insert("*".to_string(), vec!["abi".to_string(), "evm.bytecode.object".to_string()]);
        output_selection.insert("*".to_string(), contract_selection);
        output_selection
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            optimizer: Optimizer::default(),
            evm_version: None,
            output_selection: Self::default_output_selection(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Optimizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EvmVersion {
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
}

impl fmt::Display for EvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            EvmVersion::Homestead => "homestead",
            EvmVersion::TangerineWhistle => "tangerineWhistle",
            EvmVersion::SpuriousDragon => "spuriousDragon",
            EvmVersion::Byzantium => "byzantium",
            EvmVersion::Constantinople => "constantinople",
            EvmVersion::Petersburg => "petersburg",
            EvmVersion::Istanbul => "istanbul",
            EvmVersion::Berlin => "berlin",
            EvmVersion::London => "london",
            EvmVersion::Paris => "paris",
            EvmVersion::Shanghai => "shanghai",
        };
        write!(f, "{}", string)
    }
}

impl FromStr for EvmVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "homestead" => Ok(EvmVersion::Homestead),
            "tangerineWhistle" => Ok(EvmVersion::TangerineWhistle),
            "spuriousDragon" => Ok(EvmVersion::SpuriousDragon),
            "byzantium" => Ok(EvmVersion::Byzantium),
            "constantinople" => Ok(EvmVersion::Constantinople),
            "petersburg" => Ok(EvmVersion::Petersburg),
            "istanbul" => Ok(EvmVersion::Istanbul),
            "berlin" => Ok(EvmVersion::Berlin),
            "london" => Ok(EvmVersion::London),
            "paris" => Ok(EvmVersion::Paris),
            "shanghai" => Ok(EvmVersion::Shanghai),
            s => Err(format!("Unknown evm version: {}", s)),
        }
    }
}

/// A named source unit's textual content
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Source {
    pub content: String,
}

impl Source {
    /// Reads the file content
    pub fn read(file: impl AsRef<Path>) -> Result<Self, SolcIoError> {
        let file = file.as_ref();
        Ok(Self { content: fs::read_to_string(file).map_err(|err| SolcIoError::new(err, file))? })
    }

    /// Returns all import statements of the file
    pub fn parse_imports(&self) -> Vec<&str> {
        utils::find_import_paths(&self.content)
    }
}

/// Output type `solc` produces
///
/// Either section may be missing entirely, e.g. a parse failure reports
/// errors and no contracts.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct CompilerOutput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Error>,
    #[serde(default, skip_serializing_if = "::std::collections::BTreeMap::is_empty")]
    pub contracts: Contracts,
}

impl CompilerOutput {
    /// Whether the output contains an error-severity diagnostic
    pub fn has_error(&self) -> bool {
        self.errors.iter().any(|err| err.severity.is_error())
    }
}

/// Represents a compiled contract unit
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Contract {
    /// The Ethereum Contract ABI; an empty array if the unit declares no
    /// externally visible interface. See https://docs.soliditylang.org/en/develop/abi-spec.html
    #[serde(default)]
    pub abi: Vec<serde_json::Value>,
    /// EVM-related outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm: Option<Evm>,
}

impl Contract {
    /// The deployable bytecode object as hex text, if the compiler produced
    /// one
    pub fn bytecode_object(&self) -> Option<&str> {
        self.evm.as_ref().map(|evm| evm.bytecode.object.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Evm {
    pub bytecode: Bytecode,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Bytecode {
    /// The bytecode as a hex string
    pub object: String,
}

/// A compiler diagnostic
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_source_locations: Vec<SecondarySourceLocation>,
    pub r#type: String,
    pub component: String,
    pub severity: Severity,
    #[serde(
        default,
        with = "display_from_str_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_code: Option<u64>,
    pub message: String,
    pub formatted_message: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.formatted_message {
            match self.severity {
                Severity::Error => {
                    if let Some(code) = self.error_code {
                        Paint::red(format!("error[{}]: ", code)).fmt(f)?;
                    }
                    Paint::red(msg).fmt(f)
                }
                Severity::Warning | Severity::Info => {
                    if let Some(code) = self.error_code {
                        Paint::yellow(format!("warning[{}]: ", code)).fmt(f)?;
                    }
                    Paint::yellow(msg).fmt(f)
                }
            }
        } else {
            self.severity.fmt(f)?;
            write!(f, ": {}", self.message)
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    pub fn is_info(&self) -> bool {
        matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => Paint::red("Error").fmt(f),
            Severity::Warning => Paint::yellow("Warning").fmt(f),
            Severity::Info => f.write_str("Info"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            s => Err(format!("Invalid severity: {}", s)),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Severity::Error => serializer.serialize_str("error"),
            Severity::Warning => serializer.serialize_str("warning"),
            Severity::Info => serializer.serialize_str("info"),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeverityVisitor;

        impl<'de> Visitor<'de> for SeverityVisitor {
            type Value = Severity;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "severity string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SeverityVisitor)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    pub start: i32,
    pub end: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SecondarySourceLocation {
    pub file: Option<String>,
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub message: Option<String>,
}

mod display_from_str_opt {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::{fmt, str::FromStr};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: fmt::Display,
        S: Serializer,
    {
        if let Some(value) = value {
            serializer.collect_str(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        if let Some(s) = Option::<String>::deserialize(deserializer)? {
            s.parse().map_err(de::Error::custom).map(Some)
        } else {
            Ok(None)
        }
    }
}

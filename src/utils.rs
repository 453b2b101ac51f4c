//! Utility functions

use once_cell::sync::Lazy;
use regex::Regex;

/// A regex that matches the import path and identifier of a solidity import
/// statement with the named groups "path", "id".
pub static RE_SOL_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:(?:"(?P<path>[^;]*)"|'([^;]*)')(?:;|\s+as\s+(?P<id>[^;]*);)|.+from\s+(?:"(.*)"|'(.*)');)"#).unwrap()
});

/// Returns all path parts from any solidity import statement in a string,
/// `import "./contracts/Contract.sol";` -> `"./contracts/Contract.sol"`.
///
/// See also https://docs.soliditylang.org/en/v0.8.13/grammar.html
pub fn find_import_paths(contract: &str) -> Vec<&str> {
    RE_SOL_IMPORT
        .captures_iter(contract)
        .filter_map(|cap| cap.name("path"))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_find_import_paths() {
        let s = r##"//SPDX-License-Identifier: Unlicense
pragma solidity ^0.8.0;
import "hardhat/console.sol";
import "../contract/Contract.sol";
"##;
        assert_eq!(
            vec!["hardhat/console.sol", "../contract/Contract.sol"],
            find_import_paths(s)
        );
    }

    #[test]
    fn ignores_sources_without_imports() {
        let s = r##"pragma solidity ^0.8.0;
contract Plain {}
"##;
        assert!(find_import_paths(s).is_empty());
    }
}

//! Environment line parsing.

use gridci_core::{Error, Result};
use std::collections::BTreeMap;

/// Parse one environment declaration line.
///
/// A line is a whitespace-separated sequence of `KEY=VALUE` tokens.
/// Blank tokens are skipped, so repeated or trailing spaces are
/// harmless; a token without `=` (or with an empty key) is a format
/// error. Values may themselves contain `=`.
pub fn parse_env_line(line: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for token in line.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                vars.insert(key.to_string(), value.to_string());
            }
            _ => return Err(Error::EnvFormat(token.to_string())),
        }
    }
    Ok(vars)
}

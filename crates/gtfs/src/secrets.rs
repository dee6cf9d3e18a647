//! Feed credentials loaded from a YAML document.
//!
//! Each entry is either a bare string or a `{value, sha256}` mapping. When
//! a digest is present it is checked against the raw value before the entry
//! is accepted; stored values are trimmed after the check so that padding
//! introduced by copy-paste never reaches a request.

use std::collections::BTreeMap;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{GtfsError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSecret {
    Plain(String),
    Checked {
        value: String,
        sha256: Option<String>,
    },
}

/// Parse a YAML secrets document into a name -> value map.
pub fn parse_secrets(text: &str) -> Result<BTreeMap<String, String>> {
    let raw: BTreeMap<String, RawSecret> = serde_yaml_ng::from_str(text)?;
    let mut secrets = BTreeMap::new();
    for (name, entry) in raw {
        let (value, digest) = match entry {
            RawSecret::Plain(value) => (value, None),
            RawSecret::Checked { value, sha256 } => (value, sha256),
        };
        if let Some(expected) = digest {
            let actual = hex::encode(Sha256::digest(value.as_bytes()));
            if !actual.eq_ignore_ascii_case(&expected) {
                return Err(GtfsError::SecretIntegrity {
                    name,
                    expected,
                    actual,
                });
            }
        }
        secrets.insert(name, value.trim().to_string());
    }
    diagnostics::log_debug!("Loaded {count} secrets", count: secrets.len());
    Ok(secrets)
}

/// Read and parse a secrets file from disk.
pub fn load_secrets(path: &std::path::Path) -> Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    parse_secrets(&text)
}

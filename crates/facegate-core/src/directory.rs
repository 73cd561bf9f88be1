//! Registered-identity directory files.
//!
//! JSON files hold an array of identities; TOML files hold `[[identity]]`
//! tables. The format follows the file extension.

use crate::types::RegisteredIdentity;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Length of an identity number in digits.
pub const IDENTITY_NUMBER_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON directory: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML directory: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("identity number {0:?} is not {IDENTITY_NUMBER_LEN} digits")]
    BadIdentityNumber(String),
    #[error("duplicate identity number {0}")]
    DuplicateIdentityNumber(String),
    #[error("identity {0} has a blank display name")]
    BlankDisplayName(String),
    #[error("identity {0} has an empty or non-finite descriptor")]
    BadDescriptor(String),
    #[error("identity {number} descriptor has {actual} values, expected {expected}")]
    DescriptorLength {
        number: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Deserialize)]
struct TomlDirectory {
    #[serde(default)]
    identity: Vec<RegisteredIdentity>,
}

/// True for exactly twelve ASCII digits.
pub fn is_identity_number(s: &str) -> bool {
    s.len() == IDENTITY_NUMBER_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

/// Exact-string lookup by identity number.
pub fn find_by_number<'a>(
    identities: &'a [RegisteredIdentity],
    number: &str,
) -> Option<&'a RegisteredIdentity> {
    identities.iter().find(|i| i.identity_number == number)
}

/// Load and validate a directory file.
pub fn load_directory(path: &Path) -> Result<Vec<RegisteredIdentity>, DirectoryError> {
    let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let identities = if is_toml {
        parse_toml(&text)?
    } else {
        parse_json(&text)?
    };

    tracing::info!(
        path = %path.display(),
        count = identities.len(),
        "loaded identity directory"
    );
    Ok(identities)
}

pub fn parse_json(text: &str) -> Result<Vec<RegisteredIdentity>, DirectoryError> {
    let identities: Vec<RegisteredIdentity> = serde_json::from_str(text)?;
    validate(&identities)?;
    Ok(identities)
}

pub fn parse_toml(text: &str) -> Result<Vec<RegisteredIdentity>, DirectoryError> {
    let parsed: TomlDirectory = toml::from_str(text)?;
    validate(&parsed.identity)?;
    Ok(parsed.identity)
}

/// Check identity numbers, names and descriptor shape across the directory.
pub fn validate(identities: &[RegisteredIdentity]) -> Result<(), DirectoryError> {
    let mut seen = HashSet::new();
    let mut dimension: Option<usize> = None;

    for identity in identities {
        let number = &identity.identity_number;
        if !is_identity_number(number) {
            return Err(DirectoryError::BadIdentityNumber(number.clone()));
        }
        if !seen.insert(number.as_str()) {
            return Err(DirectoryError::DuplicateIdentityNumber(number.clone()));
        }
        if identity.display_name.trim().is_empty() {
            return Err(DirectoryError::BlankDisplayName(number.clone()));
        }

        let values = &identity.descriptor.values;
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return Err(DirectoryError::BadDescriptor(number.clone()));
        }
        let expected = *dimension.get_or_insert(values.len());
        if values.len() != expected {
            return Err(DirectoryError::DescriptorLength {
                number: number.clone(),
                expected,
                actual: values.len(),
            });
        }
    }

    Ok(())
}

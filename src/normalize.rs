use thiserror::Error;

use crate::extract::{AttributeLabel, RawAttributeMap};
use crate::output::AppRecord;

// Markers bounding the minimum version inside the Compatibility sentence.
const VERSION_PREFIX: &str = "Requires iOS ";
const VERSION_SUFFIX: &str = " or later.";

const LANGUAGE_SEPARATOR: &str = ", ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("page has no \"{0}\" attribute block")]
    MissingField(AttributeLabel),
    #[error("compatibility text lacks version markers: {0:?}")]
    MissingVersionMarkers(String),
}

/// Turn the raw attribute strings for one page into an app record.
/// Both Compatibility and Languages are required.
pub fn normalize(
    raw: &RawAttributeMap,
    name: &str,
    app_identifier: &str,
) -> Result<AppRecord, NormalizeError> {
    let compatibility = required(raw, AttributeLabel::Compatibility)?;
    let languages = required(raw, AttributeLabel::Languages)?;

    Ok(AppRecord {
        app_identifier: app_identifier.to_string(),
        name: name.to_string(),
        languages: split_languages(languages),
        minimum_version: minimum_version(compatibility)?,
    })
}

fn required(raw: &RawAttributeMap, label: AttributeLabel) -> Result<&str, NormalizeError> {
    raw.get(&label)
        .map(String::as_str)
        .ok_or(NormalizeError::MissingField(label))
}

/// Slice the version out of e.g. "Requires iOS 13.0 or later. Some
/// devices...". The version is whatever sits strictly between the prefix
/// and the last suffix after it; no numeric validation.
fn minimum_version(compatibility: &str) -> Result<String, NormalizeError> {
    let missing = || NormalizeError::MissingVersionMarkers(compatibility.to_string());
    let start = compatibility.find(VERSION_PREFIX).ok_or_else(missing)?;
    let rest = &compatibility[start + VERSION_PREFIX.len()..];
    let end = rest.rfind(VERSION_SUFFIX).ok_or_else(missing)?;
    Ok(rest[..end].to_string())
}

/// Source order is preserved; it matters for display, not filtering.
fn split_languages(languages: &str) -> Vec<String> {
    languages
        .split(LANGUAGE_SEPARATOR)
        .map(str::to_string)
        .collect()
}

// ── Tests ──

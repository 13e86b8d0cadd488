//! Resource target extraction from changed file paths.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Separator used by repository-relative paths.
pub const PATH_SEPARATOR: char = '/';

/// Default output file for the joined target list.
pub const DEFAULT_OUTPUT_FILE: &str = "targets.txt";

/// Target extraction failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// No path matched the configured markers.
    #[error("no targets found among {0} changed files")]
    NoTargetsFound(usize),
}

impl TargetError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TargetError::NoTargetsFound(_) => ErrorKind::Lookup,
        }
    }
}

/// How the identifier is picked out of a matching path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ExtractionRule {
    /// The component at a fixed index, regardless of where the markers sit.
    Positional {
        /// Zero-based component index.
        index: usize,
    },
    /// The component right after the marker sequence. Markers are located
    /// in order, each after the previous one, so marker-named directories
    /// nested inside a resource do not move the anchor. It must be a
    /// directory, i.e. followed by at least one more component.
    #[default]
    AfterMarker,
}

/// Rules controlling which paths match and what is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetRules {
    /// Segments that must all be present in a matching path.
    pub markers: Vec<String>,
    /// Prepended to every extracted identifier.
    pub namespace: Option<String>,
    /// Identifier selection rule.
    pub rule: ExtractionRule,
}

impl Default for TargetRules {
    fn default() -> Self {
        Self {
            markers: vec!["internal".to_string(), "resources".to_string()],
            namespace: None,
            rule: ExtractionRule::default(),
        }
    }
}

impl TargetRules {
    /// Rules for provider layouts that keep resources under `internal/services/`.
    pub fn services() -> Self {
        Self {
            markers: vec!["internal".to_string(), "services".to_string()],
            ..Self::default()
        }
    }
}

/// Extracts the resource identifier from a single path, if it matches.
pub fn extract_target(path: &str, rules: &TargetRules) -> Option<String> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();

    if !rules
        .markers
        .iter()
        .all(|marker| segments.contains(&marker.as_str()))
    {
        tracing::debug!("Path {path} lacks markers {:?}", rules.markers);
        return None;
    }

    let identifier = match rules.rule {
        ExtractionRule::Positional { index } => segments.get(index).copied(),
        ExtractionRule::AfterMarker => {
            let candidate = marker_anchor(&segments, &rules.markers)? + 1;
            // The final component is a file, not a resource directory.
            if candidate + 1 < segments.len() {
                segments.get(candidate).copied()
            } else {
                None
            }
        }
    };

    match identifier.filter(|id| !id.is_empty()) {
        Some(id) => {
            tracing::debug!("Path {path} yields target {id}");
            Some(match &rules.namespace {
                Some(ns) => format!("{ns}{id}"),
                None => id.to_string(),
            })
        }
        None => {
            tracing::warn!("Path {path} matches markers but has no identifier component");
            None
        }
    }
}

/// Position of the last marker when the markers are matched in order.
///
/// Falls back to the latest first occurrence when the path holds the
/// markers in a different order (`resources/internal/...`).
fn marker_anchor(segments: &[&str], markers: &[String]) -> Option<usize> {
    let mut start = 0;
    let mut anchor = None;

    for marker in markers {
        match segments[start..].iter().position(|s| *s == marker.as_str()) {
            Some(offset) => {
                anchor = Some(start + offset);
                start += offset + 1;
            }
            None => {
                return markers
                    .iter()
                    .filter_map(|m| segments.iter().position(|s| *s == m.as_str()))
                    .max();
            }
        }
    }
    anchor
}

/// Extracts deduplicated targets from `paths`, in first-seen order.
pub fn extract_targets<I, S>(paths: I, rules: &TargetRules) -> Result<Vec<String>, TargetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    let mut inspected = 0;

    for path in paths {
        inspected += 1;
        if let Some(target) = extract_target(path.as_ref(), rules) {
            if seen.insert(target.clone()) {
                targets.push(target);
            }
        }
    }

    if targets.is_empty() {
        return Err(TargetError::NoTargetsFound(inspected));
    }

    tracing::info!("Extracted {} targets from {inspected} paths", targets.len());
    Ok(targets)
}

/// Joins targets into the comma-separated output format.
pub fn join_targets(targets: &[String]) -> String {
    targets.join(",")
}

/// Writes the joined targets to `path` without a trailing newline.
pub fn write_targets<P: AsRef<Path>>(targets: &[String], path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, join_targets(targets))
        .with_context(|| format!("Failed to write targets file: {}", path.display()))
}

/// Reads one path per line, skipping blank lines.
pub fn parse_path_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

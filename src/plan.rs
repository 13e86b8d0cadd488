//! Duplicate resource name detection in Terraform plans.
//!
//! Reads the JSON produced by `terraform show -json <planfile>` and flags
//! planned resources of watched types that share a `name` attribute.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Resource types checked when no configuration overrides them.
pub const DEFAULT_WATCHED_TYPES: &[&str] = &[
    "jamfpro_account",
    "jamfpro_account_group",
    "jamfpro_advanced_computer_search",
    "jamfpro_advanced_mobile_device_search",
    "jamfpro_advanced_user_search",
    "jamfpro_allowed_file_extension",
    "jamfpro_api_integration",
    "jamfpro_api_role",
    "jamfpro_building",
    "jamfpro_category",
    "jamfpro_computer_checkin",
    "jamfpro_computer_extension_attribute",
    "jamfpro_computer_group",
    "jamfpro_computer_prestage",
    "jamfpro_department",
    "jamfpro_disk_encryption_configuration",
    "jamfpro_dock_item",
    "jamfpro_file_share_distribution_point",
    "jamfpro_site",
    "jamfpro_script",
    "jamfpro_network_segment",
    "jamfpro_package",
    "jamfpro_policy",
    "jamfpro_printer",
];

/// A name used by more than one planned resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    /// The shared `name` attribute.
    pub name: String,
    /// How many resources use it.
    pub count: usize,
}

impl fmt::Display for DuplicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{})", self.name, self.count)
    }
}

/// Plan check failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Watched resources share names.
    #[error("Duplicate resource names found: {}", join_duplicates(.0))]
    DuplicateNames(Vec<DuplicateName>),
}

impl PlanError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Format
    }
}

fn join_duplicates(duplicates: &[DuplicateName]) -> String {
    duplicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rules for the duplicate name check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanRules {
    /// Resource types whose names must be unique.
    pub watched_types: Vec<String>,
}

impl Default for PlanRules {
    fn default() -> Self {
        Self {
            watched_types: DEFAULT_WATCHED_TYPES
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }
}

/// The subset of `terraform show -json` output this check reads.
#[derive(Debug, Deserialize)]
pub struct TerraformPlan {
    /// Terraform version that produced the plan.
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Planned resource values.
    #[serde(default)]
    pub planned_values: Option<PlannedValues>,
}

/// Planned values section of a plan.
#[derive(Debug, Deserialize)]
pub struct PlannedValues {
    /// Root module of the configuration.
    pub root_module: PlanModule,
}

/// A module in the planned values tree.
#[derive(Debug, Default, Deserialize)]
pub struct PlanModule {
    /// Resources declared directly in this module.
    #[serde(default)]
    pub resources: Vec<PlannedResource>,
    /// Nested module calls.
    #[serde(default)]
    pub child_modules: Vec<PlanModule>,
}

/// A single planned resource.
#[derive(Debug, Deserialize)]
pub struct PlannedResource {
    /// Full resource address.
    pub address: String,
    /// Resource type, e.g. `jamfpro_policy`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Attribute values after apply.
    #[serde(default)]
    pub values: serde_json::Value,
}

impl PlannedResource {
    /// Returns the `name` attribute when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.values.get("name").and_then(serde_json::Value::as_str)
    }
}

impl TerraformPlan {
    /// Parses plan JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse Terraform plan JSON")
    }

    /// Reads and parses a plan JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid plan file: {}", path.display()))
    }

    /// Iterates over every planned resource in all modules.
    pub fn resources(&self) -> Vec<&PlannedResource> {
        let mut out = Vec::new();
        if let Some(values) = &self.planned_values {
            collect_resources(&values.root_module, &mut out);
        }
        out
    }
}

fn collect_resources<'a>(module: &'a PlanModule, out: &mut Vec<&'a PlannedResource>) {
    out.extend(module.resources.iter());
    for child in &module.child_modules {
        collect_resources(child, out);
    }
}

/// Fails when two watched resources share a name. Returns the number of
/// watched resources inspected on success.
pub fn check_duplicate_names(plan: &TerraformPlan, rules: &PlanRules) -> Result<usize, PlanError> {
    let watched: HashSet<&str> = rules.watched_types.iter().map(String::as_str).collect();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut inspected = 0;

    for resource in plan.resources() {
        if !watched.contains(resource.resource_type.as_str()) {
            continue;
        }
        match resource.name() {
            Some(name) => {
                inspected += 1;
                *counts.entry(name).or_default() += 1;
            }
            None => tracing::debug!("{} has no string name, skipping", resource.address),
        }
    }

    let duplicates: Vec<DuplicateName> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, count)| DuplicateName {
            name: name.to_string(),
            count,
        })
        .collect();

    if duplicates.is_empty() {
        tracing::info!("No duplicate names among {inspected} watched resources");
        Ok(inspected)
    } else {
        Err(PlanError::DuplicateNames(duplicates))
    }
}

//! # ci-gate
//!
//! CI gate checks for Terraform provider pull requests.
//!
//! ## Gates
//!
//! - `title`: conventional-commit validation of PR titles
//! - `targets`: resource targets touched by a pull request
//! - `plan duplicates`: duplicate resource names in a Terraform plan
//!
//! ## Quick Start
//!
//! ```rust
//! use ci_gate::title::{validate_title, TitleRules};
//!
//! let check = validate_title("feat: add widget", &TitleRules::default()).unwrap();
//! assert_eq!(check.prefix, "feat");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod github;
pub mod plan;
pub mod targets;
pub mod title;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::ErrorKind;

/// The current version of ci-gate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

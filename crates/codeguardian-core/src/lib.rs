//! Core types for the Code Guardian security scanner.
//!
//! This crate defines the analysis shape shared by the scanner library and
//! the CLI: severities, vulnerabilities, the complete analysis report, and
//! the JSON schema requested from the remote model.

mod analysis;
mod severity;

pub use analysis::{AnalysisParseError, SecurityAnalysis, Vulnerability, analysis_json_schema};
pub use severity::Severity;

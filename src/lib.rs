//! Vigil - local source-code security analysis engine
//!
//! This crate provides offline static analysis of source text to detect
//! security vulnerabilities. It combines a rule-based pattern scanner, an
//! intra-file taint tracker, and a cross-file module-graph analyzer, and
//! classifies every finding against CWE / OWASP Top 10 taxonomies.
//!
//! ## Features
//!
//! - Built-in rule catalog covering injection, secrets, crypto, and web issues
//! - Optional append-only rule files (TOML/JSON) for custom signatures
//! - Three-pass taint tracking from untrusted sources to dangerous sinks
//! - Workspace-wide export/import graph analysis with cycle detection
//! - Content-addressed result caching with configurable TTL
//! - Aggregate compliance reporting with a 0-100 score
//!
//! ## Usage
//!
//! ```rust
//! use vigil::application::use_cases::AnalyzeFileUseCase;
//! use vigil::config::EngineConfig;
//!
//! let engine = AnalyzeFileUseCase::with_config(&EngineConfig::default());
//! let findings = engine.execute("app.js", "eval(userInput);", "javascript");
//! assert!(!findings.is_empty());
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export key types for caller wiring
pub use application::reporting::build_report;
pub use application::use_cases::{
    merge_findings, AnalyzeFileUseCase, AnalyzeWorkspaceUseCase, ExternalAnalysis,
    ExternalAnalysisError, WorkspaceScanResult,
};
pub use config::EngineConfig;
pub use domain::finding::{Finding, Severity};

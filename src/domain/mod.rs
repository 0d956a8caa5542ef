//! Domain types for the analysis engine

pub mod classification;
pub mod finding;
pub mod language;
pub mod module_info;
pub mod rule;

pub use classification::{ClassificationEntry, ClassificationReport};
pub use finding::{
    CrossFileIssueKind, CrossFileVulnerability, Finding, FlowOperation, FlowStep, Severity,
    SinkKind, SourceKind, TaintVulnerability,
};
pub use language::Language;
pub use module_info::{ImportEntry, ModuleInfo};
pub use rule::Rule;

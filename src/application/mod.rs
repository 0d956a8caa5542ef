//! Application layer: use cases and reporting over the analysis infrastructure

pub mod reporting;
pub mod use_cases;

pub use reporting::{build_report, classify_category};
pub use use_cases::{
    merge_findings, AnalyzeFileUseCase, AnalyzeWorkspaceUseCase, ExternalAnalysis,
    ExternalAnalysisError, ScanStats, WorkspaceScanResult,
};

//! Analysis infrastructure: scanners, taint tracking, graph analysis, cache

pub mod cache;
pub mod cross_file;
pub mod pattern_scanner;
pub mod rules;
pub mod taint;

pub use cache::ResultCache;
pub use cross_file::analyze_workspace;
pub use pattern_scanner::{scan_document, scan_document_with};
pub use rules::RuleCatalog;
pub use taint::analyze_taint;

//! Per-file module surface for cross-file analysis

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::language::Language;

/// One import statement in a module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEntry {
    /// Raw source specifier as written (e.g. "./db", "os.path")
    pub specifier: String,
    /// Named symbols pulled in; empty for bare/namespace imports
    pub names: Vec<String>,
    /// Line of the import statement, 1-based
    pub line: u32,
    /// Workspace-relative path of the resolved target, if it resolved
    /// against the parsed file set. External packages stay unresolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

/// Export/import surface of one scanned file
///
/// Lifetime is a single analysis pass over a file set; instances are held
/// in a map keyed by normalized relative path and discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Normalized workspace-relative path
    pub path: String,
    pub language: Language,
    pub exports: BTreeSet<String>,
    /// Ordered as encountered top-to-bottom
    pub imports: Vec<ImportEntry>,
    /// Exports whose body uses a dangerous operation without any
    /// accompanying validation call
    pub vulnerable_exports: BTreeSet<String>,
    /// Whether this file looks like an HTTP API surface (path or content
    /// heuristic), used by the exposed-API detection rule
    pub is_api_route: bool,
}

impl ModuleInfo {
    pub fn new(path: String, language: Language) -> Self {
        Self {
            path,
            language,
            exports: BTreeSet::new(),
            imports: Vec::new(),
            vulnerable_exports: BTreeSet::new(),
            is_api_route: false,
        }
    }
}

//! Cross-file module-graph analysis
//!
//! Builds a whole-workspace map of per-file export/import surfaces, links
//! imports to parsed files, and flags three classes of issue: imports of
//! vulnerable exports, API-route files importing vulnerable modules, and
//! circular dependencies. Unresolved imports, unreadable files, and files
//! with no recognizable surface are skipped silently; they contribute no
//! edges.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::domain::finding::{CrossFileIssueKind, CrossFileVulnerability, Severity};
use crate::domain::language::Language;
use crate::domain::module_info::{ImportEntry, ModuleInfo};

static JS_EXPORT_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:async\s+)?(?:function|class|const|let|var)\s+([A-Za-z_$][\w$]*)")
        .expect("valid regex")
});
static JS_EXPORT_BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export\s*\{([^}]*)\}").expect("valid regex"));
static JS_EXPORTS_ASSIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=").expect("valid regex")
});
static JS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"import\s+(?:\{([^}]*)\}|\*\s+as\s+([A-Za-z_$][\w$]*)|([A-Za-z_$][\w$]*))\s+from\s+['"]([^'"]+)['"]"#,
    )
    .expect("valid regex")
});
static JS_REQUIRE_DESTRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:const|let|var)\s*\{([^}]*)\}\s*=\s*require\s*\(\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});
static JS_REQUIRE_BARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex")
});

static PY_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:def|class)\s+([A-Za-z][\w]*)").expect("valid regex"));
static PY_FROM_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+([\w.]+)\s+import\s+(.+)$").expect("valid regex"));
static PY_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+([\w.]+)").expect("valid regex"));

static CS_PUBLIC_MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public|protected)\s+(?:static\s+)?(?:async\s+)?[\w<>\[\]]+\s+([A-Za-z_]\w*)\s*\(")
        .expect("valid regex")
});
static CS_PUBLIC_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"public\s+(?:sealed\s+|abstract\s+|partial\s+)?(?:class|interface|record|struct)\s+([A-Za-z_]\w*)")
        .expect("valid regex")
});
static CS_USING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*using\s+([\w.]+)\s*;").expect("valid regex"));

/// Dangerous operations inside an export body
static DANGEROUS_OP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:execute|query|eval|exec)\s*\(|innerHTML|document\.write|(?i:select|insert|update|delete)\s+(?i:from|into|set)\b|Process\.Start|spawn\s*\(|system\s*\(")
        .expect("valid regex")
});

/// Validation/sanitization calls that clear the vulnerable-export flag
static VALIDATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)validat|sanitiz|escap|check|verif|isvalid|encod|try_?parse")
        .expect("valid regex")
});

/// HTTP handler registration shapes, for the API-route heuristic
static API_HANDLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.(?:get|post|put|delete|patch)\s*\(\s*['"]|@app\.route|@(?:Get|Post|Put|Delete)Mapping|\[Http(?:Get|Post|Put|Delete)\]"#)
        .expect("valid regex")
});

const RESOLVE_EXTENSIONS: &[&str] = &["js", "ts", "jsx", "tsx", "mjs", "py", "cs"];

/// Analyze a workspace's (path, content) pairs as one module graph
#[instrument(skip(files), fields(file_count = files.len()))]
pub fn analyze_workspace(files: &[(String, String)]) -> Vec<CrossFileVulnerability> {
    let modules = build_module_map(files);
    let mut findings = Vec::new();

    detect_insecure_export_usage(&modules, &mut findings);
    detect_exposed_api_routes(&modules, &mut findings);
    detect_circular_dependencies(&modules, &mut findings);

    debug!(
        module_count = modules.len(),
        finding_count = findings.len(),
        "Cross-file analysis completed"
    );
    findings
}

/// Parse every file, then resolve import edges against the parsed set
fn build_module_map(files: &[(String, String)]) -> BTreeMap<String, ModuleInfo> {
    let mut modules: BTreeMap<String, ModuleInfo> = BTreeMap::new();

    for (path, content) in files {
        let normalized = normalize_path(path);
        let Some(language) = Language::from_filename(&normalized) else {
            trace!(file = %normalized, "No language mapping; skipping");
            continue;
        };
        let info = parse_module(&normalized, content, language);
        modules.insert(normalized, info);
    }

    // Resolution runs after all files are parsed so edges can point anywhere
    // in the set regardless of input order.
    let known: HashSet<String> = modules.keys().cloned().collect();
    for info in modules.values_mut() {
        let importer_dir = parent_dir(&info.path);
        for import in &mut info.imports {
            import.resolved = resolve_specifier(&import.specifier, &importer_dir, &known);
        }
    }

    modules
}

fn parse_module(path: &str, content: &str, language: Language) -> ModuleInfo {
    let mut info = ModuleInfo::new(path.to_string(), language);

    match language {
        Language::JavaScript | Language::TypeScript => parse_js(content, &mut info),
        Language::Python => parse_python(content, &mut info),
        Language::CSharp | Language::Java => parse_csharp_family(content, &mut info),
        _ => {}
    }

    detect_vulnerable_exports(content, &mut info);
    info.is_api_route = path_is_api_route(path) || API_HANDLER_RE.is_match(content);
    info
}

fn parse_js(content: &str, info: &mut ModuleInfo) {
    for (idx, line) in content.lines().enumerate() {
        let line_no = (idx + 1) as u32;

        if let Some(caps) = JS_EXPORT_DECL_RE.captures(line) {
            info.exports.insert(caps[1].to_string());
        }
        if let Some(caps) = JS_EXPORT_BRACE_RE.captures(line) {
            for name in split_names(&caps[1]) {
                info.exports.insert(name);
            }
        }
        if let Some(caps) = JS_EXPORTS_ASSIGN_RE.captures(line) {
            info.exports.insert(caps[1].to_string());
        }

        if let Some(caps) = JS_IMPORT_RE.captures(line) {
            let names = caps
                .get(1)
                .map(|m| split_names(m.as_str()))
                .or_else(|| caps.get(3).map(|m| vec![m.as_str().to_string()]))
                .unwrap_or_default();
            info.imports.push(ImportEntry {
                specifier: caps[4].to_string(),
                names,
                line: line_no,
                resolved: None,
            });
        } else if let Some(caps) = JS_REQUIRE_DESTRUCTURE_RE.captures(line) {
            info.imports.push(ImportEntry {
                specifier: caps[2].to_string(),
                names: split_names(&caps[1]),
                line: line_no,
                resolved: None,
            });
        } else if let Some(caps) = JS_REQUIRE_BARE_RE.captures(line) {
            info.imports.push(ImportEntry {
                specifier: caps[1].to_string(),
                names: Vec::new(),
                line: line_no,
                resolved: None,
            });
        }
    }
}

fn parse_python(content: &str, info: &mut ModuleInfo) {
    for (idx, line) in content.lines().enumerate() {
        let line_no = (idx + 1) as u32;

        // Top-level, non-underscore definitions only
        if let Some(caps) = PY_DEF_RE.captures(line) {
            info.exports.insert(caps[1].to_string());
        }

        if let Some(caps) = PY_FROM_IMPORT_RE.captures(line) {
            info.imports.push(ImportEntry {
                specifier: caps[1].to_string(),
                names: split_names(&caps[2]),
                line: line_no,
                resolved: None,
            });
        } else if let Some(caps) = PY_IMPORT_RE.captures(line) {
            info.imports.push(ImportEntry {
                specifier: caps[1].to_string(),
                names: Vec::new(),
                line: line_no,
                resolved: None,
            });
        }
    }
}

fn parse_csharp_family(content: &str, info: &mut ModuleInfo) {
    for (idx, line) in content.lines().enumerate() {
        let line_no = (idx + 1) as u32;

        if let Some(caps) = CS_PUBLIC_TYPE_RE.captures(line) {
            info.exports.insert(caps[1].to_string());
        } else if let Some(caps) = CS_PUBLIC_MEMBER_RE.captures(line) {
            info.exports.insert(caps[1].to_string());
        }

        if let Some(caps) = CS_USING_RE.captures(line) {
            info.imports.push(ImportEntry {
                specifier: caps[1].to_string(),
                names: Vec::new(),
                line: line_no,
                resolved: None,
            });
        }
    }
}

/// Flag exports whose definition body uses a dangerous operation with no
/// validation call anywhere in the same body.
fn detect_vulnerable_exports(content: &str, info: &mut ModuleInfo) {
    let lines: Vec<&str> = content.lines().collect();
    let exports: Vec<String> = info.exports.iter().cloned().collect();

    for symbol in exports {
        let Some(body) = locate_definition_body(&lines, &symbol) else {
            continue;
        };
        if DANGEROUS_OP_RE.is_match(&body) && !VALIDATION_RE.is_match(&body) {
            trace!(symbol = %symbol, file = %info.path, "Vulnerable export");
            info.vulnerable_exports.insert(symbol);
        }
    }
}

/// Textual body location: from the symbol's definition line to the next
/// definition-looking line (or end of file).
fn locate_definition_body(lines: &[&str], symbol: &str) -> Option<String> {
    let def_re = Regex::new(&format!(
        r"(?:function\s+{name}\b|def\s+{name}\b|class\s+{name}\b|(?:const|let|var)\s+{name}\s*=|[\w<>\[\]]+\s+{name}\s*\()",
        name = regex::escape(symbol)
    ))
    .ok()?;
    let any_def_re =
        Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?(?:function|def|class|public|private)\b")
            .expect("valid regex");

    let start = lines.iter().position(|l| def_re.is_match(l))?;
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| any_def_re.is_match(l))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    Some(lines[start..end].join("\n"))
}

/// Rule 1: importer pulls in a symbol listed in the target's vulnerable
/// exports, one finding per (importer, symbol) pair.
fn detect_insecure_export_usage(
    modules: &BTreeMap<String, ModuleInfo>,
    findings: &mut Vec<CrossFileVulnerability>,
) {
    for info in modules.values() {
        for import in &info.imports {
            let Some(target_path) = &import.resolved else {
                continue;
            };
            let Some(target) = modules.get(target_path) else {
                continue;
            };
            for name in &import.names {
                if target.vulnerable_exports.contains(name) {
                    findings.push(CrossFileVulnerability {
                        kind: CrossFileIssueKind::InsecureExportUsage,
                        source_file: info.path.clone(),
                        target_file: Some(target.path.clone()),
                        symbol: Some(name.clone()),
                        cycle: Vec::new(),
                        line: import.line,
                        severity: Severity::High,
                        message: format!(
                            "'{}' imports '{}' from {}, which uses a dangerous operation without validation",
                            info.path, name, target.path
                        ),
                    });
                }
            }
        }
    }
}

/// Rule 2: an API-route file imports from a module with at least one
/// vulnerable export. Independent of rule 1.
fn detect_exposed_api_routes(
    modules: &BTreeMap<String, ModuleInfo>,
    findings: &mut Vec<CrossFileVulnerability>,
) {
    for info in modules.values() {
        if !info.is_api_route {
            continue;
        }
        for import in &info.imports {
            let Some(target_path) = &import.resolved else {
                continue;
            };
            let Some(target) = modules.get(target_path) else {
                continue;
            };
            if target.vulnerable_exports.is_empty() {
                continue;
            }
            findings.push(CrossFileVulnerability {
                kind: CrossFileIssueKind::ExposedApiRoute,
                source_file: info.path.clone(),
                target_file: Some(target.path.clone()),
                symbol: None,
                cycle: Vec::new(),
                line: import.line,
                severity: Severity::High,
                message: format!(
                    "API route '{}' imports from '{}', which exposes unvalidated dangerous operations",
                    info.path, target.path
                ),
            });
        }
    }
}

/// Rule 3: circular dependencies, one finding per file where a cycle is
/// first detected during traversal from that file. Every cycle member
/// therefore gets its own finding naming the cycle; deduplication is a
/// candidate product decision, flagged in the test suite, not applied here.
fn detect_circular_dependencies(
    modules: &BTreeMap<String, ModuleInfo>,
    findings: &mut Vec<CrossFileVulnerability>,
) {
    for start in modules.keys() {
        if let Some(cycle) = first_cycle_from(start, modules) {
            findings.push(CrossFileVulnerability {
                kind: CrossFileIssueKind::CircularDependency,
                source_file: start.clone(),
                target_file: None,
                symbol: None,
                line: 1,
                severity: Severity::Medium,
                message: format!("Circular dependency: {}", cycle.join(" -> ")),
                cycle,
            });
        }
    }
}

/// Explicit-stack depth-first traversal; returns the cycle suffix starting
/// at the repeated node, the first time any cycle is seen from `start`.
fn first_cycle_from(start: &str, modules: &BTreeMap<String, ModuleInfo>) -> Option<Vec<String>> {
    // Each frame is (node, index of the next edge to follow).
    let mut stack: Vec<(String, usize)> = vec![(start.to_string(), 0)];
    let mut path: Vec<String> = vec![start.to_string()];
    let mut on_path: HashSet<String> = HashSet::from([start.to_string()]);
    let mut visited: HashSet<String> = HashSet::new();

    while let Some((node, edge_idx)) = stack.last().cloned() {
        let edges = resolved_edges(modules.get(&node));

        if edge_idx >= edges.len() {
            stack.pop();
            on_path.remove(&node);
            path.pop();
            visited.insert(node);
            continue;
        }
        stack.last_mut().expect("frame present").1 += 1;

        let next = &edges[edge_idx];
        if on_path.contains(next) {
            let repeat_at = path.iter().position(|p| p == next).expect("on path");
            return Some(path[repeat_at..].to_vec());
        }
        if visited.contains(next) {
            continue;
        }
        stack.push((next.clone(), 0));
        path.push(next.clone());
        on_path.insert(next.clone());
    }

    None
}

fn resolved_edges(info: Option<&ModuleInfo>) -> Vec<String> {
    info.map(|m| {
        m.imports
            .iter()
            .filter_map(|i| i.resolved.clone())
            .collect()
    })
    .unwrap_or_default()
}

fn path_is_api_route(path: &str) -> bool {
    let lower = path.to_lowercase();
    ["api", "routes", "endpoints", "controllers"]
        .iter()
        .any(|marker| lower.split('/').any(|seg| seg.contains(marker)))
}

/// Resolve a relative or module-style specifier against the parsed set,
/// trying known extensions and index.<ext> fallbacks.
fn resolve_specifier(
    specifier: &str,
    importer_dir: &str,
    known: &HashSet<String>,
) -> Option<String> {
    let mut bases = Vec::new();

    if specifier.starts_with("./") || specifier.starts_with("../") {
        bases.push(join_normalized(importer_dir, specifier));
    } else if specifier.contains('.') && !specifier.contains('/') {
        // Python/C# style dotted module path, tried from the importer's
        // directory and from the workspace root
        let as_path = specifier.replace('.', "/");
        bases.push(join_normalized(importer_dir, &as_path));
        bases.push(as_path);
    } else if !specifier.contains('/') {
        bases.push(join_normalized(importer_dir, specifier));
        bases.push(specifier.to_string());
    } else {
        // Bare path with slashes: workspace-relative package paths stay
        // unresolved unless they literally match a parsed file
        bases.push(specifier.to_string());
    }

    for base in bases {
        if known.contains(&base) {
            return Some(base);
        }
        for ext in RESOLVE_EXTENSIONS {
            let candidate = format!("{}.{}", base, ext);
            if known.contains(&candidate) {
                return Some(candidate);
            }
            let index_candidate = format!("{}/index.{}", base, ext);
            if known.contains(&index_candidate) {
                return Some(index_candidate);
            }
        }
    }

    None
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|n| {
            // strip "as" aliases and whitespace
            n.split_whitespace().next().unwrap_or("").to_string()
        })
        .filter(|n| !n.is_empty() && n != "*")
        .collect()
}

fn normalize_path(path: &str) -> String {
    let cleaned = path.replace('\\', "/");
    let cleaned = cleaned.strip_prefix("./").unwrap_or(&cleaned);
    cleaned.trim_start_matches('/').to_string()
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Join and normalize `.` / `..` segments without touching the filesystem
fn join_normalized(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

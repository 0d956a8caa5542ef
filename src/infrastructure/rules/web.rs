//! File handling, deserialization, and web configuration rules

use crate::domain::finding::Severity;
use crate::domain::rule::Rule;

/// Concatenated path fed to a file-access call
pub fn path_concat_file_access_rule() -> Rule {
    Rule::new(
        "path-concat-file-access",
        r#"(?:readFile(?:Sync)?|writeFile(?:Sync)?|createReadStream|sendFile|fopen)\s*\([^)\n]*\+"#,
        "File accessed through a concatenated path",
        Severity::High,
        "Path Traversal",
        "CWE-22",
        "Resolve the path against a fixed base directory and reject '..' segments.",
    )
}

/// Deserialization of untrusted-format payloads
pub fn insecure_deserialization_rule() -> Rule {
    Rule::new(
        "insecure-deserialization",
        r#"pickle\.loads?\s*\(|yaml\.load\s*\(|unserialize\s*\(|ObjectInputStream|Marshal\.load|BinaryFormatter"#,
        "Deserialization API that can execute attacker-controlled object graphs",
        Severity::High,
        "Insecure Deserialization",
        "CWE-502",
        "Deserialize with a data-only format (JSON) or a safe loader (yaml.safe_load).",
    )
}

/// Redirect target taken from the request
pub fn open_redirect_rule() -> Rule {
    Rule::new(
        "open-redirect",
        r#"(?i)(?:redirect|sendRedirect)\s*\([^)\n]*(?:req\.|request\.|\$_GET|params\b)"#,
        "Redirect target derived from request input",
        Severity::Medium,
        "Open Redirect",
        "CWE-601",
        "Map request values to an allowlist of known redirect destinations.",
    )
}

/// Wildcard CORS origin
pub fn cors_wildcard_rule() -> Rule {
    Rule::new(
        "cors-wildcard",
        r#"(?i)Access-Control-Allow-Origin['"]?\s*[,:=]\s*['"]\*"#,
        "CORS configured with a wildcard origin",
        Severity::Medium,
        "Permissive CORS",
        "CWE-942",
        "Echo only explicitly allowlisted origins in Access-Control-Allow-Origin.",
    )
}

/// Framework debug switch left on
pub fn debug_enabled_rule() -> Rule {
    Rule::new(
        "debug-enabled",
        r#"(?i)\bdebug\s*=\s*true\b"#,
        "Debug mode enabled; stack traces and internals may be exposed",
        Severity::Medium,
        "Debug Exposure",
        "CWE-489",
        "Disable debug mode outside local development builds.",
    )
}

/// XML parser configurations prone to external entity expansion
pub fn xxe_parser_rule() -> Rule {
    Rule::new(
        "xxe-parser",
        r#"libxml_disable_entity_loader\s*\(\s*false|resolve_entities\s*=\s*True|DocumentBuilderFactory\.newInstance|XMLInputFactory\.newInstance"#,
        "XML parser may resolve external entities",
        Severity::Medium,
        "XML External Entities",
        "CWE-611",
        "Disable DTDs and external entity resolution on the parser factory.",
    )
}

pub fn get_web_rules() -> Vec<Rule> {
    vec![
        path_concat_file_access_rule(),
        insecure_deserialization_rule(),
        open_redirect_rule(),
        cors_wildcard_rule(),
        debug_enabled_rule(),
        xxe_parser_rule(),
    ]
}

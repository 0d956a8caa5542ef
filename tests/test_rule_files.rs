//! Integration tests for user rule files wired through engine configuration

use std::io::Write;

use vigil::{AnalyzeFileUseCase, EngineConfig, Severity};

fn engine_with_rules(body: &str, suffix: &str) -> (AnalyzeFileUseCase, tempfile::NamedTempFile) {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{body}").unwrap();
    let config = EngineConfig {
        rule_file_path: Some(file.path().to_path_buf()),
        ..EngineConfig::default()
    };
    (AnalyzeFileUseCase::with_config(&config), file)
}

#[test]
fn toml_rule_file_extends_the_catalog() {
    let (engine, _file) = engine_with_rules(
        r#"
[[rules]]
id = "internal-endpoint"
pattern = "corp-internal\\.example"
message = "Internal endpoint referenced in source"
severity = "high"
category = "Debug Exposure"
cwe_id = "CWE-489"
remediation = "Route through the public gateway."
"#,
        ".toml",
    );

    let findings = engine.execute(
        "client.js",
        "fetch('https://corp-internal.example/v1/users');\n",
        "javascript",
    );
    let custom: Vec<_> = findings
        .iter()
        .filter(|f| f.message.contains("Internal endpoint"))
        .collect();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].severity, Severity::High);
    assert_eq!(custom[0].cwe_id, "CWE-489");
}

#[test]
fn json_rule_file_is_accepted() {
    let (engine, _file) = engine_with_rules(
        r#"{
  "rules": [
    {
      "id": "legacy-api",
      "pattern": "legacyApi\\.",
      "message": "Legacy API usage",
      "category": "Debug Exposure",
      "cwe_id": "CWE-489"
    }
  ]
}"#,
        ".json",
    );

    let findings = engine.execute("app.js", "legacyApi.call();\n", "javascript");
    assert!(findings.iter().any(|f| f.message == "Legacy API usage"));
    // severity omitted in the file defaults to medium
    assert!(findings
        .iter()
        .filter(|f| f.message == "Legacy API usage")
        .all(|f| f.severity == Severity::Medium));
}

#[test]
fn builtin_rules_still_apply_with_a_rule_file() {
    let (engine, _file) = engine_with_rules(
        r#"
[[rules]]
id = "noop-rule"
pattern = "zzz-never-matches-zzz"
message = "never fires"
category = "Debug Exposure"
cwe_id = "CWE-489"
"#,
        ".toml",
    );

    let findings = engine.execute("app.js", "eval(userInput);\n", "javascript");
    assert!(findings.iter().any(|f| f.category == "Code Injection"));
}

#[test]
fn missing_rule_file_degrades_to_builtin_catalog() {
    let config = EngineConfig {
        rule_file_path: Some("/nonexistent/rules.toml".into()),
        ..EngineConfig::default()
    };
    let engine = AnalyzeFileUseCase::with_config(&config);

    let findings = engine.execute("app.js", "eval(userInput);\n", "javascript");
    assert!(!findings.is_empty());
}

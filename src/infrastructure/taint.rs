//! Intra-file taint tracking
//!
//! Three strictly ordered passes over a file's lines:
//!
//! 1. Source identification: assignments whose right-hand side reads an
//!    untrusted input mark the assigned name as tainted.
//! 2. Flow propagation: assignments referencing a tainted name taint the
//!    new name; calls taking a tainted argument extend its flow trail.
//! 3. Sink detection: lines matching a sink family while referencing a
//!    tainted name produce a vulnerability with the full flow trail.
//!
//! The analysis is purely textual and intraprocedural: it does not model
//! control flow, scoping, or function boundaries, and a name collision
//! across unrelated scopes will propagate taint. That trade-off is
//! accepted in exchange for speed and language independence.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::domain::finding::{
    FlowOperation, FlowStep, Severity, SinkKind, SourceKind, TaintVulnerability,
};

/// `name = expression`, with optional declaration keyword or type prefix
static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:var|let|const)\s+)?(?:[A-Za-z_][\w<>\[\],\s]*\s+)?([A-Za-z_$][\w$]*)\s*=\s*([^=].*)$")
        .expect("valid assignment regex")
});

/// Untrusted-input source patterns, grouped by the kind they introduce
static SOURCE_PATTERNS: Lazy<Vec<(SourceKind, Regex)>> = Lazy::new(|| {
    let compile = |p: &str| Regex::new(p).expect("valid source pattern");
    vec![
        (
            SourceKind::UserInput,
            compile(r"req\.(?:body|query|params|cookies|headers)|request\.(?:GET|POST|form|args|values|json|params)|\$_(?:GET|POST|REQUEST|COOKIE)"),
        ),
        (
            SourceKind::UserInput,
            compile(r"\binput\s*\(|\bprompt\s*\(|readline|stdin|new\s+Scanner\s*\(|process\.argv|sys\.argv"),
        ),
        (
            SourceKind::External,
            compile(r"process\.env|os\.environ|\bgetenv\s*\("),
        ),
        (
            SourceKind::File,
            compile(r"readFile(?:Sync)?\s*\(|fs\.read|\bopen\s*\([^)]*\)\s*\.read|File\.ReadAll"),
        ),
        (
            SourceKind::Network,
            compile(r"\bfetch\s*\(|axios\.(?:get|post|request)|requests\.(?:get|post)|http\.get|urlopen\s*\(|\.recv\s*\("),
        ),
    ]
});

/// Dangerous sink patterns, one set per family
static SINK_PATTERNS: Lazy<Vec<(SinkKind, Regex)>> = Lazy::new(|| {
    let compile = |p: &str| Regex::new(p).expect("valid sink pattern");
    vec![
        (
            SinkKind::Sql,
            compile(r"(?:query|execute|executeQuery|executemany|raw)\s*\(|cursor\.execute"),
        ),
        (
            SinkKind::Command,
            compile(r"(?:execSync|spawnSync|spawn|system|popen|shell_exec|passthru)\s*\(|subprocess\.(?:call|run|Popen)|child_process\.exec|Runtime\.getRuntime\(\)\.exec"),
        ),
        (
            SinkKind::Eval,
            compile(r"\beval\s*\(|new\s+Function\s*\(|\bexec\s*\("),
        ),
        (
            SinkKind::File,
            compile(r"(?:readFile(?:Sync)?|writeFile(?:Sync)?|createReadStream|createWriteStream|sendFile|fopen|unlink)\s*\("),
        ),
        (
            SinkKind::Xss,
            compile(r"innerHTML|outerHTML|document\.write|dangerouslySetInnerHTML|res\.send\s*\(|\.html\s*\("),
        ),
    ]
});

/// A variable currently carrying taint
#[derive(Debug, Clone)]
struct TaintedVariable {
    origin_line: u32,
    source: SourceKind,
    flow: Vec<FlowStep>,
}

/// Run all three passes over one file's text
pub fn analyze_taint(file: &str, text: &str) -> Vec<TaintVulnerability> {
    let lines: Vec<&str> = text.lines().collect();

    // BTreeMap keeps per-line iteration deterministic across runs.
    let mut tainted: BTreeMap<String, TaintedVariable> = BTreeMap::new();

    identify_sources(&lines, &mut tainted);
    propagate_flows(&lines, &mut tainted);
    let vulnerabilities = detect_sinks(&lines, &tainted);

    debug!(
        file,
        tainted_variables = tainted.len(),
        vulnerability_count = vulnerabilities.len(),
        "Taint analysis completed"
    );
    vulnerabilities
}

/// Pass 1: mark assignments reading an untrusted source
fn identify_sources(lines: &[&str], tainted: &mut BTreeMap<String, TaintedVariable>) {
    for (idx, line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let Some(caps) = ASSIGNMENT_RE.captures(line) else {
            continue;
        };
        let name = &caps[1];
        let rhs = &caps[2];

        for (kind, pattern) in SOURCE_PATTERNS.iter() {
            if pattern.is_match(rhs) {
                trace!(variable = name, source = %kind, line = line_no, "Taint source");
                tainted.insert(
                    name.to_string(),
                    TaintedVariable {
                        origin_line: line_no,
                        source: *kind,
                        flow: vec![FlowStep {
                            line: line_no,
                            operation: FlowOperation::Assignment,
                            sink: None,
                        }],
                    },
                );
                break;
            }
        }
    }
}

/// Pass 2: propagate taint through assignments and record call steps
fn propagate_flows(lines: &[&str], tainted: &mut BTreeMap<String, TaintedVariable>) {
    for (idx, line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;

        if let Some(caps) = ASSIGNMENT_RE.captures(line) {
            let name = caps[1].to_string();
            let rhs = caps[2].to_string();

            // First tainted name referenced on the right-hand side wins;
            // BTreeMap order makes the choice deterministic.
            let parent = tainted
                .iter()
                .find(|(existing, var)| {
                    var.origin_line < line_no && references_name(&rhs, existing)
                })
                .map(|(_, var)| var.clone());

            if let Some(parent) = parent {
                let operation = if rhs.contains('+') || has_interpolation(&rhs) {
                    FlowOperation::Concatenation
                } else {
                    FlowOperation::Assignment
                };
                let mut flow = parent.flow.clone();
                flow.push(FlowStep {
                    line: line_no,
                    operation,
                    sink: None,
                });
                tainted.insert(
                    name,
                    TaintedVariable {
                        origin_line: parent.origin_line,
                        source: parent.source,
                        flow,
                    },
                );
            }
        }

        // Function calls taking a tainted argument extend the existing
        // record; no new variable is created.
        let called: Vec<String> = tainted
            .iter()
            .filter(|(name, var)| var.origin_line < line_no && is_call_argument(line, name))
            .map(|(name, _)| name.clone())
            .collect();
        for name in called {
            if let Some(var) = tainted.get_mut(&name) {
                var.flow.push(FlowStep {
                    line: line_no,
                    operation: FlowOperation::FunctionCall,
                    sink: None,
                });
            }
        }
    }
}

/// Pass 3: flag sink lines referencing a tainted variable
fn detect_sinks(lines: &[&str], tainted: &BTreeMap<String, TaintedVariable>) -> Vec<TaintVulnerability> {
    let mut vulnerabilities = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;

        for (sink, pattern) in SINK_PATTERNS.iter() {
            if !pattern.is_match(line) {
                continue;
            }
            for (name, var) in tainted.iter() {
                // Data cannot flow backward: the variable must be tainted
                // at or before the sink line.
                if var.origin_line > line_no {
                    continue;
                }
                if !references_name(line, name) {
                    continue;
                }
                let severity = taint_severity(var.source, *sink);
                // Steps recorded past the sink line belong to later uses of
                // the variable, not to this flow.
                let mut flow: Vec<FlowStep> = var
                    .flow
                    .iter()
                    .filter(|step| step.line <= line_no)
                    .cloned()
                    .collect();
                flow.push(FlowStep {
                    line: line_no,
                    operation: FlowOperation::FunctionCall,
                    sink: Some(*sink),
                });
                vulnerabilities.push(TaintVulnerability {
                    variable: name.clone(),
                    source: var.source,
                    sink: *sink,
                    line: line_no,
                    severity,
                    message: format!(
                        "{} data in '{}' (line {}) reaches a {} sink",
                        var.source, name, var.origin_line, sink
                    ),
                    flow,
                });
            }
        }
    }

    vulnerabilities
}

/// Severity of a source kind reaching a sink family. The matrix is a
/// design decision, not incidental.
fn taint_severity(source: SourceKind, sink: SinkKind) -> Severity {
    match (source, sink) {
        (SourceKind::UserInput, SinkKind::Sql | SinkKind::Command | SinkKind::Eval) => {
            Severity::Critical
        }
        (SourceKind::Network, SinkKind::Command | SinkKind::Eval) => Severity::High,
        (_, SinkKind::Xss) => Severity::High,
        _ => Severity::Medium,
    }
}

/// Word-boundary, case-sensitive reference check
fn references_name(text: &str, name: &str) -> bool {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(name) {
        let abs = start + pos;
        let before_ok = abs == 0 || !is_word_byte(bytes[abs - 1]);
        let end = abs + name.len();
        let after_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        start = abs + 1;
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `name` appears as an argument of some call on the line
fn is_call_argument(line: &str, name: &str) -> bool {
    let Some(open) = line.find('(') else {
        return false;
    };
    references_name(&line[open..], name)
}

/// Template interpolation markers across supported languages
fn has_interpolation(expr: &str) -> bool {
    expr.contains("${") || expr.contains("#{") || expr.contains("f\"") || expr.contains("f'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_source_to_eval_is_critical() {
        let text = "x = req.query.c\neval(x)\n";
        let vulns = analyze_taint("a.js", text);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[0].sink, SinkKind::Eval);
        assert_eq!(vulns[0].source, SourceKind::UserInput);
    }

    #[test]
    fn two_hop_propagation_reaches_sql_sink() {
        let text = "a = req.body.x\nb = a\nquery(\"SELECT * FROM t WHERE c = \" + b)\n";
        let vulns = analyze_taint("a.js", text);
        let sql: Vec<_> = vulns.iter().filter(|v| v.sink == SinkKind::Sql).collect();
        assert!(!sql.is_empty());
        let flow = &sql.iter().find(|v| v.variable == "b").unwrap().flow;
        assert!(flow.len() >= 3);
        assert!(flow.windows(2).all(|w| w[0].line <= w[1].line));
        assert_eq!(flow.last().unwrap().sink, Some(SinkKind::Sql));
    }

    #[test]
    fn network_source_to_command_is_high() {
        let text = "data = fetch(url)\nexecSync(data)\n";
        let vulns = analyze_taint("a.js", text);
        let v = vulns.iter().find(|v| v.sink == SinkKind::Command).unwrap();
        assert_eq!(v.severity, Severity::High);
        assert_eq!(v.source, SourceKind::Network);
    }

    #[test]
    fn file_source_to_sql_is_medium() {
        let text = "raw = readFileSync(p)\nexecute(raw)\n";
        let vulns = analyze_taint("a.js", text);
        let v = vulns.iter().find(|v| v.sink == SinkKind::Sql).unwrap();
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn concatenation_is_recorded_as_such() {
        let text = "a = req.body.q\nb = \"x\" + a\nquery(b)\n";
        let vulns = analyze_taint("a.js", text);
        let v = vulns.iter().find(|v| v.variable == "b").unwrap();
        assert!(v
            .flow
            .iter()
            .any(|s| s.operation == FlowOperation::Concatenation));
    }

    #[test]
    fn sink_before_the_source_is_not_a_flow() {
        let text = "eval(x)\nx = req.query.c\n";
        assert!(analyze_taint("a.js", text).is_empty());
    }

    #[test]
    fn later_uses_do_not_distort_an_earlier_sink_flow() {
        let text = "x = req.query.c\neval(x)\nlog(x)\n";
        let vulns = analyze_taint("a.js", text);
        let v = vulns.iter().find(|v| v.sink == SinkKind::Eval).unwrap();
        assert!(v.flow.windows(2).all(|w| w[0].line <= w[1].line));
        assert_eq!(v.flow.last().unwrap().line, 2);
    }

    #[test]
    fn untainted_variables_trigger_nothing() {
        let text = "safe = compute()\neval(safe2)\n";
        assert!(analyze_taint("a.js", text).is_empty());
    }

    #[test]
    fn analysis_is_idempotent() {
        let text = "a = req.body.x\nb = a\nquery(b)\n";
        let first = analyze_taint("a.js", text);
        let second = analyze_taint("a.js", text);
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.variable, y.variable);
            assert_eq!(x.line, y.line);
            assert_eq!(x.flow.len(), y.flow.len());
        }
    }

    #[test]
    fn word_boundary_matching_is_exact() {
        assert!(references_name("query(b)", "b"));
        assert!(!references_name("query(bb)", "b"));
        assert!(!references_name("abc = 1", "b"));
    }
}

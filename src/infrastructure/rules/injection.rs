//! Injection and XSS detection rules
//!
//! Text signatures for SQL/command/code injection and DOM-based XSS.
//! Patterns are deliberately language-agnostic; a signature occasionally
//! being language-specific is a coincidence of syntax, not a dispatch key.

use crate::domain::finding::Severity;
use crate::domain::rule::Rule;

// ============================================================================
// SQL Injection Rules
// ============================================================================

/// String literal containing a SQL verb concatenated with an expression
pub fn sql_string_concat_rule() -> Rule {
    Rule::new(
        "sql-string-concat",
        r#"['"`][^'"`]*(?i:select|insert|update|delete)\s[^'"`]*['"`]\s*\+"#,
        "SQL query built by string concatenation",
        Severity::High,
        "SQL Injection",
        "CWE-89",
        "Use parameterized queries or an ORM instead of concatenating SQL strings.",
    )
}

/// Concatenation directly inside a query/execute call
pub fn sql_concat_in_call_rule() -> Rule {
    Rule::new(
        "sql-concat-in-call",
        r#"(?i:query|execute|executequery|executemany)\s*\([^)\n]*\+"#,
        "Dynamic expression concatenated into a SQL execution call",
        Severity::Critical,
        "SQL Injection",
        "CWE-89",
        "Bind values with query placeholders rather than building the statement inline.",
    )
}

/// Python f-string passed straight to a SQL execution call
pub fn sql_fstring_rule() -> Rule {
    Rule::new(
        "sql-fstring",
        r#"(?i:execute|query)\s*\(\s*f['"]"#,
        "Interpolated f-string used as a SQL statement",
        Severity::Critical,
        "SQL Injection",
        "CWE-89",
        "Pass parameters separately: cursor.execute(\"... WHERE id = %s\", (user_id,)).",
    )
}

/// MongoDB $where operator, which evaluates JavaScript server-side
pub fn nosql_where_rule() -> Rule {
    Rule::new(
        "nosql-where-operator",
        r#"\$where['"]?\s*:"#,
        "MongoDB $where clause evaluates arbitrary JavaScript",
        Severity::High,
        "NoSQL Injection",
        "CWE-943",
        "Replace $where with query operators ($eq, $gt, ...) and validate inputs.",
    )
}

// ============================================================================
// Code Injection Rules
// ============================================================================

/// Direct eval() usage
pub fn eval_direct_rule() -> Rule {
    Rule::new(
        "eval-direct",
        r#"\beval\s*\("#,
        "Potentially unsafe eval() call",
        Severity::Critical,
        "Code Injection",
        "CWE-94",
        "Avoid eval(); use JSON.parse() for data or ast.literal_eval() in Python.",
    )
}

/// new Function() constructor, equivalent to eval
pub fn new_function_rule() -> Rule {
    Rule::new(
        "new-function-constructor",
        r#"new\s+Function\s*\("#,
        "new Function() allows dynamic code execution similar to eval",
        Severity::High,
        "Code Injection",
        "CWE-94",
        "Construct behavior statically instead of compiling source strings at runtime.",
    )
}

/// setTimeout/setInterval with a string argument acts like eval
pub fn timer_string_eval_rule() -> Rule {
    Rule::new(
        "timer-string-eval",
        r#"(?:setTimeout|setInterval)\s*\(\s*['"]"#,
        "setTimeout/setInterval with a string argument acts like eval()",
        Severity::High,
        "Code Injection",
        "CWE-94",
        "Pass a function reference instead of a string to setTimeout/setInterval.",
    )
}

/// Python exec()/execfile()
pub fn python_exec_rule() -> Rule {
    Rule::new(
        "python-exec",
        r#"\bexec(?:file)?\s*\("#,
        "exec() runs dynamically constructed code",
        Severity::Critical,
        "Code Injection",
        "CWE-94",
        "Remove exec(); dispatch through a whitelist of callables instead.",
    )
}

/// Server-side template injection via render_template_string
pub fn template_string_render_rule() -> Rule {
    Rule::new(
        "template-string-render",
        r#"render_template_string\s*\("#,
        "Rendering a template from a string enables server-side template injection",
        Severity::High,
        "Code Injection",
        "CWE-94",
        "Render named template files and pass data as context variables.",
    )
}

// ============================================================================
// Command Injection Rules
// ============================================================================

/// Shell execution primitives (Python/PHP)
pub fn shell_exec_rule() -> Rule {
    Rule::new(
        "shell-exec",
        r#"(?:os\.system|os\.popen|subprocess\.(?:call|run|Popen|check_output)|shell_exec|passthru|proc_open)\s*\("#,
        "Shell execution primitive reachable from source text",
        Severity::Critical,
        "Command Injection",
        "CWE-78",
        "Invoke the target binary with an argument vector; never pass a shell string.",
    )
}

/// Node.js child_process execution
pub fn child_process_rule() -> Rule {
    Rule::new(
        "child-process-exec",
        r#"(?:child_process\.(?:exec|execSync|spawn|spawnSync|execFile)|\bexecSync|\bspawnSync)\s*\("#,
        "Potential command injection via child_process",
        Severity::Critical,
        "Command Injection",
        "CWE-78",
        "Prefer execFile with an args array over exec with an interpolated string.",
    )
}

/// JVM/.NET process start APIs
pub fn process_start_rule() -> Rule {
    Rule::new(
        "process-start",
        r#"Runtime\.getRuntime\(\)\.exec|new\s+ProcessBuilder\s*\(|Process\.Start\s*\("#,
        "Operating-system process started from code",
        Severity::High,
        "Command Injection",
        "CWE-78",
        "Validate and allowlist every argument before starting external processes.",
    )
}

/// subprocess with shell=True
pub fn shell_true_rule() -> Rule {
    Rule::new(
        "subprocess-shell-true",
        r#"shell\s*=\s*True"#,
        "shell=True routes the command line through the shell",
        Severity::High,
        "Command Injection",
        "CWE-78",
        "Drop shell=True and pass the command as a list of arguments.",
    )
}

// ============================================================================
// Cross-Site Scripting Rules
// ============================================================================

/// Assignment to innerHTML/outerHTML
pub fn inner_html_rule() -> Rule {
    Rule::new(
        "xss-inner-html",
        r#"\.(?:innerHTML|outerHTML)\s*="#,
        "Direct HTML injection via innerHTML/outerHTML assignment",
        Severity::High,
        "Cross-Site Scripting",
        "CWE-79",
        "Use textContent, or sanitize the markup with a library such as DOMPurify.",
    )
}

/// document.write with dynamic content
pub fn document_write_rule() -> Rule {
    Rule::new(
        "xss-document-write",
        r#"document\.write(?:ln)?\s*\("#,
        "document.write() can inject unescaped markup into the page",
        Severity::High,
        "Cross-Site Scripting",
        "CWE-79",
        "Build DOM nodes explicitly and assign text through textContent.",
    )
}

/// React's escape hatch for raw HTML
pub fn dangerously_set_html_rule() -> Rule {
    Rule::new(
        "xss-dangerously-set-html",
        r#"dangerouslySetInnerHTML"#,
        "dangerouslySetInnerHTML renders unescaped HTML",
        Severity::High,
        "Cross-Site Scripting",
        "CWE-79",
        "Sanitize the HTML before rendering, or render data through JSX text nodes.",
    )
}

/// All injection/XSS rules, in stable display-priority order
pub fn get_injection_rules() -> Vec<Rule> {
    vec![
        sql_string_concat_rule(),
        sql_concat_in_call_rule(),
        sql_fstring_rule(),
        nosql_where_rule(),
        eval_direct_rule(),
        new_function_rule(),
        timer_string_eval_rule(),
        python_exec_rule(),
        template_string_render_rule(),
        shell_exec_rule(),
        child_process_rule(),
        process_start_rule(),
        shell_true_rule(),
        inner_html_rule(),
        document_write_rule(),
        dangerously_set_html_rule(),
    ]
}

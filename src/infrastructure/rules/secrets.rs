//! Hardcoded credential and secret detection rules

use crate::domain::finding::Severity;
use crate::domain::rule::Rule;

/// Password literal assigned in source
pub fn hardcoded_password_rule() -> Rule {
    Rule::new(
        "hardcoded-password",
        r#"(?i)(?:password|passwd|pwd)\s*[:=]\s*['"][^'"]{4,}['"]"#,
        "Hardcoded password in source",
        Severity::Critical,
        "Hardcoded Credentials",
        "CWE-798",
        "Load credentials from the environment or a secret manager, never from source.",
    )
}

/// API key / token literal assigned in source
pub fn hardcoded_api_key_rule() -> Rule {
    Rule::new(
        "hardcoded-api-key",
        r#"(?i)(?:api[_-]?key|apikey|secret[_-]?key|client[_-]?secret|access[_-]?token|auth[_-]?token)\s*[:=]\s*['"][^'"]{8,}['"]"#,
        "Hardcoded API key or token in source",
        Severity::Critical,
        "Hardcoded Credentials",
        "CWE-798",
        "Move the key to environment configuration and rotate the exposed value.",
    )
}

/// AWS access key id literal
pub fn aws_access_key_rule() -> Rule {
    Rule::new(
        "aws-access-key",
        r#"\bAKIA[0-9A-Z]{16}\b"#,
        "AWS access key ID embedded in source",
        Severity::Critical,
        "Hardcoded Credentials",
        "CWE-798",
        "Revoke this key immediately and switch to IAM roles or environment credentials.",
    )
}

/// PEM private key material
pub fn private_key_block_rule() -> Rule {
    Rule::new(
        "private-key-block",
        r#"-----BEGIN (?:RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY"#,
        "Private key material committed to source",
        Severity::Critical,
        "Hardcoded Credentials",
        "CWE-798",
        "Remove the key from the repository, rotate it, and store keys in a vault.",
    )
}

/// JWT literal (three base64url segments starting with eyJ)
pub fn hardcoded_jwt_rule() -> Rule {
    Rule::new(
        "hardcoded-jwt",
        r#"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}"#,
        "JSON Web Token embedded in source",
        Severity::High,
        "Hardcoded Credentials",
        "CWE-798",
        "Issue tokens at runtime; a committed JWT must be treated as compromised.",
    )
}

/// Connection string with inline credentials
pub fn credential_in_url_rule() -> Rule {
    Rule::new(
        "credential-in-url",
        r#"(?i)\b(?:mongodb(?:\+srv)?|postgres(?:ql)?|mysql|redis|amqp|ftp)://[^\s'"/@]+:[^\s'"@]+@"#,
        "Connection string carries inline username and password",
        Severity::Critical,
        "Hardcoded Credentials",
        "CWE-798",
        "Reference credentials from configuration and keep connection strings secret-free.",
    )
}

pub fn get_secret_rules() -> Vec<Rule> {
    vec![
        hardcoded_password_rule(),
        hardcoded_api_key_rule(),
        aws_access_key_rule(),
        private_key_block_rule(),
        hardcoded_jwt_rule(),
        credential_in_url_rule(),
    ]
}

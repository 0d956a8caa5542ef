//! Cryptography and transport security rules

use crate::domain::finding::Severity;
use crate::domain::rule::Rule;

/// MD5/SHA-1 digest construction
pub fn weak_hash_rule() -> Rule {
    Rule::new(
        "weak-hash",
        r#"(?:hashlib\.(?:md5|sha1)|crypto\.createHash\s*\(\s*['"](?:md5|sha1)|MessageDigest\.getInstance\s*\(\s*['"](?:MD5|SHA-?1)|\bmd5\s*\()"#,
        "Weak hash algorithm (MD5/SHA-1)",
        Severity::Medium,
        "Weak Cryptography",
        "CWE-327",
        "Use SHA-256 or stronger; for passwords use bcrypt, scrypt, or argon2.",
    )
}

/// Broken or ECB-mode ciphers
pub fn weak_cipher_rule() -> Rule {
    Rule::new(
        "weak-cipher",
        r#"(?:Cipher\.getInstance\s*\(\s*['"](?:DES|RC4|AES/ECB)|createCipheriv\s*\(\s*['"](?:des|rc4)|\bDES\.new\s*\(|\bARC4\.new\s*\()"#,
        "Weak or broken cipher configuration",
        Severity::High,
        "Weak Cryptography",
        "CWE-327",
        "Use AES-GCM or ChaCha20-Poly1305 with a vetted crypto library.",
    )
}

/// Non-cryptographic RNG in source
pub fn insecure_random_rule() -> Rule {
    Rule::new(
        "insecure-random",
        r#"Math\.random\s*\(|random\.random\s*\(|java\.util\.Random|\brand\s*\(\s*\)"#,
        "Non-cryptographic random number generator",
        Severity::Low,
        "Insecure Randomness",
        "CWE-330",
        "Use a CSPRNG (crypto.randomBytes, secrets module, SecureRandom) for security values.",
    )
}

/// TLS certificate verification switched off
pub fn tls_verification_disabled_rule() -> Rule {
    Rule::new(
        "tls-verification-disabled",
        r#"(?:verify\s*=\s*False|rejectUnauthorized['"]?\s*:\s*false|InsecureSkipVerify\s*:\s*true|CURLOPT_SSL_VERIFYPEER\s*,\s*(?:false|0)|NODE_TLS_REJECT_UNAUTHORIZED['"]?\s*[:=]\s*['"]?0)"#,
        "TLS certificate verification disabled",
        Severity::High,
        "Insecure Transport",
        "CWE-319",
        "Keep certificate verification on; pin or provision the expected CA instead.",
    )
}

/// Plain HTTP URL to a non-local host
pub fn plaintext_http_rule() -> Rule {
    Rule::new(
        "plaintext-http-url",
        r#"['"]http://[a-zA-Z][a-zA-Z0-9.-]*\.[a-zA-Z]{2,}"#,
        "Plain HTTP URL; traffic is unencrypted in transit",
        Severity::Low,
        "Insecure Transport",
        "CWE-319",
        "Use https:// endpoints for anything beyond local development.",
    )
}

pub fn get_crypto_rules() -> Vec<Rule> {
    vec![
        weak_hash_rule(),
        weak_cipher_rule(),
        insecure_random_rule(),
        tls_verification_disabled_rule(),
        plaintext_http_rule(),
    ]
}

//! Language identification and comment-syntax selection
//!
//! The declared language of a document drives comment filtering only;
//! detection rules themselves are language-agnostic text signatures.

use serde::{Deserialize, Serialize};

/// Programming language of a scanned document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Php,
    Ruby,
    Perl,
    Go,
    Rust,
    C,
    Cpp,
    Html,
    /// Unknown or undeclared language; lines are never treated as comments
    Plain,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "php" => Some(Language::Php),
            "rb" => Some(Language::Ruby),
            "pl" | "pm" => Some(Language::Perl),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            "html" | "htm" | "xml" | "vue" | "svelte" => Some(Language::Html),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Map a caller-declared language identifier (e.g. an editor language id)
    pub fn from_identifier(id: &str) -> Self {
        match id.to_lowercase().as_str() {
            "javascript" | "javascriptreact" | "js" => Language::JavaScript,
            "typescript" | "typescriptreact" | "ts" => Language::TypeScript,
            "python" | "py" => Language::Python,
            "java" => Language::Java,
            "csharp" | "cs" => Language::CSharp,
            "php" => Language::Php,
            "ruby" | "rb" => Language::Ruby,
            "perl" => Language::Perl,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "c" => Language::C,
            "cpp" | "c++" => Language::Cpp,
            "html" | "xml" | "markup" => Language::Html,
            _ => Language::Plain,
        }
    }

    /// Whether a source line is a comment under this language's syntax.
    ///
    /// Prefix heuristics only: `#` for Python/Ruby/Perl, `//` or `/*` for
    /// the C family, `<!--` for markup. Plain documents have no comments.
    pub fn line_is_comment(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self {
            Language::Python | Language::Ruby | Language::Perl => trimmed.starts_with('#'),
            Language::JavaScript
            | Language::TypeScript
            | Language::Java
            | Language::CSharp
            | Language::Php
            | Language::Go
            | Language::Rust
            | Language::C
            | Language::Cpp => trimmed.starts_with("//") || trimmed.starts_with("/*"),
            Language::Html => trimmed.starts_with("<!--"),
            Language::Plain => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection() {
        assert_eq!(Language::from_filename("src/app.ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_filename("main.py"), Some(Language::Python));
        assert_eq!(Language::from_filename("README.md"), None);
    }

    #[test]
    fn comment_prefixes_per_family() {
        assert!(Language::Python.line_is_comment("  # eval(x)"));
        assert!(Language::JavaScript.line_is_comment("// eval(x)"));
        assert!(Language::JavaScript.line_is_comment("/* eval(x) */"));
        assert!(Language::Html.line_is_comment("<!-- <script> -->"));
        assert!(!Language::Plain.line_is_comment("# anything"));
        assert!(!Language::Python.line_is_comment("x = 1  # trailing"));
    }
}

use std::{collections::HashMap, fmt, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EXTENSION_MAP: HashMap<&'static str, LanguageKind> = {
        use LanguageKind::*;
        HashMap::from([
            ("py", Python),
            ("c", C),
            ("h", C),
            ("cpp", Cpp),
            ("cc", Cpp),
            ("cxx", Cpp),
            ("hpp", Cpp),
            ("java", Java),
            ("js", JavaScript),
            ("mjs", JavaScript),
            ("cjs", JavaScript),
            ("ts", TypeScript),
            ("go", Go),
            ("rb", Ruby),
            ("rs", Rust),
            ("sh", Shell),
        ])
    };
    static ref SHEBANG_REGEX: Option<Regex> =
        Regex::new(r"^#!.*\b(?P<cmd>python[0-9.]*|node|deno|ruby|bash|sh)\b").ok();
}

/// Languages with a fixed label used in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageKind {
    Python,
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Go,
    Ruby,
    Rust,
    Shell,
}

impl LanguageKind {
    /// Human-readable label sent to the annotation service.
    pub fn label(&self) -> &'static str {
        match self {
            LanguageKind::Python => "Python",
            LanguageKind::C => "C",
            LanguageKind::Cpp => "C++",
            LanguageKind::Java => "Java",
            LanguageKind::JavaScript => "JavaScript",
            LanguageKind::TypeScript => "TypeScript",
            LanguageKind::Go => "Go",
            LanguageKind::Ruby => "Ruby",
            LanguageKind::Rust => "Rust",
            LanguageKind::Shell => "Shell",
        }
    }

    pub fn from_extension(ext: &str) -> Option<LanguageKind> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        EXTENSION_MAP.get(ext.as_str()).copied()
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    /// Extension first, then a shebang on the first line.
    pub fn detect(&self, path: &Path, contents: &str) -> Option<LanguageKind> {
        if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
            if let Some(language) = LanguageKind::from_extension(ext) {
                return Some(language);
            }
        }

        let first_line = contents.lines().next()?;
        let caps = SHEBANG_REGEX.as_ref()?.captures(first_line)?;
        match &caps["cmd"] {
            cmd if cmd.starts_with("python") => Some(LanguageKind::Python),
            "node" | "deno" => Some(LanguageKind::JavaScript),
            "ruby" => Some(LanguageKind::Ruby),
            "bash" | "sh" => Some(LanguageKind::Shell),
            _ => None,
        }
    }

    /// Label used as the language hint: the table label, else the
    /// upper-cased extension, else `source`.
    pub fn hint(&self, path: &Path, contents: &str) -> String {
        if let Some(language) = self.detect(path, contents) {
            return language.label().to_string();
        }
        path.extension()
            .and_then(|s| s.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_ascii_uppercase())
            .unwrap_or_else(|| "source".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shebang_pattern_compiles() {
        assert!(SHEBANG_REGEX.is_some());
    }
}

//! File names for code blocks sent as documents.

use std::sync::LazyLock;

use regex::Regex;

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_\-.]+\.[a-zA-Z0-9]+").expect("valid filename regex")
});

/// Names longer than this always get the language extension appended.
const MAX_KEPT_NAME_LEN: usize = 24;
const FALLBACK_STEM: &str = "readable";

/// File extension for a fence language tag (case-insensitive), `txt` when unknown.
pub fn extension_for(language: &str) -> &'static str {
    match language.to_ascii_lowercase().as_str() {
        "python" => "py",
        "javascript" => "js",
        "typescript" => "ts",
        "java" => "java",
        "c++" => "cpp",
        "c" => "c",
        "html" => "html",
        "css" => "css",
        "bash" | "shell" => "sh",
        "php" => "php",
        "markdown" => "md",
        "dotenv" => "env",
        "json" => "json",
        "yaml" => "yaml",
        "xml" => "xml",
        "dockerfile" => "dockerfile",
        "toml" => "toml",
        "go" => "go",
        "ruby" => "rb",
        "rust" => "rs",
        "perl" => "pl",
        "swift" => "swift",
        "kotlin" => "kt",
        "sql" => "sql",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "graphql" => "graphql",
        "r" => "r",
        "dart" => "dart",
        "scala" => "scala",
        "groovy" => "groovy",
        _ => "txt",
    }
}

/// Picks a file name for `code` written in `language`.
///
/// A `name.ext` token in the first two lines (e.g. a `# main.py` comment) is
/// reused; otherwise the name is `readable.<ext>`. Always non-empty.
pub fn infer_filename(code: &str, language: &str) -> String {
    let sample = code
        .trim()
        .split('\n')
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\\', "");
    let ext = extension_for(language);

    match FILENAME_RE.find(&sample) {
        Some(token) => {
            let token = token.as_str();
            if token.ends_with(&format!(".{ext}")) && token.len() <= MAX_KEPT_NAME_LEN {
                token.to_string()
            } else {
                format!("{token}.{ext}")
            }
        }
        None => format!("{FALLBACK_STEM}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_and_unknown() {
        assert_eq!(extension_for("Python"), "py");
        assert_eq!(extension_for("rust"), "rs");
        assert_eq!(extension_for("shell"), "sh");
        assert_eq!(extension_for("txt"), "txt");
        assert_eq!(extension_for("brainfuck"), "txt");
    }

    #[test]
    fn test_filename_from_comment() {
        assert_eq!(infer_filename("# main.py\nprint(1)", "python"), "main.py");
        assert_eq!(
            infer_filename("// src/lib.rs\nfn main() {}", "rust"),
            "lib.rs"
        );
    }

    #[test]
    fn test_filename_with_other_extension_gets_suffix() {
        assert_eq!(infer_filename("# config.yaml\nx = 1", "python"), "config.yaml.py");
    }

    #[test]
    fn test_long_filename_gets_suffix() {
        let code = "# a_really_long_module_name.py\n";
        assert_eq!(
            infer_filename(code, "python"),
            "a_really_long_module_name.py.py"
        );
    }

    #[test]
    fn test_second_line_is_sampled() {
        assert_eq!(
            infer_filename("#!/bin/sh\n# deploy.sh\necho", "bash"),
            "deploy.sh"
        );
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(infer_filename("x = 1", "python"), "readable.py");
        assert_eq!(infer_filename("", "txt"), "readable.txt");
    }
}

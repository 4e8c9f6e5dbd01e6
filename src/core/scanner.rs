use crate::core::stdlib::is_stdlib_module;
use crate::domain::model::ModuleName;
use crate::utils::error::{ReqrunError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Line-oriented import scanner. This is a textual prefix check, not a parser:
/// multi-line imports, comments and imports inside strings are not understood.
#[derive(Debug, Clone, Default)]
pub struct ImportScanner {
    already_available: HashSet<String>,
    extra_stdlib: HashSet<String>,
}

impl ImportScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names that should be treated as already importable and never installed.
    pub fn with_already_available<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.already_available.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_extra_stdlib<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_stdlib.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn scan_text(&self, source: &str) -> Vec<ModuleName> {
        let mut modules = Vec::new();

        for line in source.lines() {
            let Some(candidate) = candidate_from_line(line) else {
                continue;
            };

            // 子模組 (例如 os.path) 直接略過
            if candidate.contains('.') {
                continue;
            }
            if self.already_available.contains(candidate) {
                continue;
            }
            if is_stdlib_module(candidate) || self.extra_stdlib.contains(candidate) {
                continue;
            }

            tracing::info!("Found module: {}", candidate);
            modules.push(ModuleName::new(candidate));
        }

        modules
    }

    pub fn scan_file(&self, path: &Path) -> Result<Vec<ModuleName>> {
        tracing::info!("Searching for dependencies...");

        let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReqrunError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ReqrunError::IoError(e),
        })?;

        Ok(self.scan_text(&source))
    }

    /// Boundary variant of [`scan_file`](Self::scan_file): a missing file is reported
    /// to the user and yields no modules instead of an error.
    pub fn find_modules(&self, path: &Path) -> Vec<ModuleName> {
        match self.scan_file(path) {
            Ok(modules) => modules,
            Err(ReqrunError::FileNotFound { path }) => {
                println!("File not found. Try again.");
                tracing::debug!("Scan skipped, missing file: {}", path);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("❌ Failed to scan {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Second whitespace-delimited token of a line whose first token is `import` or `from`.
fn candidate_from_line(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "import" | "from" => tokens.next(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(modules: &[ModuleName]) -> Vec<&str> {
        modules.iter().map(ModuleName::as_str).collect()
    }

    #[test]
    fn test_stdlib_only_file_yields_nothing() {
        let scanner = ImportScanner::new();
        let source = "import os\nimport sys\nfrom collections import OrderedDict\n";
        assert!(scanner.scan_text(source).is_empty());
    }

    #[test]
    fn test_third_party_modules_in_order() {
        let scanner = ImportScanner::new();
        let source = "import requests\nfrom PIL import Image\n";
        assert_eq!(names(&scanner.scan_text(source)), vec!["requests", "PIL"]);
    }

    #[test]
    fn test_dotted_names_are_filtered() {
        let scanner = ImportScanner::new();
        assert!(scanner.scan_text("import os.path\n").is_empty());
        assert!(scanner.scan_text("from google.cloud import storage\n").is_empty());
    }

    #[test]
    fn test_mid_line_import_is_ignored() {
        let scanner = ImportScanner::new();
        let source = "x = \"import requests\"\nprint('from flask import Flask')\n";
        assert!(scanner.scan_text(source).is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let scanner = ImportScanner::new();
        let source = "import requests\nimport requests\n";
        assert_eq!(names(&scanner.scan_text(source)), vec!["requests", "requests"]);
    }

    #[test]
    fn test_indented_and_parenthesized_forms() {
        let scanner = ImportScanner::new();
        let source = "try:\n    import numpy\nexcept ImportError:\n    pass\nfrom flask import (Flask,\n    request)\n";
        assert_eq!(names(&scanner.scan_text(source)), vec!["numpy", "flask"]);
    }

    #[test]
    fn test_import_with_comma_keeps_raw_token() {
        // 只取第二個 token，逗號保留在名稱中
        let scanner = ImportScanner::new();
        assert_eq!(names(&scanner.scan_text("import numpy, pandas\n")), vec!["numpy,"]);
    }

    #[test]
    fn test_keyword_prefix_is_not_a_keyword() {
        let scanner = ImportScanner::new();
        let source = "imports = 3\nfromage = 'brie'\nimport\n";
        assert!(scanner.scan_text(source).is_empty());
    }

    #[test]
    fn test_already_available_and_extra_stdlib() {
        let scanner = ImportScanner::new()
            .with_already_available(["requests"])
            .with_extra_stdlib(["vendored"]);
        let source = "import requests\nimport vendored\nimport yaml\n";
        assert_eq!(names(&scanner.scan_text(source)), vec!["yaml"]);
    }

    #[test]
    fn test_scan_file_reads_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# café").unwrap();
        writeln!(file, "import requests").unwrap();

        let modules = ImportScanner::new().scan_file(file.path()).unwrap();
        assert_eq!(names(&modules), vec!["requests"]);
    }

    #[test]
    fn test_missing_file() {
        let scanner = ImportScanner::new();
        let path = Path::new("/definitely/not/here/script.py");

        assert!(matches!(
            scanner.scan_file(path),
            Err(ReqrunError::FileNotFound { .. })
        ));
        assert!(scanner.find_modules(path).is_empty());
    }
}

//! Wordlist file loading
//!
//! Format: one token per line, `#`-prefixed lines are comments, surrounding
//! whitespace is stripped, empty lines are skipped. A missing or unreadable
//! file is fatal and aborts the run before any probe is issued.

use crate::error::{BlobForgeError, Result};
use std::fs;
use std::path::Path;

/// Load one wordlist. The returned order matches file order.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        BlobForgeError::io(
            format!("failed to read wordlist: {e}"),
            Some(path.display().to_string()),
        )
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_tokens_skipping_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# keywords").unwrap();
        writeln!(file, "backup").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  data  ").unwrap();
        writeln!(file, "# trailing comment").unwrap();
        writeln!(file, "logs").unwrap();

        let words = load_wordlist(file.path()).unwrap();
        assert_eq!(words, vec!["backup", "data", "logs"]);
    }

    #[test]
    fn missing_file_is_fatal_and_names_the_path() {
        let err = load_wordlist(Path::new("/nonexistent/keywords.txt")).unwrap_err();
        assert!(matches!(err, BlobForgeError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/keywords.txt"));
    }

    #[test]
    fn preserves_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zeta\nalpha\nmid").unwrap();

        let words = load_wordlist(file.path()).unwrap();
        assert_eq!(words, vec!["zeta", "alpha", "mid"]);
    }
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use stop_words::{get, LANGUAGE};

/// Read a newline-delimited stop word file; `//` lines are comments
pub fn load_stop_words(path: &Path) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        words.push(line.to_string());
    }
    Ok(words)
}

/// Built-in stop word list for a language name, English if unknown
pub fn builtin_stop_words(language: &str) -> Vec<String> {
    let language = match language.to_lowercase().as_str() {
        "german" => LANGUAGE::German,
        "french" => LANGUAGE::French,
        "spanish" => LANGUAGE::Spanish,
        "italian" => LANGUAGE::Italian,
        "portuguese" => LANGUAGE::Portuguese,
        "dutch" => LANGUAGE::Dutch,
        _ => LANGUAGE::English,
    };
    get(language).into_iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_skips_comments_and_blanks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stopWords.txt");
        std::fs::write(&path, "// english\nthe\n\n  and  \n// more\nWith\n").unwrap();

        let words = load_stop_words(&path).unwrap();
        assert_eq!(words, vec!["the", "and", "With"]);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_stop_words(&tmp.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_builtin_english() {
        let words = builtin_stop_words("english");
        assert!(words.iter().any(|w| w == "the"));
    }
}

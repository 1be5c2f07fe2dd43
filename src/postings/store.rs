use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::codec::{read_entries, write_entries};
use crate::error::{FtdexError, Result};
use crate::models::PostingEntry;

/// File name prefix; keeps terms like `con` or `aux` from becoming
/// reserved file names
pub const INDEX_FILE_PREFIX: &str = "idx-";

/// Suffix of the backup kept by a full rewrite
pub const OLD_FILE_SUFFIX: &str = ".old";

const FAN_OUT_DEPTH: usize = 3;

/// Filesystem layout of the posting lists
#[derive(Clone, Debug)]
pub struct PostingStore {
    root: PathBuf,
}

impl PostingStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// `root/c1/c2/c3/idx-<term>`
    ///
    /// Number separators map to `_` in directory names; a `.` component
    /// would collapse one level of the fan-out.
    pub fn path_for(&self, term: &str) -> PathBuf {
        let mut path = self.root.clone();
        for c in term.chars().take(FAN_OUT_DEPTH) {
            path.push(fan_out_component(c));
        }
        path.push(format!("{}{}", INDEX_FILE_PREFIX, term));
        path
    }

    /// Find the file holding `term`, following name truncation
    pub fn locate(&self, term: &str) -> Result<Option<PathBuf>> {
        let mut current = term;
        loop {
            let path = self.path_for(current);
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => return Ok(Some(path)),
                Ok(_) => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) if is_name_too_long(&e) => current = shorten(term, current)?,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Find or create the file for `term`, truncating the name until the
    /// filesystem accepts it
    fn create(&self, term: &str) -> Result<PathBuf> {
        let mut current = term;
        loop {
            let path = self.path_for(current);
            let attempt = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match attempt {
                Ok(_) => return Ok(path),
                Err(e) if is_name_too_long(&e) => {
                    debug!("file name for '{}' too long, truncating", current);
                    current = shorten(term, current)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn exists(&self, term: &str) -> bool {
        matches!(self.locate(term), Ok(Some(_)))
    }

    /// Stream all records of `term` into `visit`; a missing file is empty
    pub fn load(&self, term: &str, visit: impl FnMut(PostingEntry)) -> Result<usize> {
        let Some(path) = self.locate(term)? else {
            return Ok(0);
        };
        let mut reader = BufReader::new(File::open(&path)?);
        Ok(read_entries(&mut reader, visit)?)
    }

    /// Append entries that keep the file's sort order
    pub fn append(&self, term: &str, entries: &[PostingEntry]) -> Result<usize> {
        let path = self.create(term)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        let written = write_entries(&mut writer, entries)?;
        writer.flush()?;
        debug!("appended {} entries to {:?}", written, path);
        Ok(written)
    }

    /// Replace the file with the full sorted list, keeping the previous
    /// content as `.old`
    pub fn rewrite<'a, I>(&self, term: &str, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a PostingEntry>,
    {
        let path = self.create(term)?;
        if fs::metadata(&path)?.len() > 0 {
            let old = backup_path(&path);
            if old.exists() {
                fs::remove_file(&old)?;
            }
            fs::rename(&path, &old)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        let written = write_entries(&mut writer, entries)?;
        writer.flush()?;
        debug!("rewrote {:?} with {} entries", path, written);
        Ok(written)
    }

    /// Vocabulary from file names, three directory levels down
    ///
    /// Terms come from the names only, so startup cost does not depend
    /// on the number of postings.
    pub fn scan_terms(&self) -> Result<Vec<String>> {
        let mut dirs = vec![self.root.clone()];
        for _ in 0..FAN_OUT_DEPTH {
            let mut next = Vec::new();
            for dir in &dirs {
                for entry in fs::read_dir(dir)? {
                    let entry = entry?;
                    if entry.file_type()?.is_dir() {
                        next.push(entry.path());
                    }
                }
            }
            dirs = next;
        }

        let mut terms = Vec::new();
        for dir in &dirs {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    continue;
                };
                if name.ends_with(OLD_FILE_SUFFIX) {
                    continue;
                }
                if let Some(term) = name.strip_prefix(INDEX_FILE_PREFIX) {
                    terms.push(term.to_string());
                }
            }
        }
        Ok(terms)
    }
}

fn fan_out_component(c: char) -> String {
    match c {
        '.' | ',' => "_".to_string(),
        c => c.to_string(),
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OLD_FILE_SUFFIX);
    PathBuf::from(name)
}

fn is_name_too_long(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::InvalidFilename
}

/// Drop the last char of `current`, refusing to go below the trigram size
fn shorten<'a>(term: &str, current: &'a str) -> Result<&'a str> {
    if current.chars().count() <= FAN_OUT_DEPTH {
        return Err(FtdexError::TermTooLong(term.to_string()));
    }
    let mut chars = current.chars();
    chars.next_back();
    Ok(chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(docs: &[u64]) -> Vec<PostingEntry> {
        docs.iter().map(|&d| PostingEntry::new(d, 1, 3)).collect()
    }

    fn load_all(store: &PostingStore, term: &str) -> Vec<PostingEntry> {
        let mut out = Vec::new();
        store.load(term, |e| out.push(e)).unwrap();
        out
    }

    #[test]
    fn test_fan_out_path() {
        let store = PostingStore {
            root: PathBuf::from("/idx"),
        };
        assert_eq!(
            store.path_for("apple"),
            PathBuf::from("/idx/a/p/p/idx-apple")
        );
        assert_eq!(
            store.path_for("3.14159"),
            PathBuf::from("/idx/3/_/1/idx-3.14159")
        );
        assert_eq!(
            store.path_for("1,000"),
            PathBuf::from("/idx/1/_/0/idx-1,000")
        );
    }

    #[test]
    fn test_missing_term_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = PostingStore::open(tmp.path()).unwrap();
        assert_eq!(store.load("ghost", |_| {}).unwrap(), 0);
        assert!(!store.exists("ghost"));
    }

    #[test]
    fn test_append_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = PostingStore::open(tmp.path()).unwrap();

        store.append("apple", &entries(&[1, 2])).unwrap();
        store.append("apple", &entries(&[5])).unwrap();

        assert_eq!(load_all(&store, "apple"), entries(&[1, 2, 5]));
        assert!(tmp.path().join("a/p/p/idx-apple").is_file());
    }

    #[test]
    fn test_rewrite_keeps_backup() {
        let tmp = TempDir::new().unwrap();
        let store = PostingStore::open(tmp.path()).unwrap();

        store.append("apple", &entries(&[3, 1])).unwrap();
        store.rewrite("apple", &entries(&[1, 3])).unwrap();
        store.rewrite("apple", &entries(&[1, 3, 4])).unwrap();

        assert_eq!(load_all(&store, "apple"), entries(&[1, 3, 4]));
        let old = tmp.path().join("a/p/p/idx-apple.old");
        assert_eq!(fs::metadata(old).unwrap().len(), 20);
    }

    #[test]
    fn test_scan_terms_skips_backups() {
        let tmp = TempDir::new().unwrap();
        let store = PostingStore::open(tmp.path()).unwrap();

        store.append("apple", &entries(&[1])).unwrap();
        store.rewrite("apple", &entries(&[1, 2])).unwrap();
        store.append("banana", &entries(&[2])).unwrap();
        store.append("3.14159", &entries(&[3])).unwrap();
        fs::write(tmp.path().join("invalid"), [0u8; 8]).unwrap();

        let mut terms = store.scan_terms().unwrap();
        terms.sort();
        assert_eq!(terms, vec!["3.14159", "apple", "banana"]);
    }

    #[test]
    fn test_shorten_stops_at_trigram_size() {
        assert_eq!(shorten("apple", "apple").unwrap(), "appl");
        assert_eq!(shorten("über", "über").unwrap(), "übe");
        assert!(matches!(
            shorten("apple", "app"),
            Err(FtdexError::TermTooLong(_))
        ));
    }
}

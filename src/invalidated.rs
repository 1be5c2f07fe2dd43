use parking_lot::RwLock;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::models::DocumentId;
use crate::postings::OLD_FILE_SUFFIX;

/// File name of the persisted set inside the index root
pub const INVALID_FILE: &str = "invalid";

/// Soft-deleted document numbers
///
/// Deletion never touches posting files directly. Lists are purged when
/// they are next loaded and rewritten; until then queries filter against
/// this set.
#[derive(Debug)]
pub struct InvalidatedDocumentSet {
    path: PathBuf,
    docs: RwLock<HashSet<DocumentId>>,
}

impl InvalidatedDocumentSet {
    /// Load `root/invalid`; a missing file is an empty set
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(INVALID_FILE);
        let docs = match File::open(&path) {
            Ok(file) => read_numbers(BufReader::new(file))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        if !docs.is_empty() {
            info!("loaded {} invalidated documents from {:?}", docs.len(), path);
        }
        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    /// Returns true if the document was not already invalidated
    pub fn add(&self, doc_number: DocumentId) -> bool {
        self.docs.write().insert(doc_number)
    }

    /// Returns true if the document was invalidated
    pub fn remove(&self, doc_number: DocumentId) -> bool {
        self.docs.write().remove(&doc_number)
    }

    pub fn contains(&self, doc_number: DocumentId) -> bool {
        self.docs.read().contains(&doc_number)
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the set, keeping the previous file as `invalid.old`
    pub fn persist(&self) -> Result<()> {
        let mut docs: Vec<DocumentId> = self.docs.read().iter().copied().collect();
        docs.sort_unstable();

        if fs::metadata(&self.path).is_ok_and(|meta| meta.len() > 0) {
            let old = self.path.with_file_name(format!("{}{}", INVALID_FILE, OLD_FILE_SUFFIX));
            if old.exists() {
                fs::remove_file(&old)?;
            }
            fs::rename(&self.path, &old)?;
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for doc in &docs {
            writer.write_all(&doc.to_be_bytes())?;
        }
        writer.flush()?;
        debug!("persisted {} invalidated documents", docs.len());
        Ok(())
    }
}

fn read_numbers<R: Read>(mut reader: R) -> io::Result<HashSet<DocumentId>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            u64::from_be_bytes(buf)
        })
        .collect())
}

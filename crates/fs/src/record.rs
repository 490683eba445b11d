use std::path::PathBuf;

/// An entry discovered by the walker, before its digest is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Leaf component, lossily converted when not valid UTF-8
    pub name: String,
    /// Byte count, or the length of the link target for symlinks
    pub size: u64,
}

/// A fingerprinted file, in the order the walker discovered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// File size captured at discovery time
    pub size: u64,
    /// Hex digest of the content, `None` if it could not be read.
    ///
    /// Two `None` digests say nothing about equality.
    pub digest: Option<String>,
}

impl FileRecord {
    pub fn from_entry(entry: WalkEntry, digest: Option<String>) -> Self {
        Self {
            path: entry.path,
            name: entry.name,
            size: entry.size,
            digest,
        }
    }

    #[inline]
    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }
}

use std::{
    collections::HashSet,
    fmt,
    fs::{self, DirEntry, Metadata},
    io,
    path::{Path, PathBuf},
    sync::Arc,
    vec,
};

use log::{debug, warn};

use crate::{
    excludes::{IgnoreEngine, UserExcludes},
    record::WalkEntry,
};

/// Traversal policy shared by every walk started from the same scanner.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Descend into symlinks that resolve to directories.
    ///
    /// Off by default. When on, directories are tracked by canonical path and
    /// a directory reached twice is skipped, which breaks symlink cycles.
    pub follow_dir_symlinks: bool,
    pub ignore: IgnoreEngine,
    pub user_excludes: UserExcludes,
}

/// Why an entry produced no record.
#[derive(Debug)]
pub(crate) enum SkipReason {
    Excluded,
    Ignored,
    /// Fifo, socket, device.
    Special,
    Unreadable(io::Error),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded => f.write_str("excluded"),
            SkipReason::Ignored => f.write_str("ignored"),
            SkipReason::Special => f.write_str("special file"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
        }
    }
}

/// Outcome of looking at one directory entry.
#[derive(Debug)]
pub(crate) enum Inspected {
    Entry(WalkEntry),
    Descend(PathBuf),
    Skip(SkipReason),
}

/// Depth-first, name-sorted traversal yielding files and symlinks.
///
/// Directories are visited pre-order: a subdirectory's whole subtree comes
/// before its next sibling. Unreadable directories and entries are logged and
/// skipped. A missing root yields nothing.
pub struct Walker {
    root: Option<PathBuf>,
    stack: Vec<vec::IntoIter<DirEntry>>,
    visited: HashSet<PathBuf>,
    options: Arc<WalkOptions>,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, options: Arc<WalkOptions>) -> Self {
        Self {
            root: Some(root.into()),
            stack: Vec::new(),
            visited: HashSet::new(),
            options,
        }
    }

    /// Resolve the root into either a single entry or the first directory frame.
    fn start(&mut self, root: PathBuf) -> Option<WalkEntry> {
        let meta = match fs::symlink_metadata(&root) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[walk] root {:?} does not exist", root);
                return None;
            }
            Err(e) => {
                warn!("[walk] cannot stat root {:?}: {e}", root);
                return None;
            }
        };

        // A root named explicitly is followed even when it is a symlink.
        let points_at_dir = meta.is_dir()
            || (meta.file_type().is_symlink()
                && fs::metadata(&root).map(|m| m.is_dir()).unwrap_or(false));

        if points_at_dir {
            self.enter_dir(&root);
            return None;
        }

        let name = leaf_name(&root);
        match classify(root, name, &meta, &self.options) {
            Inspected::Entry(entry) => Some(entry),
            Inspected::Descend(_) => None,
            Inspected::Skip(reason) => {
                debug!("[walk] root skipped: {reason}");
                None
            }
        }
    }

    fn enter_dir(&mut self, dir: &Path) {
        if self.options.follow_dir_symlinks {
            let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
            if !self.visited.insert(canonical) {
                debug!("[walk] {:?} already visited, not descending", dir);
                return;
            }
        }

        match read_dir_sorted(dir) {
            Ok(entries) => self.stack.push(entries.into_iter()),
            Err(e) => warn!("[walk] read_dir({:?}) failed: {e}", dir),
        }
    }
}

impl Iterator for Walker {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        if let Some(root) = self.root.take()
            && let Some(entry) = self.start(root)
        {
            return Some(entry);
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(dir_entry) = frame.next() else {
                self.stack.pop();
                continue;
            };

            match inspect_fs_entry(&dir_entry, &self.options) {
                Inspected::Entry(entry) => return Some(entry),
                Inspected::Descend(dir) => self.enter_dir(&dir),
                Inspected::Skip(reason @ SkipReason::Unreadable(_)) => {
                    warn!("[walk] {:?} skipped: {reason}", dir_entry.path());
                }
                Inspected::Skip(reason) => {
                    debug!("[walk] {:?} skipped: {reason}", dir_entry.path());
                }
            }
        }
    }
}

/// Read a directory and order its entries by file name.
///
/// Entries that fail to read are dropped with a warning.
fn read_dir_sorted(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries: Vec<DirEntry> = fs::read_dir(dir)?
        .filter_map(|res| match res {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("[walk] error reading entry in {:?}: {e}", dir);
                None
            }
        })
        .collect();

    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

fn inspect_fs_entry(entry: &DirEntry, options: &WalkOptions) -> Inspected {
    // DirEntry::metadata does not traverse symlinks
    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(e) => return Inspected::Skip(SkipReason::Unreadable(e)),
    };

    let name = entry.file_name().to_string_lossy().into_owned();
    classify(entry.path(), name, &metadata, options)
}

fn classify(path: PathBuf, name: String, metadata: &Metadata, options: &WalkOptions) -> Inspected {
    let file_type = metadata.file_type();

    let is_symlink = file_type.is_symlink();
    let follows_to_dir = is_symlink
        && options.follow_dir_symlinks
        && fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
    let is_dir = file_type.is_dir() || follows_to_dir;

    if options.user_excludes.is_excluded(&path) {
        return Inspected::Skip(SkipReason::Excluded);
    }
    if options.ignore.is_ignored(&path, is_dir) {
        return Inspected::Skip(SkipReason::Ignored);
    }

    if is_dir {
        return Inspected::Descend(path);
    }

    if is_symlink {
        // Dangling links still count; their content is the target string.
        return match fs::read_link(&path) {
            Ok(target) => Inspected::Entry(WalkEntry {
                size: target.as_os_str().len() as u64,
                path,
                name,
            }),
            Err(e) => Inspected::Skip(SkipReason::Unreadable(e)),
        };
    }

    if file_type.is_file() {
        return Inspected::Entry(WalkEntry {
            size: metadata.len(),
            path,
            name,
        });
    }

    Inspected::Skip(SkipReason::Special)
}

fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;

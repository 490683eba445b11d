//! Content fingerprints.
//!
//! The digest is xxh3-64 rendered as 16 lowercase hex characters. It is a
//! fast duplicate detector, not an integrity check: nothing here is meant to
//! resist deliberately colliding inputs.

use std::{
    fs::{self, File},
    io::{self, Read},
    path::Path,
};

use log::debug;
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

use crate::config::READ_BUFFER_SIZE;

/// Digest of an in-memory buffer.
pub fn digest_bytes(data: &[u8]) -> String {
    render(xxh3_64(data))
}

#[inline]
fn render(hash: u64) -> String {
    format!("{hash:016x}")
}

/// Strategy for turning a path into a digest.
///
/// Implementations run on pool workers, so they must be shareable across
/// threads. `None` means the entry could not be read.
pub trait Fingerprint: Send + Sync {
    fn fingerprint(&self, path: &Path) -> Option<String>;
}

/// Hashes file bytes, or the link target string for symlinks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentFingerprint;

impl Fingerprint for ContentFingerprint {
    fn fingerprint(&self, path: &Path) -> Option<String> {
        match fingerprint_path(path) {
            Ok(digest) => Some(digest),
            Err(e) => {
                debug!("[fingerprint] {:?}: {e}", path);
                None
            }
        }
    }
}

/// Digest the entry at `path` as it exists right now.
///
/// Symlinks are not followed: their content is the target path string.
/// The entry type is read at hashing time, so a file swapped for a link after
/// discovery is hashed as a link.
pub fn fingerprint_path(path: &Path) -> io::Result<String> {
    let meta = fs::symlink_metadata(path)?;

    if meta.file_type().is_symlink() {
        let target = fs::read_link(path)?;
        return Ok(digest_link_target(&target));
    }

    let mut file = File::open(path)?;
    let mut hasher = Xxh3::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(render(hasher.digest()))
}

#[cfg(unix)]
fn digest_link_target(target: &Path) -> String {
    use std::os::unix::ffi::OsStrExt;

    digest_bytes(target.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn digest_link_target(target: &Path) -> String {
    digest_bytes(target.to_string_lossy().as_bytes())
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;

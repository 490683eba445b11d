mod compare;
mod config;
mod error;
mod fingerprint;
mod group;
mod pool;
mod sequencer;

pub use compare::Comparator;
pub use config::{DIGEST_HEX_LEN, READ_BUFFER_SIZE};
pub use error::PoolError;
pub use fingerprint::{ContentFingerprint, Fingerprint, digest_bytes, fingerprint_path};
pub use group::{DuplicateGroup, GroupKey, group, group_by_digest, group_by_name};
pub use pool::{TaskHandle, WorkerPool};
pub use sequencer::{Scan, ScanOptions, Scanner};

pub use twin_fs::{FileRecord, WalkOptions};

mod excludes;
mod record;
mod walker;

pub use excludes::{IgnoreEngine, IgnoreOptions, UserExcludes};
pub use record::{FileRecord, WalkEntry};
pub use walker::{WalkOptions, Walker};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use twin_runtime::DEFAULT_PROJECT_IGNORE_PATTERNS;

#[derive(Clone)]
pub struct IgnoreEngine {
    matcher: Gitignore,
}

#[derive(Debug, Clone, Default)]
pub struct UserExcludes {
    roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreOptions {
    /// Whether to use the default project ignore patterns
    pub use_default_patterns: bool,

    /// Extra gitignore-style patterns, e.g. from `--exclude`
    pub extra_patterns: Box<[String]>,

    /// Paths to additional ignore files
    pub extra_ignore_files: Box<[PathBuf]>,
}

impl Default for IgnoreEngine {
    fn default() -> Self {
        IgnoreEngine {
            matcher: Gitignore::empty(),
        }
    }
}

impl std::fmt::Debug for IgnoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgnoreEngine")
            .field("patterns", &self.matcher.num_ignores())
            .finish()
    }
}

impl IgnoreEngine {
    /// Build an IgnoreEngine rooted at `root`.
    ///
    /// Patterns containing a slash are anchored at `root`; bare names match at any depth.
    pub fn new(root: &Path, options: Option<IgnoreOptions>) -> Result<Self, ignore::Error> {
        let IgnoreOptions {
            use_default_patterns,
            extra_patterns,
            extra_ignore_files,
        } = options.unwrap_or_default();
        let mut builder = GitignoreBuilder::new(root);

        if use_default_patterns {
            for pat in DEFAULT_PROJECT_IGNORE_PATTERNS {
                builder.add_line(None, pat)?;
            }
        }

        for pat in &*extra_patterns {
            builder.add_line(None, pat)?;
        }

        for path in &*extra_ignore_files {
            if let Some(err) = builder.add(path) {
                return Err(err);
            }
        }

        Ok(IgnoreEngine {
            matcher: builder.build()?,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        // Parents are checked when they are descended, so only the path
        // itself needs matching here.
        self.matcher.matched(path, is_dir).is_ignore()
    }
}

impl UserExcludes {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut ux = UserExcludes::default();
        for root in roots {
            ux.add_root(root);
        }
        ux
    }

    pub fn with_system_defaults() -> Self {
        let mut ux = UserExcludes::default();
        #[cfg(unix)]
        {
            use twin_runtime::DEFAULT_SYSTEM_SKIP_PREFIXES;

            for p in DEFAULT_SYSTEM_SKIP_PREFIXES {
                ux.add_root(PathBuf::from(p));
            }
        }
        ux
    }

    pub fn add_root(&mut self, root: PathBuf) {
        // Canonicalize here because on certain systems, /var/run
        // actually points to /run.
        let root = match root.canonicalize() {
            Ok(p) => p,
            Err(_) => root,
        };

        // New root is already covered by an existing one
        if self.roots.iter().any(|existing| root.starts_with(existing)) {
            return;
        }

        self.roots.retain(|existing| !existing.starts_with(&root));

        self.roots.push(root);
    }

    #[inline]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

#[cfg(test)]
#[path = "excludes_tests.rs"]
mod tests;

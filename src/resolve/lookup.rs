//! Remote lookup: where declarations from other packages come from
//!
//! The resolver never reads other packages itself. Whenever an interface
//! embeds something like `io.Reader` it asks a [`RemoteLookup`] for the
//! declaration, so tests can hand it a table and real runs can point it at a
//! Go source tree.

use crate::Settings;
use crate::parsing::ast::{Declaration, PackageUnit};
use crate::parsing::go::PackageLoader;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Provides declarations of other packages by import path and identifier.
pub trait RemoteLookup {
    /// `None` means not found; only the embedding that asked is abandoned.
    fn lookup(&self, import_path: &str, identifier: &str) -> Option<Declaration>;
}

impl<F> RemoteLookup for F
where
    F: Fn(&str, &str) -> Option<Declaration>,
{
    fn lookup(&self, import_path: &str, identifier: &str) -> Option<Declaration> {
        self(import_path, identifier)
    }
}

/// Lookup that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemoteLookup;

impl RemoteLookup for NoRemoteLookup {
    fn lookup(&self, _import_path: &str, _identifier: &str) -> Option<Declaration> {
        None
    }
}

/// In-memory packages keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    packages: HashMap<String, PackageUnit>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, import_path: impl Into<String>, unit: PackageUnit) -> Self {
        self.insert(import_path, unit);
        self
    }

    pub fn insert(&mut self, import_path: impl Into<String>, unit: PackageUnit) {
        let import_path = import_path.into();
        let unit = unit.with_import_path(import_path.clone());
        self.packages.insert(import_path, unit);
    }

    pub fn package(&self, import_path: &str) -> Option<&PackageUnit> {
        self.packages.get(import_path)
    }
}

impl RemoteLookup for StaticLookup {
    fn lookup(&self, import_path: &str, identifier: &str) -> Option<Declaration> {
        self.packages
            .get(import_path)?
            .declaration(identifier)
            .cloned()
    }
}

/// Loads imported packages from directory trees laid out by import path.
///
/// Each root is searched in order for `<root>/<import/path>`, typically
/// `$GOROOT/src` followed by vendor or module directories. A package is
/// loaded at most once; misses are cached too.
pub struct SourceTreeLookup {
    roots: Vec<PathBuf>,
    loader: PackageLoader,
    packages: Mutex<HashMap<String, Option<Arc<PackageUnit>>>>,
}

impl SourceTreeLookup {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            loader: PackageLoader::new(),
            packages: Mutex::new(HashMap::new()),
        }
    }

    /// Roots from `lookup` settings. Imported packages never include their test files.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.lookup.roots())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// The package at `import_path`, loading it on first use.
    pub fn package(&self, import_path: &str) -> Option<Arc<PackageUnit>> {
        let mut packages = self.packages.lock();
        if let Some(cached) = packages.get(import_path) {
            trace!("package cache hit for {import_path}");
            return cached.clone();
        }

        let unit = self.load(import_path).map(Arc::new);
        packages.insert(import_path.to_string(), unit.clone());
        unit
    }

    fn load(&self, import_path: &str) -> Option<PackageUnit> {
        for root in &self.roots {
            let dir = package_dir(root, import_path);
            if !dir.is_dir() {
                continue;
            }
            debug!("loading {import_path} from {}", dir.display());
            match self.loader.load_dir(&dir) {
                Ok(unit) => return Some(unit.with_import_path(import_path)),
                Err(err) => {
                    warn!(
                        import_path,
                        status = %err.status_code(),
                        "failed to load package: {err}"
                    );
                    return None;
                }
            }
        }
        debug!("{import_path} not found under {} roots", self.roots.len());
        None
    }
}

impl RemoteLookup for SourceTreeLookup {
    fn lookup(&self, import_path: &str, identifier: &str) -> Option<Declaration> {
        self.package(import_path)?.declaration(identifier).cloned()
    }
}

fn package_dir(root: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

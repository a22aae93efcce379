//! Package assembly from Go source files
//!
//! A Go package is one directory. The loader parses every `.go` file in it
//! (not recursing into subdirectories), checks that they agree on the package
//! name and merges their declarations into a single [`PackageUnit`].

use crate::Settings;
use crate::error::{LoadError, LoadResult};
use crate::parsing::ast::{PackageUnit, SourceFile};
use crate::parsing::go::GoParser;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct PackageLoader {
    include_tests: bool,
}

impl PackageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            include_tests: settings.loader.include_tests,
        }
    }

    /// Also load `_test.go` files of the package itself.
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Load the package in `dir`, in file name order.
    pub fn load_dir(&self, dir: &Path) -> LoadResult<PackageUnit> {
        let mut sources = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| LoadError::DirectoryRead {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(".go") {
                continue;
            }
            if !self.include_tests && file_name.ends_with("_test.go") {
                debug!("skipping test file {}", entry.path().display());
                continue;
            }

            let code = std::fs::read_to_string(entry.path()).map_err(|source| LoadError::FileRead {
                path: entry.path().to_path_buf(),
                source,
            })?;
            sources.push((entry.path().display().to_string(), code));
        }

        if sources.is_empty() {
            return Err(LoadError::EmptyPackage {
                path: dir.to_path_buf(),
            });
        }

        self.load_sources(sources.iter().map(|(path, code)| (path.as_str(), code.as_str())))
    }

    /// Assemble a package from in-memory `(path, source)` pairs.
    pub fn load_sources<'s>(
        &self,
        sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> LoadResult<PackageUnit> {
        let mut parser = GoParser::new()?;
        let mut files = Vec::new();

        for (path, code) in sources {
            if is_ignored_by_build_constraint(code) {
                debug!("skipping {path}: excluded by build constraint");
                continue;
            }
            if !self.include_tests && path.ends_with("_test.go") {
                continue;
            }
            files.push(parser.parse_file(path, code)?);
        }

        merge_files(files)
    }
}

fn merge_files(files: Vec<SourceFile>) -> LoadResult<PackageUnit> {
    let Some(expected) = files
        .iter()
        .find(|file| !file.package.ends_with("_test"))
        .or(files.first())
        .map(|file| file.package.clone())
    else {
        return Err(LoadError::EmptyPackage {
            path: Default::default(),
        });
    };
    let external_tests = format!("{expected}_test");

    let mut unit = PackageUnit::new(expected.clone());
    for file in files {
        if file.package != expected {
            // black-box tests live next to the package under `<name>_test`
            if file.package == external_tests && file.path.ends_with("_test.go") {
                debug!("skipping external test file {}", file.path);
                continue;
            }
            return Err(LoadError::PackageMismatch {
                file: file.path,
                expected,
                found: file.package,
            });
        }
        unit.declarations.extend(file.declarations);
    }

    debug!(
        package = %unit.name,
        declarations = unit.declarations.len(),
        "assembled package"
    );
    Ok(unit)
}

/// `//go:build ignore` (or the legacy `// +build ignore`) before the package clause.
fn is_ignored_by_build_constraint(code: &str) -> bool {
    code.lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("package "))
        .any(|line| line == "//go:build ignore" || line == "// +build ignore")
}

impl PackageUnit {
    /// Build a package from in-memory sources with the default loader.
    pub fn from_sources<'s>(
        sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> LoadResult<PackageUnit> {
        PackageLoader::new().load_sources(sources)
    }
}

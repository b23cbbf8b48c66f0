use crate::error::{JavaUmlError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Direct contents of one source directory, in file-name order.
#[derive(Debug, Default)]
pub struct DirListing {
    pub java_files: Vec<PathBuf>,
    pub subdirectories: Vec<PathBuf>,
}

pub struct Scanner {
    root: PathBuf,
    exclude: Vec<Pattern>,
}

impl Scanner {
    pub fn new(root: &Path, exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| JavaUmlError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            exclude,
        })
    }

    /// List `.java` files and subdirectories directly inside `dir`.
    pub fn list(&self, dir: &Path) -> Result<DirListing> {
        let mut listing = DirListing::default();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                JavaUmlError::io(path, e.into())
            })?;
            let path = entry.path();

            if self.is_excluded(path) {
                continue;
            }

            if entry.file_type().is_dir() {
                listing.subdirectories.push(path.to_path_buf());
            } else if is_java_file(path) {
                listing.java_files.push(path.to_path_buf());
            }
        }

        Ok(listing)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

pub fn is_java_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext == "java")
}

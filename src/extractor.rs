//! Builds a [`Project`] from a Java source tree.
//!
//! `.java` files directly in the root become top-level classes; each
//! subdirectory becomes a package, populated the same way. Files that do not
//! parse are skipped with a warning. Once every file is read the project is
//! normalized: nesting-only packages are collapsed, class names indexed, and
//! containment inferred from field types.

use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, PackageInfo, Project};
use crate::parser::JavaParser;
use crate::scanner::Scanner;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Extraction {
    pub project: Project,
    pub files_parsed: usize,
    pub files_skipped: Vec<PathBuf>,
}

/// Extract and normalize the project rooted at `source`.
pub fn read_source_folder(source: &Path, exclude: &[String]) -> Result<Project> {
    extract(source, exclude).map(|extraction| extraction.project)
}

pub fn extract(source: &Path, exclude: &[String]) -> Result<Extraction> {
    if !source.is_dir() {
        return Err(JavaUmlError::SourceFolderNotFound(source.to_path_buf()));
    }

    // Surface a broken grammar once instead of once per file
    JavaParser::new()?;

    let scanner = Scanner::new(source, exclude)?;
    let mut extraction = Extraction::default();

    let (classes, packages) = read_directory(&scanner, source, &mut extraction)?;
    for class in classes {
        extraction.project.add_class(class);
    }
    for package in packages {
        extraction.project.add_package(package);
    }

    extraction.project.normalize();

    tracing::info!(
        source = %source.display(),
        classes = extraction.project.class_count(),
        parsed = extraction.files_parsed,
        skipped = extraction.files_skipped.len(),
        "extracted java project"
    );

    Ok(extraction)
}

fn read_directory(
    scanner: &Scanner,
    dir: &Path,
    extraction: &mut Extraction,
) -> Result<(Vec<ClassInfo>, Vec<PackageInfo>)> {
    let listing = scanner.list(dir)?;

    let classes = parse_files(&listing.java_files, extraction);

    let mut packages = Vec::with_capacity(listing.subdirectories.len());
    for subdir in &listing.subdirectories {
        packages.push(read_package(scanner, subdir, extraction)?);
    }

    Ok((classes, packages))
}

fn read_package(scanner: &Scanner, dir: &Path, extraction: &mut Extraction) -> Result<PackageInfo> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let (classes, packages) = read_directory(scanner, dir, extraction)?;
    let mut package = PackageInfo::new(name);
    for class in classes {
        package.add_class(class);
    }
    for child in packages {
        package.add_package(child);
    }
    Ok(package)
}

/// Parse files in parallel, keeping listing order in the result.
fn parse_files(files: &[PathBuf], extraction: &mut Extraction) -> Vec<ClassInfo> {
    let results: Vec<Option<Vec<ClassInfo>>> = files
        .par_iter()
        .map_init(
            || JavaParser::new().ok(),
            |parser, path| {
                let parser = parser.as_mut()?;
                match parser.parse_file(path) {
                    Ok(classes) => Some(classes),
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", path.display(), e);
                        None
                    }
                }
            },
        )
        .collect();

    let mut classes = Vec::new();
    for (path, result) in files.iter().zip(results) {
        match result {
            Some(parsed) => {
                extraction.files_parsed += 1;
                classes.extend(parsed);
            }
            None => extraction.files_skipped.push(path.clone()),
        }
    }
    classes
}

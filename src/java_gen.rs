//! Java skeleton generation from the project model.
//!
//! Each class becomes `<Name>.java` under a directory tree mirroring its
//! packages. Files that already exist are merged instead of overwritten, see
//! [`merge`].

pub mod merge;

use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, ClassKind, FieldInfo, MethodInfo, PackageInfo, Project};
use crate::parser::JavaParser;
use merge::{merge_file, MergeOutcome};
use std::path::{Component, Path, PathBuf};

const INDENT: &str = "    ";
const BODY_INDENT: &str = "        ";
const TODO_MARKER: &str = "//TODO";

/// Files touched by one generation run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub created: Vec<PathBuf>,
    pub merged: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.merged.len() + self.unchanged.len() + self.skipped.len()
    }
}

pub struct JavaGenerator {
    parser: JavaParser,
}

impl JavaGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: JavaParser::new()?,
        })
    }

    /// Write top-level classes into `root` and packages into mirrored
    /// subdirectories, depth-first.
    pub fn write_project(&mut self, project: &Project, root: &Path) -> Result<GenerateReport> {
        let mut report = GenerateReport::default();
        create_dir(root)?;

        for package in &project.packages {
            self.write_package(package, root, &mut report)?;
        }
        for class in &project.classes {
            self.write_class(class, root, &mut report)?;
        }

        tracing::info!(
            created = report.created.len(),
            merged = report.merged.len(),
            unchanged = report.unchanged.len(),
            skipped = report.skipped.len(),
            "java generation finished"
        );
        Ok(report)
    }

    fn write_package(
        &mut self,
        package: &PackageInfo,
        parent: &Path,
        report: &mut GenerateReport,
    ) -> Result<()> {
        if !is_relative_path(&package.name) {
            tracing::warn!("Skipping package {:?}: not a relative path", package.name);
            report.skipped.push(parent.join(&package.name));
            return Ok(());
        }
        let dir = parent.join(&package.name);
        create_dir(&dir)?;

        for child in &package.packages {
            self.write_package(child, &dir, report)?;
        }
        for class in &package.classes {
            self.write_class(class, &dir, report)?;
        }
        Ok(())
    }

    fn write_class(&mut self, class: &ClassInfo, dir: &Path, report: &mut GenerateReport) -> Result<()> {
        let file_name = format!("{}.java", class.name);
        if !is_file_name(&file_name) {
            tracing::warn!("Skipping class {:?}: not a valid file name", class.name);
            report.skipped.push(dir.join(file_name));
            return Ok(());
        }
        let path = dir.join(file_name);

        if !path.exists() {
            let content = class_to_java(class).join("\n") + "\n";
            std::fs::write(&path, content).map_err(|e| JavaUmlError::io(&path, e))?;
            tracing::debug!("Created {}", path.display());
            report.created.push(path);
            return Ok(());
        }

        match merge_file(&mut self.parser, &path, class)? {
            MergeOutcome::Merged { .. } => report.merged.push(path),
            MergeOutcome::Unchanged => report.unchanged.push(path),
            MergeOutcome::Skipped(reason) => {
                tracing::warn!("Not merging into {}: {}", path.display(), reason);
                report.skipped.push(path);
            }
        }
        Ok(())
    }
}

/// Package names come from diagram text; only plain relative components may
/// be joined onto the output root.
fn is_relative_path(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

fn is_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| JavaUmlError::io(dir, e))
}

/// Render a complete Java skeleton for `class`.
pub fn class_to_java(class: &ClassInfo) -> Vec<String> {
    let mut lines = vec![class_declaration(class), String::new()];

    if let Some((last, rest)) = class.enum_types.split_last() {
        for constant in rest {
            lines.push(format!("{}{}(),", INDENT, constant));
        }
        lines.push(format!("{}{}();", INDENT, last));
        lines.push(String::new());
    }

    for field in &class.fields {
        lines.push(field_to_java(field));
    }

    if class.is_enum() {
        lines.push(String::new());
        lines.push(format!("{}{}() {{", INDENT, class.name));
        lines.push(format!("{}{}", BODY_INDENT, TODO_MARKER));
        lines.push(format!("{}}}", INDENT));
    }

    for method in &class.methods {
        method_to_java(&mut lines, method, class.is_interface());
    }

    lines.push("}".to_string());
    lines
}

/// `public [abstract] <class|interface|enum> Name[ extends S][ implements I1, I2] {`
pub fn class_declaration(class: &ClassInfo) -> String {
    let mut line = String::from("public");
    if class.is_abstract {
        line.push_str(" abstract");
    }
    line.push_str(match class.kind {
        ClassKind::Interface => " interface ",
        ClassKind::Enum => " enum ",
        ClassKind::Class => " class ",
    });
    line.push_str(&class.name);

    if let Some(superclass) = &class.superclass {
        line.push_str(" extends ");
        line.push_str(superclass);
    }
    if !class.implemented_interfaces.is_empty() {
        line.push_str(" implements ");
        line.push_str(&class.implemented_interfaces.join(", "));
    }

    line.push_str(" {");
    line
}

fn access(is_private: bool) -> &'static str {
    if is_private {
        "private"
    } else {
        "public"
    }
}

pub fn field_to_java(field: &FieldInfo) -> String {
    format!(
        "{}{} {} {};",
        INDENT,
        access(field.is_private),
        field.field_type,
        field.name
    )
}

/// Append a method preceded by a blank line. Interface methods are bare
/// signatures; everything else gets a placeholder body.
pub fn method_to_java(lines: &mut Vec<String>, method: &MethodInfo, signature_only: bool) {
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.param_type, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let signature = format!(
        "{}{} {} {}({})",
        INDENT,
        access(method.is_private),
        method.return_type,
        method.name,
        params
    );

    lines.push(String::new());
    if signature_only {
        lines.push(format!("{};", signature));
        return;
    }

    lines.push(format!("{} {{", signature));
    lines.push(format!("{}{}", BODY_INDENT, TODO_MARKER));
    if !method.returns_void() {
        lines.push(format!("{}return null;", BODY_INDENT));
    }
    lines.push(format!("{}}}", INDENT));
}

//! Adds members missing from an existing Java file, inserting them past its
//! existing fields.

use super::{field_to_java, method_to_java, INDENT};
use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, FieldInfo, MethodInfo};
use crate::parser::{JavaParser, MemberAnchor};
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged { fields: usize, methods: usize },
    Unchanged,
    Skipped(String),
}

/// Model members absent by name from `existing`, in model order.
pub struct MissingMembers<'a> {
    pub fields: Vec<&'a FieldInfo>,
    pub methods: Vec<&'a MethodInfo>,
}

impl<'a> MissingMembers<'a> {
    pub fn between(existing: &ClassInfo, model: &'a ClassInfo) -> Self {
        Self {
            fields: model.fields.iter().filter(|f| !existing.has_field(&f.name)).collect(),
            methods: model.methods.iter().filter(|m| !existing.has_method(&m.name)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }

    pub fn render(&self, signature_only: bool) -> Vec<String> {
        let mut lines: Vec<String> = self.fields.iter().map(|f| field_to_java(f)).collect();
        for method in &self.methods {
            method_to_java(&mut lines, method, signature_only);
        }
        lines
    }
}

/// Merge `model` into the Java file at `path`.
pub fn merge_file(parser: &mut JavaParser, path: &Path, model: &ClassInfo) -> Result<MergeOutcome> {
    let source = std::fs::read_to_string(path).map_err(|e| JavaUmlError::io(path, e))?;

    let existing = match parser.parse_types(path, &source) {
        Ok(mut types) if types.len() == 1 => types.remove(0),
        Ok(types) => {
            return Ok(MergeOutcome::Skipped(format!(
                "expected exactly one top-level type, found {}",
                types.len()
            )))
        }
        Err(err) => return Ok(MergeOutcome::Skipped(err.to_string())),
    };

    let missing = MissingMembers::between(&existing.class, model);
    if missing.is_empty() {
        return Ok(MergeOutcome::Unchanged);
    }

    let new_lines = missing.render(model.is_interface());
    let merged = splice(&source, existing.anchor, &new_lines);

    std::fs::write(path, merged).map_err(|e| JavaUmlError::io(path, e))?;
    tracing::debug!(
        fields = missing.fields.len(),
        methods = missing.methods.len(),
        "Merged into {}",
        path.display()
    );
    Ok(MergeOutcome::Merged {
        fields: missing.fields.len(),
        methods: missing.methods.len(),
    })
}

/// Insert `new_lines` at `anchor`.
///
/// When only whitespace or a line comment follows the anchor on its line, the
/// block goes after that line and every original line is kept byte for byte.
/// Otherwise (`class Foo {}`) the line is split at the anchor so the block
/// lands inside the body.
pub fn splice(source: &str, anchor: MemberAnchor, new_lines: &[String]) -> String {
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let offset = anchor.offset.min(source.len());
    let rest = &source[offset..];
    let line_rest = rest.split('\n').next().unwrap_or_default();

    let mut block = String::new();
    if anchor.needs_separator {
        block.push_str(INDENT);
        block.push(';');
        block.push_str(newline);
    }
    for line in new_lines {
        block.push_str(line);
        block.push_str(newline);
    }

    let mut out = String::with_capacity(source.len() + block.len() + newline.len());
    let tail = line_rest.trim();
    if tail.is_empty() || tail.starts_with("//") {
        let split = (offset + line_rest.len() + 1).min(source.len());
        out.push_str(&source[..split]);
        if !out.ends_with('\n') {
            out.push_str(newline);
        }
        out.push_str(&block);
        out.push_str(&source[split..]);
    } else {
        out.push_str(&source[..offset]);
        out.push_str(newline);
        out.push_str(&block);
        out.push_str(rest);
    }
    out
}

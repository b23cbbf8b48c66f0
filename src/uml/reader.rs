//! Line-oriented PlantUML reader.
//!
//! One forward pass: every block parser consumes lines from the same
//! [`LineCursor`], so nested packages and classes never re-read a line.
//! Containment arrows are not read back; they are re-inferred from fields.

use super::DIAGRAM_FILE;
use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, ClassKind, FieldInfo, MethodInfo, PackageInfo, ParamInfo, Project};
use regex::Regex;
use std::path::Path;

const CLASS_KEYWORDS: [&str; 4] = ["class", "abstract", "interface", "enum"];

const CLASS_HEADER: &str = r"^\s*(?:(abstract)\s+)?(?:(class|interface|enum)\s+)?([\w$.]+)(?:\s+extends\s+([\w$.]+))?(?:\s+implements\s+([\w$.,\s]+?))?\s*\{?\s*\}?\s*$";
const METHOD_LINE: &str = r"^\s*([+-])?\s*([\w$]+)\s*\((.*)\)\s*:\s*(\S.*?)\s*$";
const FIELD_LINE: &str = r"^\s*([+-])?\s*([\w$]+)\s*:\s*(\S.*?)\s*$";
const PARAM: &str = r"^\s*([\w$]+)\s*:\s*(\S.*?)\s*$";
const QUOTED_NAME: &str = r#""([^"]*)""#;

/// Position in the diagram's lines, shared by every nested block parser.
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

enum BodyLine {
    Field(FieldInfo),
    Method(MethodInfo),
    EnumConstant(String),
}

pub struct UmlReader {
    class_header: Regex,
    method_line: Regex,
    field_line: Regex,
    param: Regex,
    quoted_name: Regex,
}

impl UmlReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            class_header: compile(CLASS_HEADER)?,
            method_line: compile(METHOD_LINE)?,
            field_line: compile(FIELD_LINE)?,
            param: compile(PARAM)?,
            quoted_name: compile(QUOTED_NAME)?,
        })
    }

    pub fn parse(&self, text: &str) -> Project {
        let mut cursor = LineCursor::new(text);
        let mut project = Project::new();

        while let Some(line) = cursor.current() {
            if is_class_header(line) {
                project.add_class(self.read_class(&mut cursor));
            } else if is_package_header(line) {
                project.add_package(self.read_package(&mut cursor));
            } else {
                cursor.advance();
            }
        }

        project.index_class_names();
        project.infer_containment();
        project
    }

    /// Read a `package "name" {` block through its closing brace.
    fn read_package(&self, cursor: &mut LineCursor<'_>) -> PackageInfo {
        let header = cursor.current().unwrap_or_default();
        let mut package = PackageInfo::new(self.package_name(header));
        cursor.advance();

        if closes_on_same_line(header) {
            return package;
        }

        // Headers first: `class Marker {}` holds a brace but does not close us
        while let Some(line) = cursor.current() {
            if is_class_header(line) {
                package.add_class(self.read_class(cursor));
            } else if is_package_header(line) {
                package.add_package(self.read_package(cursor));
            } else if line.contains('}') {
                cursor.advance();
                break;
            } else {
                cursor.advance();
            }
        }

        package
    }

    fn package_name(&self, header: &str) -> String {
        if let Some(caps) = self.quoted_name.captures(header) {
            return caps[1].to_string();
        }
        // Unquoted: the token following the keyword
        header
            .split_whitespace()
            .skip_while(|token| *token != "package")
            .nth(1)
            .map(|token| token.trim_end_matches('{').to_string())
            .unwrap_or_default()
    }

    /// Read a class header and its body lines through the closing brace.
    fn read_class(&self, cursor: &mut LineCursor<'_>) -> ClassInfo {
        let header = cursor.current().unwrap_or_default();
        let mut class = self.parse_class_header(header);
        cursor.advance();

        if closes_on_same_line(header) {
            return class;
        }

        while let Some(line) = cursor.current() {
            cursor.advance();
            if line.contains('}') {
                break;
            }
            match self.parse_body_line(line) {
                Some(BodyLine::Field(field)) => class.add_field(field),
                Some(BodyLine::Method(method)) => class.add_method(method),
                Some(BodyLine::EnumConstant(name)) => class.add_enum_type(name),
                None => {}
            }
        }

        class
    }

    fn parse_class_header(&self, header: &str) -> ClassInfo {
        let Some(caps) = self.class_header.captures(header) else {
            tracing::debug!("Unrecognized class header: {}", header.trim());
            return fallback_class_header(header);
        };

        let kind = match caps.get(2).map(|m| m.as_str()) {
            Some("interface") => ClassKind::Interface,
            Some("enum") => ClassKind::Enum,
            _ => ClassKind::Class,
        };

        let mut class = ClassInfo::new(&caps[3], kind);
        class.is_abstract = caps.get(1).is_some();
        class.superclass = caps.get(4).map(|m| m.as_str().to_string());
        if let Some(list) = caps.get(5) {
            class.implemented_interfaces = list
                .as_str()
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        class
    }

    fn parse_body_line(&self, line: &str) -> Option<BodyLine> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(caps) = self.method_line.captures(trimmed) {
            let mut method = MethodInfo::new(&caps[2], &caps[4], is_private(caps.get(1)));
            method.parameters = self.parse_params(&caps[3]);
            return Some(BodyLine::Method(method));
        }

        if let Some(caps) = self.field_line.captures(trimmed) {
            return Some(BodyLine::Field(FieldInfo::new(
                &caps[2],
                &caps[3],
                is_private(caps.get(1)),
            )));
        }

        // Anything else inside a class block is kept as an enum constant
        Some(BodyLine::EnumConstant(trimmed.to_string()))
    }

    fn parse_params(&self, params: &str) -> Vec<ParamInfo> {
        params
            .split(',')
            .filter_map(|param| self.param.captures(param))
            .map(|caps| ParamInfo::new(&caps[1], &caps[2]))
            .collect()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| JavaUmlError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn is_private(visibility: Option<regex::Match<'_>>) -> bool {
    visibility.map_or(false, |m| m.as_str() == "-")
}

pub fn is_class_header(line: &str) -> bool {
    line.split_whitespace()
        .any(|token| CLASS_KEYWORDS.contains(&token))
}

pub fn is_package_header(line: &str) -> bool {
    line.split_whitespace().any(|token| token == "package")
}

fn closes_on_same_line(header: &str) -> bool {
    header.contains('}')
}

/// Best effort for headers the regex rejects, e.g. `class Box<T> {`: the
/// first token that is not a keyword becomes the name.
fn fallback_class_header(header: &str) -> ClassInfo {
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let kind = if tokens.contains(&"interface") {
        ClassKind::Interface
    } else if tokens.contains(&"enum") {
        ClassKind::Enum
    } else {
        ClassKind::Class
    };
    let name = tokens
        .iter()
        .find(|token| !CLASS_KEYWORDS.contains(*token))
        .map(|token| token.trim_end_matches('{'))
        .unwrap_or("Unknown");

    let mut class = ClassInfo::new(name, kind);
    class.is_abstract = tokens.contains(&"abstract");
    class
}

/// Parse diagram text into a project.
pub fn parse_uml(text: &str) -> Result<Project> {
    Ok(UmlReader::new()?.parse(text))
}

/// Read a diagram from a `.puml` file, or from `diagram.puml` inside a
/// directory.
pub fn read_uml_file(path: &Path) -> Result<Project> {
    let file = if path.is_dir() {
        path.join(DIAGRAM_FILE)
    } else {
        path.to_path_buf()
    };
    let text = std::fs::read_to_string(&file).map_err(|e| JavaUmlError::io(&file, e))?;
    parse_uml(&text)
}

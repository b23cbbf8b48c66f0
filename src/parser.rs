pub mod syntax;

use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, ClassKind, FieldInfo, MethodInfo, ParamInfo};
use std::path::Path;
use syntax::{field_text, first_error, first_token, has_modifier, qualified_name};
use tree_sitter::{Node, Parser};

const UNKNOWN_TYPE: &str = "Object";
const UNKNOWN_NAME: &str = "unknown";

/// Byte offset where new members can be added to a parsed type: just past
/// its last field, else past its enum constants, else past the opening brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberAnchor {
    pub offset: usize,
    /// Enum body whose constants are not yet followed by `;`.
    pub needs_separator: bool,
}

/// A top-level type together with where its members end in the source.
#[derive(Debug)]
pub struct ParsedType {
    pub class: ClassInfo,
    pub anchor: MemberAnchor,
}

/// Extracts top-level type declarations from Java source.
///
/// Holds a tree-sitter parser, which is not `Sync`; create one per thread.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| JavaUmlError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<ClassInfo>> {
        let content = std::fs::read_to_string(path).map_err(|e| JavaUmlError::io(path, e))?;
        let classes = self.parse_source(path, &content)?;
        tracing::debug!(file = %path.display(), classes = classes.len(), "parsed java file");
        Ok(classes)
    }

    /// Parse `content`, rejecting it when the tree holds any syntax error.
    /// `path` is only used for error reporting.
    pub fn parse_source(&mut self, path: &Path, content: &str) -> Result<Vec<ClassInfo>> {
        let types = self.parse_types(path, content)?;
        Ok(types.into_iter().map(|parsed| parsed.class).collect())
    }

    /// Like [`JavaParser::parse_source`], also locating where each type's
    /// members end.
    pub fn parse_types(&mut self, path: &Path, content: &str) -> Result<Vec<ParsedType>> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| JavaUmlError::parse(path, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => {
                    let pos = node.start_position();
                    format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1)
                }
                None => "syntax error".to_string(),
            };
            return Err(JavaUmlError::parse(path, message));
        }

        let source = content.as_bytes();
        let mut types = Vec::new();
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            let class = match decl.kind() {
                "class_declaration" => self.extract_class(decl, source),
                "interface_declaration" => self.extract_type(decl, source, ClassKind::Interface),
                "enum_declaration" => self.extract_type(decl, source, ClassKind::Enum),
                _ => continue,
            };
            let anchor = match decl.child_by_field_name("body") {
                Some(body) => member_anchor(body),
                None => MemberAnchor {
                    offset: decl.end_byte(),
                    needs_separator: false,
                },
            };
            types.push(ParsedType { class, anchor });
        }

        Ok(types)
    }

    fn extract_class(&self, decl: Node<'_>, source: &[u8]) -> ClassInfo {
        let mut class = self.extract_type(decl, source, ClassKind::Class);
        class.is_abstract = has_modifier(decl, "abstract");

        class.superclass = decl
            .child_by_field_name("superclass")
            .and_then(|node| qualified_name(node, source));

        if let Some(interfaces) = decl.child_by_field_name("interfaces") {
            let mut cursor = interfaces.walk();
            let type_list = interfaces
                .named_children(&mut cursor)
                .find(|child| child.kind() == "type_list");
            if let Some(type_list) = type_list {
                let mut cursor = type_list.walk();
                class.implemented_interfaces = type_list
                    .named_children(&mut cursor)
                    .filter_map(|ty| qualified_name(ty, source))
                    .collect();
            }
        }

        class
    }

    fn extract_type(&self, decl: Node<'_>, source: &[u8], kind: ClassKind) -> ClassInfo {
        let name = field_text(decl, "name", source).unwrap_or_else(|| "Unknown".to_string());
        let mut class = ClassInfo::new(name, kind);

        if let Some(body) = decl.child_by_field_name("body") {
            self.extract_members(body, source, &mut class);
        }

        class
    }

    fn extract_members(&self, body: Node<'_>, source: &[u8], class: &mut ClassInfo) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" => {
                    for field in self.extract_fields(member, source) {
                        class.add_field(field);
                    }
                }
                "method_declaration" => {
                    let mut method = self.extract_method(member, source);
                    // Interfaces cannot declare private members here
                    if class.is_interface() {
                        method.is_private = false;
                    }
                    class.add_method(method);
                }
                "enum_constant" => {
                    if let Some(name) = field_text(member, "name", source) {
                        class.add_enum_type(name);
                    }
                }
                "enum_body_declarations" => self.extract_members(member, source, class),
                _ => {}
            }
        }
    }

    fn extract_fields(&self, decl: Node<'_>, source: &[u8]) -> Vec<FieldInfo> {
        let field_type = declared_type(decl, source, UNKNOWN_TYPE);
        let is_private = has_modifier(decl, "private");

        let mut cursor = decl.walk();
        let fields = decl
            .children_by_field_name("declarator", &mut cursor)
            .filter_map(|declarator| field_text(declarator, "name", source))
            .map(|name| FieldInfo::new(name, field_type.clone(), is_private))
            .collect();
        fields
    }

    fn extract_method(&self, decl: Node<'_>, source: &[u8]) -> MethodInfo {
        let name = field_text(decl, "name", source).unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let return_type = declared_type(decl, source, crate::model::member_info::VOID);
        let mut method = MethodInfo::new(name, return_type, has_modifier(decl, "private"));

        if let Some(params) = decl.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            // Varargs (`spread_parameter`) and receiver parameters are not captured
            method.parameters = params
                .named_children(&mut cursor)
                .filter(|param| param.kind() == "formal_parameter")
                .map(|param| {
                    ParamInfo::new(
                        field_text(param, "name", source).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                        declared_type(param, source, UNKNOWN_TYPE),
                    )
                })
                .collect();
        }

        method
    }
}

fn member_anchor(body: Node<'_>) -> MemberAnchor {
    let is_enum = body.kind() == "enum_body";
    let mut cursor = body.walk();
    let members: Vec<Node<'_>> = body.named_children(&mut cursor).collect();
    let declarations = members
        .iter()
        .copied()
        .find(|member| member.kind() == "enum_body_declarations");

    // Enum fields only live after the `;` separator
    let field_parent = if is_enum { declarations } else { Some(body) };
    if let Some(field) = field_parent.and_then(last_field) {
        return MemberAnchor {
            offset: field.end_byte(),
            needs_separator: false,
        };
    }

    if !is_enum {
        return MemberAnchor {
            offset: opening_brace_end(body),
            needs_separator: false,
        };
    }

    if let Some(declarations) = declarations {
        let offset = declarations
            .child(0)
            .filter(|separator| separator.kind() == ";")
            .map_or(declarations.start_byte(), |separator| separator.end_byte());
        return MemberAnchor {
            offset,
            needs_separator: false,
        };
    }

    let offset = members
        .iter()
        .rev()
        .find(|member| member.kind() == "enum_constant")
        .map(|constant| match constant.next_sibling() {
            Some(comma) if comma.kind() == "," => comma.end_byte(),
            _ => constant.end_byte(),
        })
        .unwrap_or_else(|| opening_brace_end(body));
    MemberAnchor {
        offset,
        needs_separator: true,
    }
}

fn last_field<'t>(parent: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = parent.walk();
    let last = parent
        .named_children(&mut cursor)
        .filter(|member| member.kind() == "field_declaration")
        .last();
    last
}

fn opening_brace_end(body: Node<'_>) -> usize {
    body.child(0)
        .filter(|brace| brace.kind() == "{")
        .map_or(body.start_byte() + 1, |brace| brace.end_byte())
}

fn declared_type(decl: Node<'_>, source: &[u8], fallback: &str) -> String {
    decl.child_by_field_name("type")
        .and_then(|ty| first_token(ty, source))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(code: &str) -> Vec<ClassInfo> {
        let mut parser = JavaParser::new().unwrap();
        parser.parse_source(Path::new("Test.java"), code).unwrap()
    }

    #[test]
    fn test_parse_simple_class() {
        let classes = parse(
            r#"
public class Point {
    private int x;
    private int y;
    public int getX() { return x; }
}
"#,
        );

        assert_eq!(classes.len(), 1);
        let point = &classes[0];
        assert_eq!(point.name, "Point");
        assert_eq!(point.kind, ClassKind::Class);
        assert!(!point.is_abstract);
        assert_eq!(
            point.fields,
            vec![FieldInfo::new("x", "int", true), FieldInfo::new("y", "int", true)]
        );
        assert_eq!(point.methods, vec![MethodInfo::new("getX", "int", false)]);
    }

    #[test]
    fn test_parse_extends_and_implements() {
        let classes = parse(
            r#"
import java.io.Serializable;

public abstract class Shape extends com.acme.Base<String> implements Serializable, Comparable<Shape> {
}
"#,
        );

        let shape = &classes[0];
        assert!(shape.is_abstract);
        assert_eq!(shape.superclass.as_deref(), Some("com.acme.Base"));
        assert_eq!(shape.implemented_interfaces, vec!["Serializable", "Comparable"]);
    }

    #[test]
    fn test_parse_multiple_declarators() {
        let classes = parse("class Pair { public String left, right; }");
        let names: Vec<_> = classes[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["left", "right"]);
        assert!(classes[0].fields.iter().all(|f| f.field_type == "String" && !f.is_private));
    }

    #[test]
    fn test_parse_first_token_types() {
        let classes = parse(
            r#"
class Holder {
    java.util.List<Item> items;
    String[] names;
    Map<String, Integer> counts;
}
"#,
        );
        let types: Vec<_> = classes[0].fields.iter().map(|f| f.field_type.as_str()).collect();
        assert_eq!(types, vec!["java", "String", "Map"]);
    }

    #[test]
    fn test_parse_method_parameters() {
        let classes = parse(
            r#"
class Service {
    private void log(String message, int level) {}
    public Result run(Request req, String... args) { return null; }
    Service() {}
}
"#,
        );

        let methods = &classes[0].methods;
        assert_eq!(methods.len(), 2);
        assert_eq!(
            methods[0],
            MethodInfo::new("log", "void", true)
                .with_param("message", "String")
                .with_param("level", "int")
        );
        assert_eq!(
            methods[1],
            MethodInfo::new("run", "Result", false).with_param("req", "Request")
        );
    }

    #[test]
    fn test_parse_interface() {
        let classes = parse(
            r#"
public interface Repository extends Base {
    Item find(long id);
    void save(Item item);
    private void helper() {}
}
"#,
        );

        let repo = &classes[0];
        assert_eq!(repo.kind, ClassKind::Interface);
        assert!(repo.superclass.is_none());
        assert_eq!(repo.methods.len(), 3);
        assert_eq!(repo.methods[2].name, "helper");
        assert!(repo.methods.iter().all(|m| !m.is_private));
        assert_eq!(repo.methods[0].parameters, vec![ParamInfo::new("id", "long")]);
    }

    #[test]
    fn test_parse_enum() {
        let classes = parse(
            r#"
public enum Color {
    RED, GREEN, BLUE;

    private int code;
    public int getCode() { return code; }
}
"#,
        );

        let color = &classes[0];
        assert_eq!(color.kind, ClassKind::Enum);
        assert_eq!(color.enum_types, vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(color.fields, vec![FieldInfo::new("code", "int", true)]);
        assert_eq!(color.methods[0].name, "getCode");
    }

    #[test]
    fn test_parse_multiple_top_level_types() {
        let classes = parse("class A {}\ninterface B {}\nenum C { X }\n");
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_invalid_source() {
        let mut parser = JavaParser::new().unwrap();
        let result = parser.parse_source(Path::new("Broken.java"), "public class Broken { void m( }");
        assert!(matches!(result, Err(JavaUmlError::Parse { .. })));
    }

    fn anchor(code: &str) -> MemberAnchor {
        let mut parser = JavaParser::new().unwrap();
        let types = parser.parse_types(Path::new("Test.java"), code).unwrap();
        types[0].anchor
    }

    #[test]
    fn test_anchor_after_last_field() {
        let code = "class Foo {\n    int a;\n    void m() {}\n    int b;\n}\n";
        let found = anchor(code);
        assert_eq!(&code[..found.offset], "class Foo {\n    int a;\n    void m() {}\n    int b;");
        assert!(!found.needs_separator);
    }

    #[test]
    fn test_anchor_after_opening_brace() {
        let code = "// Foo helpers\npublic class Foo {}\n";
        let found = anchor(code);
        assert_eq!(&code[found.offset..], "}\n");
    }

    #[test]
    fn test_anchor_in_enum() {
        let code = "enum Color {\n    RED, GREEN;\n}\n";
        assert_eq!(&code[anchor(code).offset..], "\n}\n");

        let code = "enum Color {\n    RED, GREEN;\n    private int code;\n}\n";
        assert_eq!(&code[anchor(code).offset..], "\n}\n");

        let code = "enum Color { RED, GREEN, }";
        let found = anchor(code);
        assert_eq!(&code[found.offset..], " }");
        assert!(found.needs_separator);
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::with_suffix(".java").unwrap();
        file.write_all(b"public class Engine { private int power; }").unwrap();

        let mut parser = JavaParser::new().unwrap();
        let classes = parser.parse_file(file.path()).unwrap();
        assert_eq!(classes[0].name, "Engine");
        assert_eq!(classes[0].fields[0].field_type, "int");
    }
}

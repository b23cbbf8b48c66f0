use super::{DIAGRAM_FILE, END_MARKER, START_MARKER};
use crate::error::{JavaUmlError, Result};
use crate::model::{ClassInfo, ClassKind, FieldInfo, MethodInfo, PackageInfo, Project};
use std::path::{Path, PathBuf};

pub struct UmlWriter<'a> {
    project: &'a Project,
}

impl<'a> UmlWriter<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![START_MARKER.to_string()];

        for package in &self.project.packages {
            write_package(&mut lines, package, 0);
        }
        for class in &self.project.classes {
            write_class(&mut lines, class, 0);
        }

        // Arrows for top-level classes come before those nested in packages
        for class in &self.project.classes {
            self.write_arrows(&mut lines, class);
        }
        for package in &self.project.packages {
            package.for_each_class(&mut |class| self.write_arrows(&mut lines, class));
        }

        lines.push(END_MARKER.to_string());
        lines
    }

    fn write_arrows(&self, lines: &mut Vec<String>, class: &ClassInfo) {
        for (contained, count) in containment_counts(class, self.project) {
            if count == 1 {
                lines.push(format!("{} o-- {}: contains", class.name, contained));
            } else {
                lines.push(format!(
                    r#"{} "1" o-- "many" {}: contains"#,
                    class.name, contained
                ));
            }
        }
    }
}

impl Project {
    /// Render the project as PlantUML lines, `@startuml` through `@enduml`.
    pub fn to_uml(&self) -> Vec<String> {
        UmlWriter::new(self).render()
    }
}

/// Contained class names known to the project, with the number of fields
/// typed by each, in first-seen order.
fn containment_counts<'c>(class: &'c ClassInfo, project: &Project) -> Vec<(&'c str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for contained in &class.contained_classes {
        if !project.is_known_class(contained) {
            continue;
        }
        match counts.iter_mut().find(|(name, _)| *name == contained.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((contained.as_str(), 1)),
        }
    }
    counts
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * 2)
}

fn write_package(lines: &mut Vec<String>, package: &PackageInfo, depth: usize) {
    let pad = indent(depth);
    lines.push(format!(r#"{}package "{}" {{"#, pad, package.name));
    for class in &package.classes {
        write_class(lines, class, depth + 1);
    }
    for child in &package.packages {
        write_package(lines, child, depth + 1);
    }
    lines.push(format!("{}}}", pad));
}

fn write_class(lines: &mut Vec<String>, class: &ClassInfo, depth: usize) {
    let pad = indent(depth);
    let inner = indent(depth + 1);

    lines.push(format!("{}{} {{", pad, class_header(class)));
    for constant in &class.enum_types {
        lines.push(format!("{}{}", inner, constant));
    }
    for field in &class.fields {
        lines.push(format!("{}{}", inner, field_line(field)));
    }
    for method in &class.methods {
        lines.push(format!("{}{}", inner, method_line(method)));
    }
    lines.push(format!("{}}}", pad));
}

pub fn keyword(class: &ClassInfo) -> &'static str {
    match class.kind {
        ClassKind::Enum => "enum",
        ClassKind::Interface => "interface",
        ClassKind::Class if class.is_abstract => "abstract",
        ClassKind::Class => "class",
    }
}

/// `<keyword> Name[ extends S][ implements I1, I2]`, without the brace.
pub fn class_header(class: &ClassInfo) -> String {
    let mut header = format!("{} {}", keyword(class), class.name);
    if let Some(superclass) = &class.superclass {
        header.push_str(&format!(" extends {}", superclass));
    }
    if !class.implemented_interfaces.is_empty() {
        header.push_str(&format!(
            " implements {}",
            class.implemented_interfaces.join(", ")
        ));
    }
    header
}

fn visibility(is_private: bool) -> char {
    if is_private {
        '-'
    } else {
        '+'
    }
}

pub fn field_line(field: &FieldInfo) -> String {
    format!(
        "{} {}: {}",
        visibility(field.is_private),
        field.name,
        field.field_type
    )
}

pub fn method_line(method: &MethodInfo) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.param_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} {}({}): {}",
        visibility(method.is_private),
        method.name,
        params,
        method.return_type
    )
}

/// Write `diagram.puml` into `output_dir`, creating the directory if needed.
pub fn write_uml_to_file(project: &Project, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| JavaUmlError::io(output_dir, e))?;

    let path = output_dir.join(DIAGRAM_FILE);
    std::fs::write(&path, project.to_uml().join("\n")).map_err(|e| JavaUmlError::io(&path, e))?;

    tracing::info!("UML diagram written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldInfo, MethodInfo};
    use tempfile::TempDir;

    fn point() -> ClassInfo {
        let mut point = ClassInfo::new("Point", ClassKind::Class);
        point.add_field(FieldInfo::new("x", "int", true));
        point.add_field(FieldInfo::new("y", "int", true));
        point.add_method(MethodInfo::new("getX", "int", false));
        point
    }

    fn car_project(wheels: usize) -> Project {
        let mut car = ClassInfo::new("Car", ClassKind::Class);
        car.add_field(FieldInfo::new("engine", "Engine", true));
        for i in 0..wheels {
            car.add_field(FieldInfo::new(format!("wheel{}", i), "Wheel", true));
        }

        let mut project = Project::new();
        project.add_class(car);
        project.add_class(ClassInfo::new("Engine", ClassKind::Class));
        project.add_class(ClassInfo::new("Wheel", ClassKind::Class));
        project.normalize();
        project
    }

    #[test]
    fn test_render_point() {
        let mut project = Project::new();
        project.add_class(point());

        let uml = project.to_uml();
        assert_eq!(
            uml,
            vec![
                "@startuml",
                "class Point {",
                "  - x: int",
                "  - y: int",
                "  + getX(): int",
                "}",
                "@enduml",
            ]
        );
    }

    #[test]
    fn test_render_header_variants() {
        let mut shape = ClassInfo::new("Shape", ClassKind::Class);
        shape.is_abstract = true;
        shape.superclass = Some("Base".to_string());
        shape.implemented_interfaces = vec!["Drawable".to_string(), "Comparable".to_string()];
        assert_eq!(
            class_header(&shape),
            "abstract Shape extends Base implements Drawable, Comparable"
        );

        let repo = ClassInfo::new("Repository", ClassKind::Interface);
        assert_eq!(class_header(&repo), "interface Repository");
    }

    #[test]
    fn test_render_enum_constants_first() {
        let mut color = ClassInfo::new("Color", ClassKind::Enum);
        color.add_field(FieldInfo::new("code", "int", true));
        color.add_enum_type("RED");
        color.add_enum_type("GREEN");

        let mut project = Project::new();
        project.add_class(color);
        let uml = project.to_uml();

        assert_eq!(uml[1], "enum Color {");
        assert_eq!(&uml[2..5], &["  RED", "  GREEN", "  - code: int"]);
        assert!(uml.iter().all(|l| !l.contains("class") && !l.contains("interface")));
    }

    #[test]
    fn test_render_nested_packages() {
        let mut inner = PackageInfo::new("model");
        inner.add_class(point());
        let mut outer = PackageInfo::new("app");
        outer.add_class(ClassInfo::new("Main", ClassKind::Class));
        outer.add_package(inner);

        let mut project = Project::new();
        project.add_package(outer);
        let uml = project.to_uml();

        assert_eq!(uml[1], r#"package "app" {"#);
        assert_eq!(uml[2], "  class Main {");
        assert_eq!(uml[3], "  }");
        assert_eq!(uml[4], r#"  package "model" {"#);
        assert_eq!(uml[5], "    class Point {");
        assert_eq!(uml[6], "      - x: int");
        assert_eq!(uml.last().unwrap(), "@enduml");
        assert_eq!(uml[uml.len() - 2], "}");
    }

    #[test]
    fn test_method_with_parameters() {
        let method = MethodInfo::new("move", "void", true)
            .with_param("dx", "int")
            .with_param("dy", "int");
        assert_eq!(method_line(&method), "- move(dx: int, dy: int): void");
    }

    #[test]
    fn test_single_containment_arrow() {
        let uml = car_project(0).to_uml();
        assert!(uml.contains(&"Car o-- Engine: contains".to_string()));
        assert!(!uml.iter().any(|l| l.contains("Wheel: contains")));
    }

    #[test]
    fn test_many_containment_arrow() {
        let uml = car_project(2).to_uml();
        assert!(uml.contains(&r#"Car "1" o-- "many" Wheel: contains"#.to_string()));
        assert!(uml.contains(&"Car o-- Engine: contains".to_string()));
    }

    #[test]
    fn test_arrows_follow_classes_and_packages() {
        let mut project = car_project(1);
        let mut garage = ClassInfo::new("Garage", ClassKind::Class);
        garage.add_field(FieldInfo::new("car", "Car", false));
        let mut pkg = PackageInfo::new("places");
        pkg.add_class(garage);
        project.add_package(pkg);
        project.normalize();

        let uml = project.to_uml();
        let car_arrow = uml.iter().position(|l| l == "Car o-- Engine: contains").unwrap();
        let garage_arrow = uml.iter().position(|l| l == "Garage o-- Car: contains").unwrap();
        let last_block = uml.iter().rposition(|l| l == "}").unwrap();
        assert!(last_block < car_arrow);
        assert!(car_arrow < garage_arrow);
    }

    #[test]
    fn test_write_uml_to_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("docs/uml");
        let mut project = Project::new();
        project.add_class(point());

        let path = write_uml_to_file(&project, &output).unwrap();

        assert_eq!(path, output.join("diagram.puml"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("@startuml\nclass Point {"));
        assert!(content.ends_with("@enduml"));
    }
}

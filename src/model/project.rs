use super::class_info::ClassInfo;
use super::package_info::PackageInfo;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project {
    pub packages: Vec<PackageInfo>,
    pub classes: Vec<ClassInfo>,
    /// Every class name reachable from this project, first occurrence order.
    /// Rebuilt by [`Project::index_class_names`].
    pub class_names: Vec<String>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: PackageInfo) {
        self.packages.push(package);
    }

    pub fn add_class(&mut self, class: ClassInfo) {
        self.classes.push(class);
    }

    /// Collapse nesting-only packages, index class names, and infer
    /// containment. Safe to call more than once.
    pub fn normalize(&mut self) {
        self.collapse_packages();
        self.index_class_names();
        self.infer_containment();
    }

    pub fn collapse_packages(&mut self) {
        for package in &mut self.packages {
            package.collapse();
        }
    }

    pub fn index_class_names(&mut self) {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        self.for_each_class(&mut |class| {
            if seen.insert(class.name.clone()) {
                names.push(class.name.clone());
            }
        });
        self.class_names = names;
    }

    /// Record, for every class, the field types that name a project class.
    /// Containment is derived data, so previous entries are replaced.
    pub fn infer_containment(&mut self) {
        let known: HashSet<String> = self.class_names.iter().cloned().collect();
        self.for_each_class_mut(&mut |class| {
            class.contained_classes = class
                .fields
                .iter()
                .filter(|field| known.contains(&field.field_type))
                .map(|field| field.field_type.clone())
                .collect();
        });
    }

    pub fn is_known_class(&self, name: &str) -> bool {
        self.class_names.iter().any(|n| n == name)
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        let mut found = None;
        self.for_each_class(&mut |class| {
            if found.is_none() && class.name == name {
                found = Some(class);
            }
        });
        found
    }

    /// Top-level classes first, then package classes depth-first.
    pub fn all_classes(&self) -> Vec<&ClassInfo> {
        let mut classes = Vec::new();
        self.for_each_class(&mut |class| classes.push(class));
        classes
    }

    pub fn class_count(&self) -> usize {
        self.all_classes().len()
    }

    pub fn for_each_class<'a>(&'a self, f: &mut impl FnMut(&'a ClassInfo)) {
        for class in &self.classes {
            f(class);
        }
        for package in &self.packages {
            package.for_each_class(f);
        }
    }

    pub fn for_each_class_mut(&mut self, f: &mut impl FnMut(&mut ClassInfo)) {
        for class in &mut self.classes {
            f(class);
        }
        for package in &mut self.packages {
            package.for_each_class_mut(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassKind, FieldInfo};

    fn class_with_fields(name: &str, fields: &[(&str, &str)]) -> ClassInfo {
        let mut class = ClassInfo::new(name, ClassKind::Class);
        for (field_name, field_type) in fields {
            class.add_field(FieldInfo::new(*field_name, *field_type, true));
        }
        class
    }

    fn sample_project() -> Project {
        let mut project = Project::new();
        project.add_class(class_with_fields(
            "Car",
            &[("engine", "Engine"), ("front", "Wheel"), ("back", "Wheel"), ("name", "String")],
        ));

        let mut parts = PackageInfo::new("parts");
        parts.add_class(class_with_fields("Engine", &[("power", "int")]));
        parts.add_class(class_with_fields("Wheel", &[]));
        let mut wrapper = PackageInfo::new("vehicles");
        wrapper.add_package(parts);
        project.add_package(wrapper);
        project
    }

    #[test]
    fn test_index_class_names_covers_packages() {
        let mut project = sample_project();
        project.index_class_names();
        assert_eq!(project.class_names, vec!["Car", "Engine", "Wheel"]);
    }

    #[test]
    fn test_infer_containment() {
        let mut project = sample_project();
        project.normalize();

        let car = project.find_class("Car").unwrap();
        assert_eq!(car.contained_classes, vec!["Engine", "Wheel", "Wheel"]);
        let engine = project.find_class("Engine").unwrap();
        assert!(engine.contained_classes.is_empty());
    }

    #[test]
    fn test_containment_ignores_generic_text() {
        let mut project = Project::new();
        project.add_class(class_with_fields("Garage", &[("cars", "List<Car>")]));
        project.add_class(class_with_fields("Car", &[]));
        project.normalize();

        assert!(project.find_class("Garage").unwrap().contained_classes.is_empty());
    }

    #[test]
    fn test_normalize_twice_is_stable() {
        let mut once = sample_project();
        once.normalize();
        let mut twice = once.clone();
        twice.normalize();

        assert_eq!(once, twice);
        assert_eq!(once.packages[0].name, "vehicles/parts");
    }

    #[test]
    fn test_all_classes_order() {
        let project = sample_project();
        let names: Vec<_> = project.all_classes().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Car", "Engine", "Wheel"]);
    }
}

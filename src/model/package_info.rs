use super::class_info::ClassInfo;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Directory name, or a `/`-joined chain after collapsing
    pub name: String,
    pub classes: Vec<ClassInfo>,
    pub packages: Vec<PackageInfo>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_class(&mut self, class: ClassInfo) {
        self.classes.push(class);
    }

    pub fn add_package(&mut self, package: PackageInfo) {
        self.packages.push(package);
    }

    /// A package holding no classes and a single child only exists to nest
    /// that child.
    pub fn is_nesting_only(&self) -> bool {
        self.classes.is_empty() && self.packages.len() == 1
    }

    /// Merge nesting-only chains into this node, then recurse into children.
    pub fn collapse(&mut self) {
        while self.is_nesting_only() {
            if let Some(child) = self.packages.pop() {
                self.name = format!("{}/{}", self.name, child.name);
                self.classes = child.classes;
                self.packages = child.packages;
            }
        }
        for child in &mut self.packages {
            child.collapse();
        }
    }

    pub fn is_collapsed(&self) -> bool {
        !self.is_nesting_only() && self.packages.iter().all(PackageInfo::is_collapsed)
    }

    pub(crate) fn for_each_class<'a>(&'a self, f: &mut impl FnMut(&'a ClassInfo)) {
        for class in &self.classes {
            f(class);
        }
        for child in &self.packages {
            child.for_each_class(f);
        }
    }

    pub(crate) fn for_each_class_mut(&mut self, f: &mut impl FnMut(&mut ClassInfo)) {
        for class in &mut self.classes {
            f(class);
        }
        for child in &mut self.packages {
            child.for_each_class_mut(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassKind;

    fn chain(names: &[&str], leaf_class: &str) -> PackageInfo {
        let mut leaf = PackageInfo::new(*names.last().unwrap());
        leaf.add_class(ClassInfo::new(leaf_class, ClassKind::Class));
        names[..names.len() - 1].iter().rev().fold(leaf, |inner, name| {
            let mut outer = PackageInfo::new(*name);
            outer.add_package(inner);
            outer
        })
    }

    #[test]
    fn test_collapse_chain() {
        let mut pkg = chain(&["src", "main", "java", "com", "example"], "App");
        pkg.collapse();

        assert_eq!(pkg.name, "src/main/java/com/example");
        assert_eq!(pkg.classes.len(), 1);
        assert!(pkg.packages.is_empty());
        assert!(pkg.is_collapsed());
    }

    #[test]
    fn test_collapse_stops_at_classes() {
        let mut pkg = PackageInfo::new("com");
        let mut inner = chain(&["acme", "core", "model"], "Order");
        inner.add_class(ClassInfo::new("Util", ClassKind::Class));
        pkg.add_package(inner);

        pkg.collapse();

        assert_eq!(pkg.name, "com/acme");
        assert_eq!(pkg.classes[0].name, "Util");
        assert_eq!(pkg.packages[0].name, "core/model");
    }

    #[test]
    fn test_collapse_keeps_branches() {
        let mut pkg = PackageInfo::new("root");
        pkg.add_package(chain(&["a", "b"], "A"));
        pkg.add_package(chain(&["c", "d"], "C"));

        pkg.collapse();

        assert_eq!(pkg.name, "root");
        let names: Vec<_> = pkg.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a/b", "c/d"]);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let mut once = PackageInfo::new("root");
        once.add_package(chain(&["x", "y", "z"], "Z"));
        once.add_package(chain(&["w"], "W"));
        once.collapse();

        let mut twice = once.clone();
        twice.collapse();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_leaf_is_not_nesting_only() {
        let mut pkg = PackageInfo::new("empty");
        pkg.collapse();
        assert_eq!(pkg.name, "empty");
        assert!(pkg.is_collapsed());
    }
}

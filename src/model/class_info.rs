use super::member_info::{FieldInfo, MethodInfo};
use serde::Serialize;

/// Declaration kind of a type. Abstractness is tracked separately on
/// [`ClassInfo`] since it only qualifies plain classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub superclass: Option<String>,
    pub implemented_interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    /// Enum constant names, in declaration order
    pub enum_types: Vec<String>,
    /// Names of project classes referenced by a field, one entry per field
    pub contained_classes: Vec<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn add_field(&mut self, field: FieldInfo) {
        self.fields.push(field);
    }

    pub fn add_method(&mut self, method: MethodInfo) {
        self.methods.push(method);
    }

    pub fn add_contained_class(&mut self, name: impl Into<String>) {
        self.contained_classes.push(name.into());
    }

    pub fn add_enum_type(&mut self, name: impl Into<String>) {
        self.enum_types.push(name.into());
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }
}

use serde::Serialize;

/// Return type recorded for methods that return nothing.
pub const VOID: &str = "void";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    /// Raw type text, never resolved to a class
    pub field_type: String,
    pub is_private: bool,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, is_private: bool) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            is_private,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub param_type: String,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    /// Raw return type text, `"void"` when the method returns nothing
    pub return_type: String,
    pub parameters: Vec<ParamInfo>,
    pub is_private: bool,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>, is_private: bool) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            is_private,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, param_type: impl Into<String>) -> Self {
        self.parameters.push(ParamInfo::new(name, param_type));
        self
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == VOID
    }
}

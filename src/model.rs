//! In-memory project model shared by the Java and PlantUML sides.
//!
//! Every relationship between classes (superclass, interfaces, field types,
//! containment) is a plain type name. Names are matched against
//! [`Project::class_names`] once extraction is complete; nothing is resolved
//! eagerly.

pub mod class_info;
pub mod member_info;
pub mod package_info;
pub mod project;

pub use class_info::{ClassInfo, ClassKind};
pub use member_info::{FieldInfo, MethodInfo, ParamInfo};
pub use package_info::PackageInfo;
pub use project::Project;

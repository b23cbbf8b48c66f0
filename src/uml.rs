//! PlantUML class diagram text: rendering a [`Project`](crate::model::Project)
//! and reading one back.

pub mod reader;
pub mod writer;

pub use reader::{parse_uml, read_uml_file, UmlReader};
pub use writer::{write_uml_to_file, UmlWriter};

pub const START_MARKER: &str = "@startuml";
pub const END_MARKER: &str = "@enduml";
pub const DIAGRAM_FILE: &str = "diagram.puml";

pub mod config;
pub mod error;
pub mod extractor;
pub mod java_gen;
pub mod logging;
pub mod model;
pub mod parser;
pub mod scanner;
pub mod uml;

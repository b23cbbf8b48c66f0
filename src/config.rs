use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "javauml.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scan: ScanOptions,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Root of the Java source tree
    pub source_folder: Option<PathBuf>,
    /// Directory receiving `diagram.puml`
    pub output_folder: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScanOptions {
    /// Glob patterns, relative to the source folder, of files or directories to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        resolve(&mut self.project.source_folder);
        resolve(&mut self.project.output_folder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_basic() {
        let toml_str = r#"
[project]
source_folder = "src/main/java"
output_folder = "docs/uml"

[scan]
exclude = ["**/generated/**"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.project.source_folder,
            Some(PathBuf::from("src/main/java"))
        );
        assert_eq!(config.project.output_folder, Some(PathBuf::from("docs/uml")));
        assert_eq!(config.scan.exclude, vec!["**/generated/**"]);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.project.source_folder.is_none());
        assert!(config.scan.exclude.is_empty());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[project]\nsource_folder = \"java\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.project.source_folder, Some(dir.path().join("java")));
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/javauml.toml")).unwrap();
        assert!(config.project.output_folder.is_none());
    }
}

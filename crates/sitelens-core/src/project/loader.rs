use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// On-disk encoding of a project upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ProjectFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(ProjectFormat::Yaml)
            }
            _ => None,
        }
    }
}

/// Read a project file into the raw JSON value the engine consumes.
pub fn load_file(path: &Path) -> Result<Value> {
    let format = ProjectFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported project file '{}': expected .json, .yaml or .yml",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;
    load_str(&content, format)
        .with_context(|| format!("Failed to parse project file: {}", path.display()))
}

/// Parse project content. YAML is mapped onto the same JSON value model.
pub fn load_str(content: &str, format: ProjectFormat) -> Result<Value> {
    let value = match format {
        ProjectFormat::Json => serde_json::from_str(content).context("Failed to parse JSON")?,
        ProjectFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML")?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ProjectFormat::from_path(Path::new("a.json")), Some(ProjectFormat::Json));
        assert_eq!(ProjectFormat::from_path(Path::new("a.YML")), Some(ProjectFormat::Yaml));
        assert_eq!(ProjectFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let json = load_str(
            r#"{"budget": 1000, "materials": [{"id": 1, "name": "Steel"}]}"#,
            ProjectFormat::Json,
        )
        .unwrap();
        let yaml = load_str(
            "budget: 1000\nmaterials:\n  - id: 1\n    name: Steel\n",
            ProjectFormat::Yaml,
        )
        .unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_load_file_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse project file"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(load_file(file.path()).is_err());
    }
}

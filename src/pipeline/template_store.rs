// src/pipeline/template_store.rs
//! Document template discovery and placeholder filling

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_MAIN_FILE: &str = "main.typ";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TemplateManifest {
    pub name: String,
    pub description: Option<String>,
    pub main_file: Option<String>,
}

/// A template directory holding a placeholder-bearing document source.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub path: PathBuf,
    pub manifest: TemplateManifest,
}

impl Template {
    fn load_from_dir(template_dir: &PathBuf) -> Result<Self> {
        let id = template_dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid template directory name"))?
            .to_string();

        let manifest_path = template_dir.join("manifest.toml");
        let manifest = if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?
        } else {
            TemplateManifest {
                name: id.clone(),
                description: None,
                main_file: None,
            }
        };

        Ok(Self {
            id,
            path: template_dir.clone(),
            manifest,
        })
    }

    pub fn main_file_path(&self) -> PathBuf {
        let main_file = self
            .manifest
            .main_file
            .as_deref()
            .unwrap_or(DEFAULT_MAIN_FILE);
        self.path.join(main_file)
    }

    /// Read the placeholder-bearing document source.
    pub fn source(&self) -> Result<String> {
        let path = self.main_file_path();
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template source: {}", path.display()))
    }
}

/// Discovers template directories once at construction and serves lookups by
/// symbolic type ("ats", "modern", ...).
pub struct TemplateStore {
    templates_dir: PathBuf,
    templates: Vec<Template>,
}

impl TemplateStore {
    pub fn new(templates_dir: PathBuf) -> Result<Self> {
        let mut store = Self {
            templates_dir,
            templates: Vec::new(),
        };
        store.discover_templates()?;
        Ok(store)
    }

    fn discover_templates(&mut self) -> Result<()> {
        if !self.templates_dir.exists() {
            warn!(
                "Templates directory does not exist: {}",
                self.templates_dir.display()
            );
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.templates_dir).with_context(|| {
            format!(
                "Failed to read templates directory: {}",
                self.templates_dir.display()
            )
        })?;

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_dir() {
                match Template::load_from_dir(&path) {
                    Ok(template) => self.templates.push(template),
                    Err(e) => warn!("Failed to load template from {}: {}", path.display(), e),
                }
            }
        }

        info!("Discovered {} templates", self.templates.len());
        Ok(())
    }

    pub fn get_template_by_type(&self, template_type: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == template_type)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.id.as_str()).collect()
    }

    /// Replace `{{name}}` and `${name}` markers with the given values.
    pub fn fill_placeholders(source: &str, values: &HashMap<String, String>) -> String {
        let mut result = source.to_string();
        for (key, value) in values {
            let mustache = format!("{{{{{}}}}}", key);
            let shell = format!("${{{}}}", key);
            result = result.replace(&mustache, value);
            result = result.replace(&shell, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_template(manifest: Option<&str>, main: &str) -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        let template_dir = dir.path().join("ats");
        std::fs::create_dir_all(&template_dir).unwrap();
        if let Some(manifest) = manifest {
            std::fs::write(template_dir.join("manifest.toml"), manifest).unwrap();
        }
        std::fs::write(template_dir.join("main.typ"), main).unwrap();
        let store = TemplateStore::new(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_discovers_template_directories() {
        let (_dir, store) = store_with_template(None, "= {{full_name}}");
        assert_eq!(store.list_templates(), vec!["ats"]);
        assert!(store.get_template_by_type("ats").is_some());
    }

    #[test]
    fn test_unknown_type_returns_none() {
        let (_dir, store) = store_with_template(None, "= {{full_name}}");
        assert!(store.get_template_by_type("modern").is_none());
    }

    #[test]
    fn test_manifest_overrides_main_file() {
        let dir = tempfile::tempdir().unwrap();
        let template_dir = dir.path().join("modern");
        std::fs::create_dir_all(&template_dir).unwrap();
        std::fs::write(
            template_dir.join("manifest.toml"),
            "name = \"modern\"\nmain_file = \"resume.typ\"\n",
        )
        .unwrap();
        std::fs::write(template_dir.join("resume.typ"), "{{summary}}").unwrap();

        let store = TemplateStore::new(dir.path().to_path_buf()).unwrap();
        let template = store.get_template_by_type("modern").unwrap();
        assert_eq!(template.source().unwrap(), "{{summary}}");
    }

    #[test]
    fn test_fill_placeholders_both_syntaxes() {
        let mut values = HashMap::new();
        values.insert("full_name".to_string(), "Jane Doe".to_string());
        values.insert("summary".to_string(), "Engineer".to_string());

        let filled =
            TemplateStore::fill_placeholders("= {{full_name}}\n${summary}", &values);
        assert_eq!(filled, "= Jane Doe\nEngineer");
    }

    #[test]
    fn test_missing_templates_dir_is_empty_store() {
        let store = TemplateStore::new(PathBuf::from("/nonexistent/templates")).unwrap();
        assert!(store.list_templates().is_empty());
    }
}

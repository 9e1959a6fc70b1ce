use crate::layout::LayoutSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config directory not found")]
    NoConfigDir,
}

/// Editor environment the deletion workflows read from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorConfig {
    pub layout_system: LayoutSystem,
    /// Main canvas width in pixels
    pub canvas_width: f64,
    /// Canvas widths at or below this are treated as mobile
    pub mobile_breakpoint: f64,
    /// Title of the template the application was forked from, if any
    pub template_title: Option<String>,
    /// Editor route of the current page; focus-history locators hang off it
    pub current_path: String,
    /// Where committed documents are written; None keeps them in memory only
    pub persist_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout_system: LayoutSystem::Fixed,
            canvas_width: 1160.0,
            mobile_breakpoint: 720.0,
            template_title: None,
            current_path: "/app/page1/edit".to_string(),
            persist_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Priority: ./canvasdel.toml -> ~/.config/canvasdel/canvasdel.toml -> default
        let paths = [
            std::env::current_dir()?.join("canvasdel.toml"),
            dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join("canvasdel/canvasdel.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    pub fn is_mobile(&self) -> bool {
        self.canvas_width <= self.mobile_breakpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EditorConfig::from_toml_str(
            r#"
            layout_system = "auto"
            canvas_width = 480.0
            "#,
        )
        .unwrap();

        assert_eq!(config.layout_system, LayoutSystem::Auto);
        assert!(config.is_mobile());
        assert_eq!(config.current_path, "/app/page1/edit");
        assert!(config.persist_path.is_none());
    }

    #[test]
    fn test_unknown_layout_system_is_a_parse_error() {
        let err = EditorConfig::from_toml_str("layout_system = \"grid\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvasdel.toml");
        std::fs::write(
            &path,
            "template_title = \"CRM\"\npersist_path = \"/tmp/doc.json\"\n",
        )
        .unwrap();

        let config = EditorConfig::load_from(&path).unwrap();
        assert_eq!(config.template_title.as_deref(), Some("CRM"));
        assert_eq!(config.persist_path, Some(PathBuf::from("/tmp/doc.json")));
        assert!(!config.is_mobile());
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::layout::config::LayoutConfig;
use crate::render::{FileNaming, RendererConfig};

/// Конфигурация генерации выписки.
///
/// Читается из TOML, любое поле можно опустить:
///
/// ```toml
/// naming = "anonymous"
///
/// [layout]
/// row_height = 18
/// pagination = "page_breaks"
///
/// [renderer]
/// backend = "markup"
///
/// [renderer.converter]
/// program = "/usr/local/bin/wkhtmltopdf"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    pub layout: LayoutConfig,
    pub renderer: RendererConfig,
    pub naming: FileNaming,
}

impl StatementConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

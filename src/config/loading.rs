use super::{Config, ConfigPaths};

use crate::{BridgeError, Result};

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

impl Config {
    /// Loads the main configuration file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory is unknown or the file is invalid.
    pub fn load() -> Result<Config> {
        let path = ConfigPaths::main_config()?;

        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Config::default());
        }

        Self::load_with_imports(&path)
    }

    /// Loads a configuration file, merging in any `@`-prefixed imports.
    ///
    /// Import paths are resolved relative to the importing file and get a
    /// `.toml` extension when none is given. Keys in the main file win over
    /// imported ones.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read, contains invalid TOML, or
    /// the merged result does not match the configuration schema.
    pub fn load_with_imports(path: &Path) -> Result<Config> {
        let file_content = fs::read_to_string(path).map_err(|e| BridgeError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let main_toml: toml::Value =
            toml::from_str(&file_content).map_err(|e| BridgeError::toml_parse(e, Some(path)))?;

        let imported_tomls = Self::extract_imports(&main_toml)
            .iter()
            .map(|import_path| {
                let resolved_path = Self::resolve_import_path(path, import_path)?;
                debug!(path = %resolved_path.display(), "Importing config file");
                Self::load_import_file(&resolved_path)
            })
            .collect::<Result<Vec<_>>>()?;

        let merged_toml = Self::merge_toml_values(imported_tomls, Self::strip_imports(main_toml));

        merged_toml
            .try_into()
            .map_err(|e| BridgeError::toml_parse(e, Some(path)))
    }

    /// Parses a configuration from a TOML string. Imports are not resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| BridgeError::toml_parse(e, None))
    }

    fn merge_toml_values(toml_list: Vec<toml::Value>, main_toml: toml::Value) -> toml::Value {
        let mut accumulated = toml::Value::Table(toml::map::Map::new());

        for import_toml in toml_list {
            accumulated = Self::merge_two_toml_values(accumulated, import_toml);
        }

        Self::merge_two_toml_values(accumulated, main_toml)
    }

    fn merge_two_toml_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(mut merged_table)) => {
                for (key, base_value) in base_table {
                    let merged_value = match merged_table.remove(&key) {
                        Some(overlay_value) => Self::merge_two_toml_values(base_value, overlay_value),
                        None => base_value,
                    };
                    merged_table.insert(key, merged_value);
                }

                toml::Value::Table(merged_table)
            }

            (_, overlay) => overlay,
        }
    }

    fn extract_imports(value: &toml::Value) -> Vec<String> {
        match value {
            toml::Value::Table(table) => table
                .keys()
                .filter_map(|key| key.strip_prefix('@'))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn strip_imports(value: toml::Value) -> toml::Value {
        match value {
            toml::Value::Table(table) => toml::Value::Table(
                table
                    .into_iter()
                    .filter(|(key, _)| !key.starts_with('@'))
                    .collect(),
            ),
            other => other,
        }
    }

    fn resolve_import_path(base_path: &Path, import_path: &str) -> Result<PathBuf> {
        let parent = base_path
            .parent()
            .ok_or_else(|| BridgeError::import("config file has no parent directory", base_path))?;

        let mut import_pathbuf = PathBuf::from(import_path);
        if import_pathbuf.extension().is_none() {
            import_pathbuf.set_extension("toml");
        }

        Ok(parent.join(import_pathbuf))
    }

    fn load_import_file(path: &Path) -> Result<toml::Value> {
        let file_content = fs::read_to_string(path).map_err(|e| BridgeError::import(e, path))?;

        toml::from_str(&file_content).map_err(|e| BridgeError::toml_parse(e, Some(path)))
    }
}

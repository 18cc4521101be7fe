// src/config/loader.rs
//! Platform settings loader: defaults, TOML files and environment overrides

use crate::config::constants::paths;
use crate::config::settings::PlatformSettings;
use crate::error::{AcqError, AcqResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Merges defaults, settings files and `RFACQ_*` environment variables
pub struct SettingsLoader {
    settings_paths: Vec<PathBuf>,
    required: bool,
    env_vars: Option<Vec<(String, String)>>,
}

impl SettingsLoader {
    /// Loader using `rf-acquire.toml` in the working directory when present
    pub fn new() -> Self {
        Self {
            settings_paths: vec![PathBuf::from(paths::LOCAL_SETTINGS_FILE)],
            required: false,
            env_vars: None,
        }
    }

    /// Loader for an explicit settings file, which must exist
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            settings_paths: vec![path.as_ref().to_path_buf()],
            required: true,
            env_vars: None,
        }
    }

    /// Use these variables instead of the process environment
    pub fn with_env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Load and validate settings
    pub fn load(&self) -> AcqResult<PlatformSettings> {
        let mut merged = toml::Value::try_from(PlatformSettings::default())
            .map_err(|e| AcqError::Settings(e.to_string()))?;

        for path in &self.settings_paths {
            if !path.exists() {
                if self.required {
                    return Err(AcqError::Settings(format!(
                        "settings file not found: {}",
                        path.display()
                    )));
                }
                continue;
            }
            let overlay = Self::load_settings_file(path)?;
            debug!(path = %path.display(), "merging settings file");
            Self::merge_toml_values(&mut merged, overlay);
        }

        let vars = match &self.env_vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };
        Self::apply_environment_overrides(&mut merged, &vars)?;

        let settings: PlatformSettings = merged
            .try_into()
            .map_err(|e: toml::de::Error| AcqError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render settings as TOML
    pub fn export(settings: &PlatformSettings) -> AcqResult<String> {
        toml::to_string_pretty(settings).map_err(|e| AcqError::Settings(e.to_string()))
    }

    fn load_settings_file(path: &Path) -> AcqResult<toml::Value> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AcqError::Settings(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| AcqError::Settings(format!("{}: {}", path.display(), e)))
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, overlay_value) in overlay_table {
                    match base_table.get_mut(&key) {
                        Some(base_value) => Self::merge_toml_values(base_value, overlay_value),
                        None => {
                            base_table.insert(key, overlay_value);
                        }
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(
        merged: &mut toml::Value,
        vars: &[(String, String)],
    ) -> AcqResult<()> {
        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(paths::ENV_PREFIX) else {
                continue;
            };
            let setting = stripped.to_lowercase();
            if !Self::set_override(merged, &setting, value)? {
                warn!(variable = %key, "ignoring unknown settings override");
            }
        }
        Ok(())
    }

    /// Resolve `settle_after_run_ms` against the settings tree, typed by the existing value
    fn set_override(node: &mut toml::Value, key: &str, raw: &str) -> AcqResult<bool> {
        let toml::Value::Table(table) = node else {
            return Ok(false);
        };

        if let Some(existing) = table.get_mut(key) {
            if !existing.is_table() {
                *existing = Self::parse_env_value(key, existing, raw)?;
                return Ok(true);
            }
        }

        for (name, child) in table.iter_mut() {
            if let Some(rest) = key.strip_prefix(name.as_str()).and_then(|r| r.strip_prefix('_')) {
                if child.is_table() && Self::set_override(child, rest, raw)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn parse_env_value(key: &str, existing: &toml::Value, raw: &str) -> AcqResult<toml::Value> {
        let invalid = || AcqError::Settings(format!("cannot parse override {}='{}'", key, raw));
        Ok(match existing {
            toml::Value::Integer(_) => toml::Value::Integer(raw.parse().map_err(|_| invalid())?),
            toml::Value::Float(_) => toml::Value::Float(raw.parse().map_err(|_| invalid())?),
            toml::Value::Boolean(_) => toml::Value::Boolean(raw.parse().map_err(|_| invalid())?),
            _ => toml::Value::String(raw.to_string()),
        })
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::TransmitVariant;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_without_files() {
        let loader = SettingsLoader::with_path("/nonexistent/settings.toml");
        assert!(matches!(loader.load(), Err(AcqError::Settings(_))));

        let settings = SettingsLoader::new().with_env_vars(Vec::new()).load().unwrap();
        assert_eq!(settings.power, 10);
    }

    #[test]
    fn test_settings_file_merge() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
gain = 0.5
output_dir = "/data/rf"

[settle]
after_save_ms = 100
            "#
        )
        .unwrap();

        let settings = SettingsLoader::with_path(temp_file.path())
            .with_env_vars(Vec::new())
            .load()
            .unwrap();

        assert_eq!(settings.gain, 0.5);
        assert_eq!(settings.output_dir, PathBuf::from("/data/rf"));
        assert_eq!(settings.settle.after_save_ms, 100);
        assert_eq!(settings.settle.after_run_ms, 2000);
    }

    #[test]
    fn test_environment_override() {
        let settings = SettingsLoader::new()
            .with_env_vars(env(&[
                ("RFACQ_POWER", "12"),
                ("RFACQ_GAIN", "0.6"),
                ("RFACQ_SETTLE_AFTER_RUN_MS", "250"),
                ("RFACQ_TX_VARIANT", "single_element"),
                ("RFACQ_OUTPUT_DIR", "42"),
                ("UNRELATED", "1"),
            ]))
            .load()
            .unwrap();

        assert_eq!(settings.power, 12);
        assert_eq!(settings.gain, 0.6);
        assert_eq!(settings.settle.after_run_ms, 250);
        assert_eq!(settings.tx_variant, TransmitVariant::SingleElement);
        assert_eq!(settings.output_dir, PathBuf::from("42"));
    }

    #[test]
    fn test_malformed_override_rejected() {
        let result = SettingsLoader::new()
            .with_env_vars(env(&[("RFACQ_POWER", "high")]))
            .load();
        assert!(matches!(result, Err(AcqError::Settings(_))));
    }

    #[test]
    fn test_export_round_trip() {
        let settings = PlatformSettings::default();
        let exported = SettingsLoader::export(&settings).unwrap();
        assert!(exported.contains("[settle]"));

        let parsed: PlatformSettings = toml::from_str(&exported).unwrap();
        assert_eq!(parsed, settings);
    }
}

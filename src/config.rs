//! Configuration module.
//!
//! Handles loading, validating, and merging `assetpress.toml`. Stock defaults
//! are the base layer; a user file only overrides the keys it names.
//!
//! ## Config File Location
//!
//! `assetpress.toml` in the working directory is picked up automatically.
//! `--config <file>` points at any other file (which must then exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [optimize]
//! format = "webp"           # webp, jpeg, png, avif, heic, original
//! quality = 80              # 1-100
//! max_width = 0             # resize only when both bounds are > 0
//! max_height = 0
//!
//! [favicon]
//! sizes = [16, 32, 48]
//! output_format = "ico"     # ico or png
//! ico_encoding = "png-payload"  # png-payload or container
//!
//! [pwa]
//! icon_sizes = [72, 96, 128, 144, 152, 192, 384, 512]
//! splash_sizes = [[640, 1136], [750, 1334]]
//! background_color = "#ffffff"
//! name = "My PWA App"
//! short_name = "PWA App"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The section types are the same records the pipelines take, so a loaded
//! config is handed to them as-is. Nothing here is global: the caller owns
//! the config and passes it on every call.

use crate::error::PipelineError;
use crate::favicon::FaviconConfig;
use crate::optimize::OptimizationConfig;
use crate::pwa::PwaConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "assetpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<PipelineError> for ConfigError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidConfig(msg) => ConfigError::Validation(msg),
            other => ConfigError::Validation(other.to_string()),
        }
    }
}

/// Full configuration loaded from `assetpress.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Single-image pipeline settings.
    pub optimize: OptimizationConfig,
    /// Favicon sizes and packaging.
    pub favicon: FaviconConfig,
    /// PWA icons, splash screens and manifest fields.
    pub pwa: PwaConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.optimize.validate()?;
        self.favicon.validate()?;
        self.pwa.validate()?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (including arrays) replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `assetpress.toml` from `dir` if present, else the stock defaults.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE))?;
    if overlay.is_some() {
        tracing::debug!(dir = %dir.display(), "using {CONFIG_FILE}");
    }
    resolve_config(stock_defaults_value()?, overlay)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock `assetpress.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# assetpress Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image optimization (assetpress optimize)
# ---------------------------------------------------------------------------
[optimize]
# Output format: "webp", "jpeg", "png", "avif", "heic" or "original".
# "heic" and "original" skip the final conversion. HEIC input is always
# converted to JPEG first.
format = "webp"

# Encoder quality (1 = worst, 100 = best). Has no effect on PNG.
quality = 80

# Resize target. The image is stretched to exactly max_width x max_height,
# and only when BOTH are greater than 0.
max_width = 0
max_height = 0

# ---------------------------------------------------------------------------
# Favicon (assetpress favicon)
# ---------------------------------------------------------------------------
[favicon]
# Square sizes to render.
sizes = [16, 32, 48]

# "ico" or "png". PNG output keeps only the largest size.
output_format = "ico"

# "png-payload" writes the largest size as a PNG named favicon.ico.
# "container" writes a real multi-size ICO (sizes up to 256).
ico_encoding = "png-payload"

# ---------------------------------------------------------------------------
# PWA icons and splash screens (assetpress pwa)
# ---------------------------------------------------------------------------
[pwa]
icon_sizes = [72, 96, 128, 144, 152, 192, 384, 512]

# [width, height] pairs.
splash_sizes = [
    [640, 1136],
    [750, 1334],
    [828, 1792],
    [1125, 2436],
    [1242, 2688],
    [1536, 2048],
    [1668, 2224],
    [2048, 2732],
]

# Splash background, manifest background_color and theme_color.
# Hex (#rgb, #rrggbb, #rrggbbaa), rgb()/rgba() or a basic colour name.
background_color = "#ffffff"

name = "My PWA App"
short_name = "PWA App"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::FaviconFormat;
    use crate::types::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.optimize.format, OutputFormat::WebP);
        assert_eq!(config.optimize.quality, 80);
        assert_eq!(config.favicon.sizes, vec![16, 32, 48]);
        assert_eq!(config.pwa.background_color, "#ffffff");
        assert_eq!(config.pwa.splash_sizes.len(), 8);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[optimize]
quality = 60
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.optimize.quality, 60);
        assert_eq!(config.optimize.format, OutputFormat::WebP);
        assert_eq!(config.favicon, FaviconConfig::default());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r##"
[favicon]
output_format = "png"

[pwa]
background_color = "#000"
icon_sizes = [192, 512]
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.favicon.output_format, FaviconFormat::Png);
        assert_eq!(config.favicon.sizes, vec![16, 32, 48]);
        assert_eq!(config.pwa.icon_sizes, vec![192, 512]);
        assert_eq!(config.pwa.background_color, "#000");
        assert_eq!(config.pwa.name, "My PWA App");
    }

    #[test]
    fn load_config_file_requires_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("quality = 90").unwrap();
        let overlay: toml::Value = toml::from_str("quality = 70").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_table_merge_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[optimize]
format = "webp"
quality = 80
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[optimize]
quality = 50
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let optimize = merged.get("optimize").unwrap();
        assert_eq!(optimize.get("quality").unwrap().as_integer(), Some(50));
        assert_eq!(optimize.get("format").unwrap().as_str(), Some("webp"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("sizes = [16, 32, 48]").unwrap();
        let overlay: toml::Value = toml::from_str("sizes = [64]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("sizes").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown keys / validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[optimize]\nqualty = 90\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[images]\nquality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let err = toml::from_str::<AppConfig>("[optimize]\nformat = \"gif\"\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported format: gif"), "{err}");
    }

    #[test]
    fn format_aliases_accepted() {
        let config: AppConfig = toml::from_str("[optimize]\nformat = \"JPG\"\n").unwrap();
        assert_eq!(config.optimize.format, OutputFormat::Jpeg);
        let config: AppConfig = toml::from_str("[optimize]\nformat = \"heif\"\n").unwrap();
        assert_eq!(config.optimize.format, OutputFormat::Heic);
    }

    #[test]
    fn validate_quality_range() {
        let mut config = AppConfig::default();
        config.optimize.quality = 100;
        assert!(config.validate().is_ok());
        config.optimize.quality = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("optimize.quality")
        ));
    }

    #[test]
    fn validate_bad_background_color() {
        let mut config = AppConfig::default();
        config.pwa.background_color = "#12".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_processes() {
        let mut config = AppConfig::default();
        config.processing.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[favicon]\nsizes = []\n").unwrap();
        assert!(resolve_config(base, Some(overlay)).is_err());
    }

    // =========================================================================
    // stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[optimize]", "[favicon]", "[pwa]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for key in ["optimize", "favicon", "pwa", "processing"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}

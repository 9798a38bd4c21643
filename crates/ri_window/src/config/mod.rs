//! Configuration system
//!
//! Settings load from and save to `.toml` or `.ron` files, picked by extension.

mod settings;

pub use serde::{Deserialize, Serialize};
pub use settings::{ApplicationConfig, EventLoopConfig, WindowConfig};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    /// `Io` when the file cannot be read, `Parse` for malformed content and
    /// `UnsupportedFormat` for extensions other than `.toml` and `.ron`.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;
        format.parse(&contents)
    }

    /// Load from file, or fall back to the defaults if the file does not exist
    ///
    /// # Errors
    /// Same as [`Config::load_from_file`], except a missing file.
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// `Serialize` if encoding fails, `Io` if the file cannot be written.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = Format::of(path)?.render(self)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<C: Config>(self, contents: &str) -> Result<C, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn render<C: Config>(self, config: &C) -> Result<String, ConfigError> {
        match self {
            Self::Toml => {
                toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            Self::Ron => ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::DisplayMode;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ri_window_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_toml_file_round_trip() {
        let path = scratch("app.toml");
        let mut config = ApplicationConfig::default();
        config.window.title = "Ave Gaben!".to_string();
        config.window.display_mode = Some(DisplayMode::FullScreen);
        config.event_loop.refresh_rate = Some(144);

        config.save_to_file(&path).unwrap();
        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_file_round_trip() {
        let path = scratch("app.ron");
        let mut config = ApplicationConfig::default();
        config.window.floating = true;
        config.log_level = "debug".to_string();

        config.save_to_file(&path).unwrap();
        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ApplicationConfig::default().save_to_file(scratch("app.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loaded = ApplicationConfig::load_or_default(scratch("absent.toml")).unwrap();
        assert_eq!(loaded, ApplicationConfig::default());
        assert!(matches!(
            ApplicationConfig::load_from_file(scratch("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let path = scratch("broken.toml");
        std::fs::write(&path, "window = 3").unwrap();
        let result = ApplicationConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

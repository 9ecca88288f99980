use crate::settings::{SettingsError, WaterSettings};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tideview_common::Color;

/// Errors from loading or saving a scene config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0}")]
    UnknownFormat(String),
    #[error("invalid water settings: {0}")]
    Invalid(#[from] SettingsError),
}

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(ext)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound on the device pixel ratio used for the UI.
    pub max_pixel_ratio: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tideview".into(),
            width: 1280,
            height: 720,
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `skybox_0.png` .. `skybox_5.png`.
    pub dir: PathBuf,
    pub skybox: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            skybox: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::ONE,
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.01,
            max_distance: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub visible: bool,
    pub width: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            visible: true,
            width: 340.0,
        }
    }
}

/// Everything needed to build the scene. Every field has a default, so a
/// config file only needs the parts it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub panel: PanelConfig,
    pub clear_color: Color,
    pub water: WaterSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            panel: PanelConfig::default(),
            clear_color: Color::new(38.0 / 255.0, 40.0 / 255.0, 55.0 / 255.0),
            water: WaterSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse(&text, format)?;
        tracing::info!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
        };
        config.water.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.render(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, text)?;
        tracing::info!(path = %path.display(), "saved scene config");
        Ok(())
    }

    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.clear_color.to_hex(), "#262837");
        assert_eq!(c.camera.fov_degrees, 75.0);
        assert_eq!(c.camera.position, Vec3::ONE);
        assert_eq!(c.panel.width, 340.0);
        assert_eq!(c.window.max_pixel_ratio, 2.0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let text = "water:\n  big_waves_elevation: 0.5\n  depth_color: '#112233'\n";
        let c = SceneConfig::parse(text, ConfigFormat::Yaml).unwrap();
        assert_eq!(c.water.big_waves_elevation, 0.5);
        assert_eq!(c.water.depth_color.to_hex(), "#112233");
        assert_eq!(c.water.small_iterations, 4.0);
        assert_eq!(c.window, WindowConfig::default());
    }

    #[test]
    fn invalid_settings_rejected() {
        let text = r#"{"water": {"small_iterations": 1.5}}"#;
        let err = SceneConfig::parse(text, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn huge_iteration_count_rejected() {
        let text = r#"{"water": {"small_iterations": 20000000.0}}"#;
        let err = SceneConfig::parse(text, ConfigFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(SettingsError::OutOfRange {
                name: "uSmallIterations",
                ..
            })
        ));
    }

    #[test]
    fn values_beyond_slider_ranges_rejected() {
        let text = "water:\n  big_waves_frequency: [4.0, 25.0]\n";
        let err = SceneConfig::parse(text, ConfigFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("BigWavesFrequencyZ"));
    }

    #[test]
    fn bad_color_rejected() {
        let text = "clear_color: 'blue'\n";
        assert!(matches!(
            SceneConfig::parse(text, ConfigFormat::Yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("scene.YML")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("scene.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("scene.toml")).is_err());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        let mut config = SceneConfig::default();
        config.water.color_multiplier = 7.25;
        config.assets.skybox = false;
        config.save(&path).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded.water.color_multiplier, 7.25);
        assert!(!loaded.assets.skybox);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

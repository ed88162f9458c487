//! YAML configuration for the demo hosts.
//!
//! Every section and field is optional; missing values take the defaults of
//! the starting scene.
//!
//! ```yaml
//! window:
//!   title: Lightbox
//!   width: 1280
//!   height: 720
//! camera:
//!   fov_degrees: 55.0
//!   position: [0.0, 8.0, 13.0]
//! scene:
//!   background: "#b0b0b0"
//!   shadows:
//!     enabled: true
//!     map_size: 1024
//! ```

use crate::error::ConfigError;
use glam::Vec3;
use lightbox_render::PerspectiveCamera;
use lightbox_scene::SceneSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lightbox".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 8.0, 13.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraConfig {
    /// Build the initial camera for a surface with the given aspect ratio.
    pub fn camera(&self, aspect: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(self.fov_degrees, aspect, self.near, self.far);
        camera.position = Vec3::from_array(self.position);
        camera.target = Vec3::from_array(self.target);
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub scene: SceneSettings,
    /// How often renderer counters are logged, in milliseconds.
    pub render_info_interval_ms: u64,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            scene: SceneSettings::default(),
            render_info_interval_ms: 500,
        }
    }
}

impl LightboxConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov must be in (0, 180) degrees, got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if cam.position == cam.target {
            return Err(ConfigError::Invalid(
                "camera position and target must differ".into(),
            ));
        }
        if self.scene.shadows.enabled && self.scene.shadows.map_size == 0 {
            return Err(ConfigError::Invalid("shadow map size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        LightboxConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = LightboxConfig::from_yaml_str(
            "window:\n  width: 800\n  height: 600\nscene:\n  shadows:\n    map_size: 2048\n",
        )
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.title, "Lightbox");
        assert_eq!(config.camera.fov_degrees, 55.0);
        assert_eq!(config.scene.shadows.map_size, 2048);
        assert!(config.scene.shadows.enabled);
        assert_eq!(config.scene.background.to_hex(), 0xb0b0b0);
        assert_eq!(config.render_info_interval_ms, 500);
    }

    #[test]
    fn background_parses_hex_string() {
        let config = LightboxConfig::from_yaml_str("scene:\n  background: \"#102030\"\n").unwrap();
        assert_eq!(config.scene.background.to_hex(), 0x102030);
    }

    #[test]
    fn bad_color_is_a_yaml_error() {
        let err = LightboxConfig::from_yaml_str("scene:\n  background: nope\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = LightboxConfig::from_yaml_str("window:\n  height: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_clip_planes_are_rejected() {
        let err = LightboxConfig::from_yaml_str("camera:\n  near: 10.0\n  far: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn yaml_round_trip() {
        let config = LightboxConfig::default();
        let text = config.to_yaml_string().unwrap();
        assert_eq!(LightboxConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LightboxConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn camera_from_config() {
        let camera = CameraConfig::default().camera(2.0);
        assert_eq!(camera.aspect(), 2.0);
        assert_eq!(camera.position, Vec3::new(0.0, 8.0, 13.0));
    }
}

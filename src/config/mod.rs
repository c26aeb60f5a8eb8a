use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::controller::{
    MotionSettings, DEFAULT_PAN_SPEED, DEFAULT_ROTATION_SPEED, DEFAULT_WHEEL_ZOOM_BASE,
};
use crate::input::{MotionBindings, MotionKey};

const APP_DIR: &str = "mapview";
const APP_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pan_speed: f64,
    pub rotation_speed: f64,
    pub wheel_zoom_base: f64,
    pub data_dir: Option<PathBuf>,
    pub key_bindings: HashMap<String, MotionKey>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pan_speed: DEFAULT_PAN_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            wheel_zoom_base: DEFAULT_WHEEL_ZOOM_BASE,
            data_dir: None,
            key_bindings: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Non-finite or negative speeds fall back to their defaults.
    pub fn motion_settings(&self) -> MotionSettings {
        MotionSettings {
            pan_speed: sanitize_speed(self.pan_speed, DEFAULT_PAN_SPEED),
            rotation_speed: sanitize_speed(self.rotation_speed, DEFAULT_ROTATION_SPEED),
        }
    }

    pub fn bindings(&self) -> MotionBindings {
        MotionBindings::with_overrides(&self.key_bindings)
    }
}

fn sanitize_speed(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(value, default, "invalid motion speed in config; using default");
        default
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    read_app_config(&path).unwrap_or_else(|err| {
        tracing::warn!(?err, ?path, "failed to load config.json; using defaults");
        AppConfig::default()
    })
}

pub fn read_app_config(path: &Path) -> ConfigResult<AppConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "mapview",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/mapview/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("mapview", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/mapview/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("mapview", "config.json", None, None).unwrap_err();
        assert!(matches!(error, ConfigError::MissingHomeDirectory));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = load_app_config_with(Some(dir.path()), None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let app_dir = dir.path().join("mapview");
        std::fs::create_dir_all(&app_dir).expect("create app dir");
        std::fs::write(
            app_dir.join("config.json"),
            r#"{ "pan_speed": 25.0, "key_bindings": { "i": "pan-up" } }"#,
        )
        .expect("write config");

        let config = load_app_config_with(Some(dir.path()), None);
        assert_eq!(config.pan_speed, 25.0);
        assert_eq!(config.rotation_speed, DEFAULT_ROTATION_SPEED);
        assert_eq!(config.wheel_zoom_base, DEFAULT_WHEEL_ZOOM_BASE);
        assert_eq!(
            config.bindings().resolve("i", KeyModifiers::default()),
            Some(MotionKey::PanUp)
        );
    }

    #[test]
    fn malformed_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let app_dir = dir.path().join("mapview");
        std::fs::create_dir_all(&app_dir).expect("create app dir");
        std::fs::write(app_dir.join("config.json"), "{ pan_speed: ").expect("write config");

        assert_eq!(
            load_app_config_with(Some(dir.path()), None),
            AppConfig::default()
        );
        assert!(matches!(
            read_app_config(&app_dir.join("config.json")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn negative_speeds_fall_back_to_defaults() {
        let config = AppConfig {
            pan_speed: -4.0,
            rotation_speed: f64::INFINITY,
            ..AppConfig::default()
        };
        assert_eq!(config.motion_settings(), MotionSettings::default());
    }
}

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tileworld::Color;

pub const MAP_ENV_VAR: &str = "TILEWORLD_MAP";
pub const CAMERA_SPEED_ENV_VAR: &str = "TILEWORLD_CAMERA_SPEED";

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub camera_speed_px_per_second: f32,
    pub max_frame_delta: Duration,
    pub clear_color: Color,
    pub map_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Tile World".to_string(),
            window_width: 960,
            window_height: 640,
            camera_speed_px_per_second: 480.0,
            max_frame_delta: Duration::from_millis(250),
            clear_color: Color::rgba(20, 22, 28, 255),
            map_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no world map given: pass a path as the first argument or set {env_var}")]
    MissingMapPath { env_var: &'static str },
    #[error("{env_var} must be a positive number, got {value:?}")]
    InvalidCameraSpeed { env_var: &'static str, value: String },
}

impl ViewerConfig {
    /// Applies overrides on top of the defaults. The CLI map path wins over
    /// the environment.
    pub fn resolve(
        cli_map_path: Option<String>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.map_path = cli_map_path
            .filter(|raw| !raw.trim().is_empty())
            .or_else(|| env_lookup(MAP_ENV_VAR).filter(|raw| !raw.trim().is_empty()))
            .map(PathBuf::from);
        if config.map_path.is_none() {
            return Err(ConfigError::MissingMapPath {
                env_var: MAP_ENV_VAR,
            });
        }

        if let Some(raw) = env_lookup(CAMERA_SPEED_ENV_VAR) {
            config.camera_speed_px_per_second = parse_camera_speed(&raw)?;
        }
        Ok(config)
    }
}

fn parse_camera_speed(raw: &str) -> Result<f32, ConfigError> {
    match raw.trim().parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => Ok(speed),
        _ => Err(ConfigError::InvalidCameraSpeed {
            env_var: CAMERA_SPEED_ENV_VAR,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn cli_path_wins_over_environment() {
        let config = ViewerConfig::resolve(
            Some("maps/cli.json".to_string()),
            env_from(&[(MAP_ENV_VAR, "maps/env.json")]),
        )
        .expect("config");
        assert_eq!(config.map_path, Some(PathBuf::from("maps/cli.json")));
    }

    #[test]
    fn environment_path_used_without_cli_argument() {
        let config = ViewerConfig::resolve(None, env_from(&[(MAP_ENV_VAR, "maps/env.json")]))
            .expect("config");
        assert_eq!(config.map_path, Some(PathBuf::from("maps/env.json")));
        assert_eq!(
            config.camera_speed_px_per_second,
            ViewerConfig::default().camera_speed_px_per_second
        );
    }

    #[test]
    fn missing_map_path_is_an_error() {
        let err = ViewerConfig::resolve(Some("  ".to_string()), env_from(&[])).expect_err("err");
        assert_eq!(
            err,
            ConfigError::MissingMapPath {
                env_var: MAP_ENV_VAR
            }
        );
    }

    #[test]
    fn camera_speed_override_is_validated() {
        let config = ViewerConfig::resolve(
            Some("world.json".to_string()),
            env_from(&[(CAMERA_SPEED_ENV_VAR, " 120.5 ")]),
        )
        .expect("config");
        assert_eq!(config.camera_speed_px_per_second, 120.5);

        for bad in ["fast", "-3", "0", "inf"] {
            let err = ViewerConfig::resolve(
                Some("world.json".to_string()),
                env_from(&[(CAMERA_SPEED_ENV_VAR, bad)]),
            )
            .expect_err("err");
            assert!(
                matches!(err, ConfigError::InvalidCameraSpeed { .. }),
                "value={bad}"
            );
        }
    }
}

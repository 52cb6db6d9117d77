//! Start-up settings: command line over config file over [`Defaults`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::defaults::Defaults;
use crate::error::UiError;
use crate::logging::LogTarget;
use crate::ui::{Rotation, ScreenId, UiOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("tick period must be at least 1 ms")]
    ZeroTick,
    #[error(transparent)]
    Invalid(#[from] UiError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub rotation: Option<i32>,
}

/// Shape of the optional JSON config file. Every field may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub device_name: Option<String>,
    pub display: DisplayConfig,
    pub tick_ms: Option<u64>,
    pub start_screen: Option<ScreenId>,
}

pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
}

/// Everything `main` needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ui: UiOptions,
    pub device_name: String,
    pub headless: bool,
    pub exit_after: Option<Duration>,
    pub log_filter: String,
    pub log_target: LogTarget,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let rotation = cli
            .rotation
            .or(file.display.rotation)
            .unwrap_or(Defaults::DISPLAY_ROTATION);
        let tick_ms = cli.tick_ms.or(file.tick_ms).unwrap_or(Defaults::TICK_MS);
        if tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }

        let ui = UiOptions {
            width: cli.width.or(file.display.width).unwrap_or(Defaults::DISPLAY_WIDTH),
            height: cli.height.or(file.display.height).unwrap_or(Defaults::DISPLAY_HEIGHT),
            rotation: Rotation::from_degrees(rotation)?,
            tick_period: Duration::from_millis(tick_ms),
            start_screen: cli.start.or(file.start_screen).unwrap_or(ScreenId::Main),
            ..UiOptions::default()
        };
        // reject a bad resolution before anything touches the terminal
        ui.geometry()?;

        let log_target = if cli.headless {
            LogTarget::Stderr
        } else {
            LogTarget::File(cli.log_file.clone().unwrap_or_else(|| Defaults::LOG_FILE.into()))
        };

        Ok(Self {
            ui,
            device_name: file.device_name.unwrap_or_else(|| Defaults::DEVICE_NAME.to_owned()),
            headless: cli.headless,
            exit_after: cli.exit_after_ms.map(Duration::from_millis),
            log_filter: cli.log_level.clone().unwrap_or_else(|| Defaults::LOG_LEVEL.to_owned()),
            log_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_given() {
        let s = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap();
        assert_eq!(s.ui.width, Defaults::DISPLAY_WIDTH);
        assert_eq!(s.ui.height, Defaults::DISPLAY_HEIGHT);
        assert_eq!(s.ui.rotation, Rotation::Deg0);
        assert_eq!(s.ui.tick_period, Duration::from_millis(Defaults::TICK_MS));
        assert_eq!(s.device_name, Defaults::DEVICE_NAME);
        assert_eq!(s.log_target, LogTarget::File(Defaults::LOG_FILE.into()));
    }

    #[test]
    fn cli_beats_file_beats_defaults() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "device_name": "trailbox", "display": { "width": 480, "rotation": 90 }, "tick_ms": 10 }"#,
        )
        .unwrap();
        let cli = Cli { width: Some(320), headless: true, ..Cli::default() };
        let s = Settings::resolve(&cli, file).unwrap();

        assert_eq!(s.ui.width, 320);
        assert_eq!(s.ui.height, Defaults::DISPLAY_HEIGHT);
        assert_eq!(s.ui.rotation, Rotation::Deg90);
        assert_eq!(s.ui.tick_period, Duration::from_millis(10));
        assert_eq!(s.device_name, "trailbox");
        assert_eq!(s.log_target, LogTarget::Stderr);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cli = Cli { rotation: Some(45), ..Cli::default() };
        assert!(matches!(
            Settings::resolve(&cli, FileConfig::default()),
            Err(ConfigError::Invalid(UiError::InvalidRotation(45)))
        ));
        let cli = Cli { height: Some(-1), ..Cli::default() };
        assert!(matches!(
            Settings::resolve(&cli, FileConfig::default()),
            Err(ConfigError::Invalid(UiError::InvalidResolution { .. }))
        ));
        let cli = Cli { width: Some(100_000_000), ..Cli::default() };
        assert!(matches!(
            Settings::resolve(&cli, FileConfig::default()),
            Err(ConfigError::Invalid(UiError::InvalidResolution { width: 100_000_000, .. }))
        ));
        let cli = Cli { tick_ms: Some(0), ..Cli::default() };
        assert!(matches!(Settings::resolve(&cli, FileConfig::default()), Err(ConfigError::ZeroTick)));
    }

    #[test]
    fn unknown_keys_are_an_error() {
        assert!(serde_json::from_str::<FileConfig>(r#"{ "brightness": 3 }"#).is_err());
    }

    #[test]
    fn load_reports_the_path() {
        let missing = Path::new("/definitely/not/here.json");
        let err = load(missing).unwrap_err();
        assert!(err.to_string().contains("here.json"));
    }
}

use clap::Parser;
use std::path::PathBuf;

use crate::ui::ScreenId;

/// Touchscreen shell of the bike computer
#[derive(Parser, Debug, Default)]
#[command(version, about = "Touchscreen bike computer shell")]
pub struct Cli {
    /// JSON configuration file (display, tick, device name)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Native panel width in pixels
    #[arg(long)]
    pub width: Option<i32>,

    /// Native panel height in pixels
    #[arg(long)]
    pub height: Option<i32>,

    /// Panel rotation in degrees: 0, 90, 180 or 270
    #[arg(long, allow_negative_numbers = true)]
    pub rotation: Option<i32>,

    /// Toolkit clock period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Screen shown after start-up
    #[arg(long, value_enum)]
    pub start: Option<ScreenId>,

    /// Run without a terminal (no output, logs on stderr)
    #[arg(long)]
    pub headless: bool,

    /// Headless only: close the display after this many milliseconds
    #[arg(long, requires = "headless")]
    pub exit_after_ms: Option<u64>,

    /// Log filter, e.g. "debug" or "touchshell::ui=trace" (RUST_LOG wins when set)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log file used while the terminal owns the screen
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_overrides() {
        let cli = Cli::try_parse_from([
            "touchshell", "--width", "480", "--height", "800", "--rotation", "90", "--start", "settings",
        ])
        .unwrap();
        assert_eq!(cli.width, Some(480));
        assert_eq!(cli.rotation, Some(90));
        assert_eq!(cli.start, Some(ScreenId::Settings));
        assert!(!cli.headless);
    }

    #[test]
    fn exit_after_needs_headless() {
        assert!(Cli::try_parse_from(["touchshell", "--exit-after-ms", "10"]).is_err());
        let cli =
            Cli::try_parse_from(["touchshell", "--headless", "--exit-after-ms", "10"]).unwrap();
        assert_eq!(cli.exit_after_ms, Some(10));
    }

    #[test]
    fn negative_rotation_reaches_validation() {
        let cli = Cli::try_parse_from(["touchshell", "--rotation", "-90"]).unwrap();
        assert_eq!(cli.rotation, Some(-90));
    }
}

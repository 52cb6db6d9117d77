//! Central place for the shell's default values.
//! Update these and the whole app picks them up.

use std::time::Duration;

pub struct Defaults;

impl Defaults {
    /* Display */
    pub const DISPLAY_WIDTH: i32 = 1024;
    pub const DISPLAY_HEIGHT: i32 = 800;
    pub const DISPLAY_ROTATION: i32 = 0;
    /// Largest accepted width or height, in logical pixels.
    pub const MAX_DISPLAY_DIM: i32 = 8192;

    /* Workers */
    pub const TICK_MS: u64 = 30;
    /// Upper bound on how long the render thread sleeps between pumps.
    pub const RENDER_MAX_WAIT: Duration = Duration::from_millis(30);

    /* Screen manager */
    pub const SCREEN_QUEUE_DEPTH: usize = 8;
    pub const STATUS_BAR_CLOCK_PERIOD: Duration = Duration::from_millis(1000);

    /* Process */
    pub const DEVICE_NAME: &'static str = "openbike";
    pub const FATAL_EXIT_CODE: i32 = 70;

    /* Logging */
    pub const LOG_LEVEL: &'static str = "info";
    pub const LOG_FILE: &'static str = "touchshell.log";
}

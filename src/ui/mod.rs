//! The UI context: shared toolkit state, the screen manager and the worker
//! threads that drive them.
//!
//! Three threads share one [`Toolkit`] behind one lock:
//!
//! * `ui-tick` advances the toolkit clock at a fixed rate,
//! * `ui-render` pumps input, fires timers and redraws,
//! * `ui-screens` drains the transition queue and swaps screens.
//!
//! Screen requests go through a [`Navigator`], whose queue and history have
//! their own locks, so callbacks running under the UI lock can still enqueue.

pub mod manager;
pub mod navigator;
pub mod screen;
pub mod status_bar;
pub mod workers;

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::defaults::Defaults;
use crate::display::Display;
use crate::error::UiError;
use crate::fatal;
use crate::toolkit::{TextStyle, Toolkit, WidgetId};

pub use manager::{Executor, TransitionOutcome};
pub use navigator::{Admission, Navigator, ScreenHistory};
pub use screen::{Chrome, Screen, ScreenCtx, ScreenId, ScreenRegistry};
pub use status_bar::StatusBar;
pub use workers::{RenderExit, StopSignal};

/* ---------- geometry ---------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self, UiError> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(UiError::InvalidRotation(other)),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Quarter turns put the panel's long side the other way round.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = UiError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

/// Logical display size as screens see it, rotation already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub rotation: Rotation,
}

/* ---------- options ---------- */

#[derive(Debug, Clone)]
pub struct UiOptions {
    /// Native panel resolution, before rotation.
    pub width: i32,
    pub height: i32,
    pub rotation: Rotation,
    pub tick_period: Duration,
    pub queue_depth: usize,
    pub start_screen: ScreenId,
    pub render_max_wait: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            width: Defaults::DISPLAY_WIDTH,
            height: Defaults::DISPLAY_HEIGHT,
            rotation: Rotation::Deg0,
            tick_period: Duration::from_millis(Defaults::TICK_MS),
            queue_depth: Defaults::SCREEN_QUEUE_DEPTH,
            start_screen: ScreenId::Main,
            render_max_wait: Defaults::RENDER_MAX_WAIT,
        }
    }
}

impl UiOptions {
    pub fn geometry(&self) -> Result<Geometry, UiError> {
        let in_range = |v: i32| (1..=Defaults::MAX_DISPLAY_DIM).contains(&v);
        if !in_range(self.width) || !in_range(self.height) {
            return Err(UiError::InvalidResolution { width: self.width, height: self.height });
        }
        let (width, height) = if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Ok(Geometry { width, height, rotation: self.rotation })
    }
}

/* ---------- shared state ---------- */

/// Everything the worker threads share, behind the one UI-state lock.
pub struct UiState {
    pub toolkit: Toolkit,
    pub status_bar: StatusBar,
}

pub struct UiShared {
    state: Mutex<UiState>,
    pub geometry: Geometry,
}

impl UiShared {
    pub(crate) fn new(toolkit: Toolkit, geometry: Geometry) -> Self {
        Self {
            state: Mutex::new(UiState { toolkit, status_bar: StatusBar::default() }),
            geometry,
        }
    }

    pub(crate) fn lock(&self) -> UiGuard<'_> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        HOLDS_UI_LOCK.with(|held| held.set(true));
        UiGuard { state }
    }

    /// Like [`lock`](Self::lock), but fails with `LockHeld` when the calling
    /// thread is already inside a screen callback, timer or click handler.
    pub(crate) fn lock_outside_callbacks(&self) -> Result<UiGuard<'_>, UiError> {
        if HOLDS_UI_LOCK.with(Cell::get) {
            return Err(UiError::LockHeld);
        }
        Ok(self.lock())
    }
}

thread_local! {
    static HOLDS_UI_LOCK: Cell<bool> = const { Cell::new(false) };
}

/// The held UI-state lock. Marks the owning thread while alive.
pub(crate) struct UiGuard<'a> {
    state: MutexGuard<'a, UiState>,
}

impl Deref for UiGuard<'_> {
    type Target = UiState;

    fn deref(&self) -> &UiState {
        &self.state
    }
}

impl DerefMut for UiGuard<'_> {
    fn deref_mut(&mut self) -> &mut UiState {
        &mut self.state
    }
}

impl Drop for UiGuard<'_> {
    fn drop(&mut self) {
        HOLDS_UI_LOCK.with(|held| held.set(false));
    }
}

/// Terminates the process if the owning worker thread unwinds.
struct FatalOnPanic(&'static str);

impl Drop for FatalOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            fatal::terminate(format_args!("{} thread panicked", self.0));
        }
    }
}

fn spawn<T: Send + 'static>(
    name: &'static str,
    body: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, UiError> {
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let _guard = FatalOnPanic(name);
            body()
        })
        .map_err(|source| UiError::Spawn { name, source })
}

/* ---------- the context ---------- */

pub struct Ui {
    shared: Arc<UiShared>,
    nav: Navigator,
    stop: Arc<StopSignal>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    render: Mutex<Option<JoinHandle<RenderExit>>>,
}

impl Ui {
    /// Start the toolkit, the worker threads and the screen manager, then
    /// queue `options.start_screen`.
    pub fn init<D>(options: UiOptions, registry: ScreenRegistry, display: D) -> Result<Self, UiError>
    where
        D: Display + 'static,
    {
        let geometry = options.geometry()?;
        if !registry.contains(options.start_screen) {
            return Err(UiError::ScreenNotRegistered(options.start_screen));
        }
        let nav = Navigator::new(options.queue_depth, options.start_screen)?;
        let shared = Arc::new(UiShared::new(
            Toolkit::new(geometry.width, geometry.height, TextStyle::default()),
            geometry,
        ));
        let stop = Arc::new(StopSignal::new());

        let ui = Ui {
            shared: Arc::clone(&shared),
            nav: nav.clone(),
            stop: Arc::clone(&stop),
            workers: Mutex::new(Vec::with_capacity(2)),
            render: Mutex::new(None),
        };

        // an early return drops `ui`, which stops whatever already started
        let tick = {
            let (shared, stop) = (Arc::clone(&shared), Arc::clone(&stop));
            let period = options.tick_period;
            spawn("ui-tick", move || workers::tick_loop(&shared, period, &stop))?
        };
        ui.workers_lock().push(tick);

        let render = {
            let (shared, stop, nav) = (Arc::clone(&shared), Arc::clone(&stop), nav.clone());
            let max_wait = options.render_max_wait;
            let mut display = display;
            spawn("ui-render", move || {
                match workers::render_loop(&shared, &nav, &mut display, &stop, max_wait) {
                    Ok(exit) => exit,
                    Err(e) => fatal::terminate(format_args!("display failed: {e}")),
                }
            })?
        };
        *ui.render_lock() = Some(render);

        let manager = {
            let (shared, stop, nav) = (Arc::clone(&shared), Arc::clone(&stop), nav.clone());
            spawn("ui-screens", move || {
                let mut executor = Executor::new(shared, nav, registry);
                if let Some(outcome) = executor.run(&stop) {
                    fatal::terminate(format_args!("screen transition failed: {outcome:?}"));
                }
                if !stop.is_stopped() {
                    fatal::terminate("screen manager exited unexpectedly");
                }
            })?
        };
        ui.workers_lock().push(manager);

        nav.enqueue(options.start_screen)?;
        info!(
            width = geometry.width,
            height = geometry.height,
            rotation = geometry.rotation.degrees(),
            start = %options.start_screen,
            "ui initialized"
        );
        Ok(ui)
    }

    fn workers_lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render_lock(&self) -> MutexGuard<'_, Option<JoinHandle<RenderExit>>> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn request_screen_change(&self, id: ScreenId) -> Result<Admission, UiError> {
        self.nav.request_screen_change(id)
    }

    pub fn request_screen_index(&self, raw: usize) -> Result<Admission, UiError> {
        self.nav.request_screen_index(raw)
    }

    pub fn request_previous_screen(&self) -> Result<Admission, UiError> {
        self.nav.request_previous_screen()
    }

    pub fn current_screen(&self) -> ScreenId {
        self.nav.current_screen()
    }

    pub fn previous_screen(&self) -> ScreenId {
        self.nav.previous_screen()
    }

    pub fn display_width(&self) -> i32 {
        self.shared.geometry.width
    }

    pub fn display_height(&self) -> i32 {
        self.shared.geometry.height
    }

    pub fn rotation(&self) -> Rotation {
        self.shared.geometry.rotation
    }

    /// Takes the UI lock. From inside a screen callback this returns
    /// `LockHeld` instead of blocking; use
    /// [`ScreenCtx::apply_default_text_style`] there.
    pub fn apply_default_text_style(&self, id: WidgetId) -> Result<(), UiError> {
        let mut state = self.shared.lock_outside_callbacks()?;
        Ok(state.toolkit.apply_default_text_style(id)?)
    }

    /// Run `f` against the toolkit with the UI lock held.
    pub fn inspect<R>(&self, f: impl FnOnce(&Toolkit) -> R) -> R {
        f(&self.shared.lock().toolkit)
    }

    /// Block until the render thread returns (window closed or shutdown).
    pub fn wait_closed(&self) {
        let handle = self.render_lock().take();
        if let Some(handle) = handle {
            match handle.join() {
                Ok(exit) => debug!(?exit, "render thread finished"),
                Err(_) => warn!("render thread panicked"),
            }
        }
    }

    /// Stop every worker and wait for them. Safe to call from a worker; that
    /// thread is simply not joined.
    pub fn shutdown(&self) {
        self.stop.stop();
        self.nav.close();
        let workers: Vec<JoinHandle<()>> = self.workers_lock().drain(..).collect();
        for handle in workers {
            join_worker(handle);
        }
        let render = self.render_lock().take();
        if let Some(handle) = render {
            join_worker(handle);
        }
        info!("ui shut down");
    }
}

fn join_worker<T>(handle: JoinHandle<T>) {
    if handle.thread().id() == thread::current().id() {
        return;
    }
    let name = handle.thread().name().unwrap_or("ui-worker").to_owned();
    if handle.join().is_err() {
        warn!(thread = %name, "worker panicked during shutdown");
    } else {
        debug!(thread = %name, "worker joined");
    }
}

impl Drop for Ui {
    fn drop(&mut self) {
        self.stop.stop();
        self.nav.close();
    }
}

//! Bodies of the tick and render threads.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::navigator::Navigator;
use super::{UiShared, UiState};
use crate::display::{Display, DisplayError, InputEvent, NavKey};

/// One-shot stop flag that sleeping workers can wait on.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stop(&self) {
        *self.flag() = true;
        self.cv.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.flag()
    }

    /// Sleep for up to `timeout`. Returns `true` if stopped.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        let (guard, _) = self
            .cv
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Why the render loop returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderExit {
    WindowClosed,
    Stopped,
}

/// Advance the toolkit clock by `period` every `period`. No drift compensation.
pub fn tick_loop(shared: &UiShared, period: Duration, stop: &StopSignal) {
    debug!(period_ms = period.as_millis() as u64, "tick thread started");
    loop {
        shared.lock().toolkit.tick_inc(period);
        if stop.wait_timeout(period) {
            break;
        }
    }
    debug!("tick thread stopped");
}

/// Pump input, fire timers and redraw until the window closes or `stop` is set.
///
/// The display waits for input with the lock released, so the manager and the
/// tick thread get the lock between turns.
pub fn render_loop<D: Display>(
    shared: &UiShared,
    nav: &Navigator,
    display: &mut D,
    stop: &StopSignal,
    max_wait: Duration,
) -> Result<RenderExit, DisplayError> {
    debug!("render thread started");
    let mut pending: Option<InputEvent> = None;
    loop {
        if stop.is_stopped() {
            return Ok(RenderExit::Stopped);
        }

        let wait = {
            let mut guard = shared.lock();
            let state = &mut *guard;
            if let Some(event) = pending.take() {
                dispatch(state, nav, event);
            }
            let next_timer = state.toolkit.timer_handler();
            if state.toolkit.tree_mut().take_dirty() {
                trace!("redraw");
                display.draw(state.toolkit.tree(), state.toolkit.focused())?;
            }
            next_timer.map_or(max_wait, |due| due.min(max_wait))
        };

        match display.wait_event(wait)? {
            Some(InputEvent::Close) => {
                debug!("display closed");
                return Ok(RenderExit::WindowClosed);
            }
            event => pending = event,
        }
    }
}

/// Route one input event. Runs with the UI-state lock held; click handlers
/// may only enqueue through the navigator.
pub(crate) fn dispatch(state: &mut UiState, nav: &Navigator, event: InputEvent) {
    let toolkit = &mut state.toolkit;
    match event {
        InputEvent::Touch { x, y } => {
            let Some(button) = toolkit.tree().hit_test(x, y) else {
                trace!(x, y, "touch outside any button");
                return;
            };
            toolkit.set_focus(Some(button));
            if let Some(on_click) = toolkit.tree().click_handler(button) {
                on_click();
            }
        }
        InputEvent::Key(NavKey::Next) => toolkit.move_focus(1),
        InputEvent::Key(NavKey::Prev) => toolkit.move_focus(-1),
        InputEvent::Key(NavKey::Activate) => {
            if let Some(on_click) = toolkit.focused_handler() {
                on_click();
            }
        }
        InputEvent::Key(NavKey::Back) => {
            // prefer the status bar's own back button when there is one
            let back = state
                .status_bar
                .back_button()
                .and_then(|b| toolkit.tree().click_handler(b));
            match back {
                Some(on_click) => on_click(),
                None => {
                    if let Err(e) = nav.request_previous_screen() {
                        warn!(error = %e, "back request failed");
                    }
                }
            }
        }
        InputEvent::Resize => toolkit.tree_mut().invalidate(),
        InputEvent::Close => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::display::HeadlessDisplay;
    use crate::toolkit::{Rect, TextStyle, Toolkit, WidgetKind};
    use crate::ui::{Geometry, Rotation, ScreenId, StatusBar};

    fn shared() -> UiShared {
        UiShared::new(
            Toolkit::new(100, 100, TextStyle::default()),
            Geometry { width: 100, height: 100, rotation: Rotation::Deg0 },
        )
    }

    #[test]
    fn stop_signal_wakes_sleepers() {
        let stop = Arc::new(StopSignal::new());
        let sleeper = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || stop.wait_timeout(Duration::from_secs(30)))
        };
        let started = Instant::now();
        stop.stop();
        assert!(sleeper.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(stop.wait_timeout(Duration::from_secs(30)));
    }

    #[test]
    fn tick_loop_advances_the_clock_until_stopped() {
        let shared = Arc::new(shared());
        let stop = Arc::new(StopSignal::new());
        let worker = {
            let (shared, stop) = (Arc::clone(&shared), Arc::clone(&stop));
            thread::spawn(move || tick_loop(&shared, Duration::from_millis(2), &stop))
        };
        while shared.lock().toolkit.now_ms() < 10 {
            thread::sleep(Duration::from_millis(1));
        }
        stop.stop();
        worker.join().unwrap();
        assert_eq!(shared.lock().toolkit.now_ms() % 2, 0);
    }

    #[test]
    fn touch_runs_the_button_handler() {
        let shared = shared();
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        {
            let mut state = shared.lock();
            let root = state.toolkit.root();
            let target = nav.clone();
            state
                .toolkit
                .create(
                    root,
                    WidgetKind::button(move || {
                        let _ = target.request_screen_change(ScreenId::Data);
                    }),
                    Rect::new(10, 10, 20, 20),
                )
                .unwrap();
        }

        let mut state = shared.lock();
        dispatch(&mut state, &nav, InputEvent::Touch { x: 0, y: 0 });
        assert_eq!(nav.pending(), 0);
        dispatch(&mut state, &nav, InputEvent::Touch { x: 15, y: 15 });
        assert_eq!(nav.pending(), 1);
        assert!(state.toolkit.focused().is_some());
    }

    #[test]
    fn back_key_prefers_the_status_bar_button() {
        let shared = shared();
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        nav.commit(ScreenId::Profile);
        nav.commit(ScreenId::Settings);

        let mut guard = shared.lock();
        let state = &mut *guard;
        dispatch(state, &nav, InputEvent::Key(NavKey::Back));
        assert_eq!(nav.queue().try_pop(), Ok(ScreenId::Profile));

        state.status_bar =
            StatusBar::build(&mut state.toolkit, 100, 100, Some(ScreenId::Main), &nav).unwrap();
        dispatch(state, &nav, InputEvent::Key(NavKey::Back));
        assert_eq!(nav.queue().try_pop(), Ok(ScreenId::Main));
    }

    #[test]
    fn render_loop_draws_and_returns_on_close() {
        let shared = Arc::new(shared());
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        let stop = Arc::new(StopSignal::new());
        let (mut display, handle) = HeadlessDisplay::pair();
        let worker = {
            let (shared, stop, nav) = (Arc::clone(&shared), Arc::clone(&stop), nav.clone());
            thread::spawn(move || {
                render_loop(&shared, &nav, &mut display, &stop, Duration::from_millis(5))
            })
        };
        while handle.frames() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        handle.close();
        assert_eq!(worker.join().unwrap().unwrap(), RenderExit::WindowClosed);
    }

    #[test]
    fn render_loop_honours_stop() {
        let shared = shared();
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        let (mut display, _handle) = HeadlessDisplay::pair();
        let exit = render_loop(&shared, &nav, &mut display, &stop, Duration::from_millis(5));
        assert_eq!(exit.unwrap(), RenderExit::Stopped);
    }
}

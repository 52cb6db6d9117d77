//! Screen manager: drains the transition queue on its own thread and swaps
//! screens under the UI-state lock.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use super::navigator::Navigator;
use super::screen::{ScreenCtx, ScreenRegistry};
use super::status_bar::StatusBar;
use super::workers::StopSignal;
use super::{ScreenId, UiShared, UiState};
use crate::error::UiError;
use crate::fifo::QueueError;
use crate::toolkit::{Rect, WidgetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Switched { from: ScreenId, to: ScreenId },
    /// Nothing changed: a screen involved has no registered slot.
    Aborted { requested: ScreenId },
    /// `failed` did not enter; `kept` was rebuilt and stays current.
    Recovered { failed: ScreenId, kept: ScreenId },
    /// Neither the requested nor the current screen could be entered.
    Fatal { failed: ScreenId, kept: ScreenId },
}

pub struct Executor {
    shared: Arc<UiShared>,
    nav: Navigator,
    registry: ScreenRegistry,
    entered: bool,
}

impl Executor {
    pub(crate) fn new(shared: Arc<UiShared>, nav: Navigator, registry: ScreenRegistry) -> Self {
        Self { shared, nav, registry, entered: false }
    }

    /// Serve requests until the queue is closed, `stop` is set, or a
    /// transition turns out fatal. Returns the fatal outcome, if any.
    pub fn run(&mut self, stop: &StopSignal) -> Option<TransitionOutcome> {
        debug!("screen manager started");
        loop {
            let next = match self.nav.queue().pop_wait() {
                Ok(next) => next,
                Err(QueueError::Closed) => break,
                Err(e) => {
                    error!(error = %e, "waiting for a screen request failed");
                    break;
                }
            };
            if stop.is_stopped() {
                break;
            }
            let outcome = self.transition(next);
            if matches!(outcome, TransitionOutcome::Fatal { .. }) {
                return Some(outcome);
            }
        }
        debug!("screen manager stopped");
        None
    }

    /// Perform one transition to `next`.
    pub fn transition(&mut self, next: ScreenId) -> TransitionOutcome {
        let current = self.nav.current_screen();
        for id in [next, current] {
            if !self.registry.contains(id) {
                error!(screen = %id, "screen has no registered handlers, transition aborted");
                return TransitionOutcome::Aborted { requested: next };
            }
        }
        debug!(from = %current, to = %next, "transition started");

        {
            let mut guard = self.shared.lock();
            teardown(&mut guard);
        }

        if self.entered {
            if let Err(e) = self.leave(current) {
                warn!(screen = %current, error = %format!("{e:#}"), "screen exit failed, continuing");
            }
        }

        match self.show(next) {
            Ok(()) => {
                self.entered = true;
                let history = self.nav.commit(next);
                info!(
                    from = %history.previous,
                    to = %history.current,
                    title = self.registry.title(next).unwrap_or_default(),
                    "screen changed"
                );
                TransitionOutcome::Switched { from: history.previous, to: history.current }
            }
            Err(e) => {
                error!(
                    screen = %next,
                    title = self.registry.title(next).unwrap_or_default(),
                    error = %format!("{e:#}"),
                    "screen enter failed, restoring current screen"
                );
                match self.show(current) {
                    Ok(()) => {
                        self.entered = true;
                        warn!(screen = %current, "recovered to current screen");
                        TransitionOutcome::Recovered { failed: next, kept: current }
                    }
                    Err(e) => {
                        error!(screen = %current, error = %format!("{e:#}"), "recovery failed");
                        TransitionOutcome::Fatal { failed: next, kept: current }
                    }
                }
            }
        }
    }

    fn leave(&mut self, id: ScreenId) -> Result<()> {
        let geometry = self.shared.geometry;
        let mut guard = self.shared.lock();
        let screen = self.registry.screen_mut(id).ok_or(UiError::ScreenNotRegistered(id))?;
        let mut ctx = ScreenCtx::new(&mut guard.toolkit, &self.nav, geometry);
        screen.exit(&mut ctx).with_context(|| format!("exiting {id}"))
    }

    /// Rebuild the content container and chrome for `id`, then enter it.
    fn show(&mut self, id: ScreenId) -> Result<()> {
        let chrome = self.registry.chrome(id).ok_or(UiError::ScreenNotRegistered(id))?;
        let geometry = self.shared.geometry;

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        // a failed enter may have left widgets behind
        teardown(state);

        let top = if chrome.visible { StatusBar::height(geometry.height) } else { 0 };
        let root = state.toolkit.root();
        let container = state.toolkit.create(
            root,
            WidgetKind::Container,
            Rect::new(0, top, geometry.width, geometry.height - top),
        )?;
        if chrome.visible {
            state.status_bar = StatusBar::build(
                &mut state.toolkit,
                geometry.width,
                geometry.height,
                chrome.back,
                &self.nav,
            )?;
        }

        let screen = self.registry.screen_mut(id).ok_or(UiError::ScreenNotRegistered(id))?;
        let mut ctx = ScreenCtx::new(&mut state.toolkit, &self.nav, geometry);
        screen.enter(&mut ctx, container).with_context(|| format!("entering {id}"))
    }
}

/// Drop the chrome and every widget under the root.
fn teardown(state: &mut UiState) {
    state.status_bar.destroy(&mut state.toolkit);
    state.toolkit.clean_root();
}

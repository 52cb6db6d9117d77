//! Deliberate process termination for states the shell cannot continue from.

use std::fmt::Display;
use std::process;
use std::sync::Mutex;

use tracing::error;

use crate::defaults::Defaults;

type Hook = Box<dyn Fn() + Send>;

static HOOKS: Mutex<Vec<Hook>> = Mutex::new(Vec::new());

/// Register cleanup to run right before [`terminate`] exits (terminal restore and the like).
pub fn on_terminate(hook: impl Fn() + Send + 'static) {
    match HOOKS.lock() {
        Ok(mut hooks) => hooks.push(Box::new(hook)),
        Err(poisoned) => poisoned.into_inner().push(Box::new(hook)),
    }
}

/// Log `reason`, run the cleanup hooks and exit with [`Defaults::FATAL_EXIT_CODE`].
pub fn terminate(reason: impl Display) -> ! {
    error!(%reason, "unrecoverable error, exiting");
    // a hook that is itself terminating must not deadlock us
    if let Ok(hooks) = HOOKS.try_lock() {
        for hook in hooks.iter() {
            hook();
        }
    }
    eprintln!("touchshell: fatal: {reason}");
    process::exit(Defaults::FATAL_EXIT_CODE)
}

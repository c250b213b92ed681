//! Panic isolation for probing
//!
//! A faulty implementor must not take the whole listing down with it. The
//! default panic hook is silenced while the guarded closure runs so a
//! caught panic is only reported through the log.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

static HOOK: Mutex<()> = Mutex::new(());

/// Run `f`, turning a panic into its message
pub fn guard<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    let _lock = HOOK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    outcome.map_err(|payload| message(payload.as_ref()))
}

fn message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}

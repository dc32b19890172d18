//! Panic reporting through the tracing pipeline.
//!
//! # Design
//! - The hook logs at ERROR with a forced backtrace, then defers to the
//!   previously installed hook so stderr output is unchanged.
//! - [`panic_message`] is shared with supervisors that recover panics from
//!   joined tasks.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic;

/// Install a panic hook that logs every panic with its backtrace.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let backtrace = Backtrace::force_capture();
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_default();
        tracing::error!(
            panic = %panic_message(info.payload()),
            location = %location,
            backtrace = %backtrace,
            "panic captured"
        );
        previous(info);
    }));
}

/// Render a panic payload as text.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

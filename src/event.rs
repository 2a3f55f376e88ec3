use std::any::Any;
use std::error::Error;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

/// An otherwise-uncaught synchronous failure, located in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncaughtError {
    pub message: String,
    pub filename: String,
    pub lineno: u32,
    pub colno: u32,
}

impl UncaughtError {
    pub fn new(
        message: impl Into<String>,
        filename: impl Into<String>,
        lineno: u32,
        colno: u32,
    ) -> Self {
        UncaughtError {
            message: message.into(),
            filename: filename.into(),
            lineno,
            colno,
        }
    }

    /// Text logged for this failure: `"{message} in {filename} on line {lineno}:{colno}"`.
    pub fn describe(&self) -> String {
        format!(
            "{} in {} on line {}:{}",
            self.message, self.filename, self.lineno, self.colno
        )
    }
}

/// A failed asynchronous computation nobody handled. `stack` is the
/// reason's stack trace text and is logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledRejection {
    pub stack: String,
}

impl UnhandledRejection {
    pub fn new(stack: impl Into<String>) -> Self {
        UnhandledRejection {
            stack: stack.into(),
        }
    }

    /// Build the stack text from an error and its `source()` chain:
    /// the error on the first line, then one `at` line per cause.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut stack = format!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(stack, "\n    at {}", cause);
            source = cause.source();
        }
        UnhandledRejection { stack }
    }

    /// Build the stack text from a panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        UnhandledRejection {
            stack: format!("Panic: {}", panic_message(payload)),
        }
    }
}

/// Extract the message of a panic payload, if it carries a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic payload")
}

pub type UncaughtErrorHandler = Box<dyn Fn(&UncaughtError) + Send + Sync>;
pub type RejectionHandler = Box<dyn Fn(&UnhandledRejection) + Send + Sync>;

/// A host mechanism that reports otherwise-uncaught failures.
///
/// Registrations are additive: registering a handler never replaces an
/// earlier one, nor the host's own default handling.
pub trait FatalEventSource: Send + Sync {
    fn on_uncaught_error(&self, handler: UncaughtErrorHandler);
    fn on_unhandled_rejection(&self, handler: RejectionHandler);
}

/// In-process [`FatalEventSource`] that fans each dispatched event out to
/// every registered handler.
///
/// Each handler runs inside `catch_unwind`; a panicking handler loses its
/// event but never unwinds into the dispatcher or stops the others. This
/// does not hold inside a panic hook, where any panic aborts; dispatch
/// from a hook goes through another thread, as [`crate::host`] does.
#[derive(Default)]
pub struct EventTarget {
    error_handlers: RwLock<Vec<Arc<dyn Fn(&UncaughtError) + Send + Sync>>>,
    rejection_handlers: RwLock<Vec<Arc<dyn Fn(&UnhandledRejection) + Send + Sync>>>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every uncaught-error handler. Returns how many
    /// handlers completed without panicking.
    pub fn dispatch_uncaught_error(&self, event: &UncaughtError) -> usize {
        // Snapshot so handlers may register further handlers.
        let handlers = self
            .error_handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        handlers
            .iter()
            .filter(|handler| panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_ok())
            .count()
    }

    /// Deliver `event` to every rejection handler. Returns how many
    /// handlers completed without panicking.
    pub fn dispatch_unhandled_rejection(&self, event: &UnhandledRejection) -> usize {
        let handlers = self
            .rejection_handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        handlers
            .iter()
            .filter(|handler| panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_ok())
            .count()
    }

    pub fn handler_counts(&self) -> (usize, usize) {
        (
            self.error_handlers.read().unwrap_or_else(|e| e.into_inner()).len(),
            self.rejection_handlers
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .len(),
        )
    }
}

impl FatalEventSource for EventTarget {
    fn on_uncaught_error(&self, handler: UncaughtErrorHandler) {
        self.error_handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::from(handler));
    }

    fn on_unhandled_rejection(&self, handler: RejectionHandler) {
        self.rejection_handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::from(handler));
    }
}

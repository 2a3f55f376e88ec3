//! Process-level fatal-event source.
//!
//! Panics play the role of uncaught errors and failed tasks spawned with
//! [`spawn_observed`] play the role of unhandled rejections.
//!
//! Handlers never run inside the panic hook itself: a panic inside a hook
//! aborts the process. The hook hands each event to a dedicated dispatcher
//! thread and waits up to [`HOOK_DISPATCH_TIMEOUT`] for it to be handled.
//! A panicking handler on that thread is contained by
//! [`EventTarget::dispatch_uncaught_error`], and the hook does not
//! re-dispatch panics raised on the dispatcher thread.

use crate::event::{panic_message, EventTarget, UncaughtError, UnhandledRejection};
use std::cell::Cell;
use std::error::Error;
use std::future::Future;
use std::panic;
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Once, OnceLock};
use std::thread;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// How long a panicking thread waits for its event to be handled.
pub const HOOK_DISPATCH_TIMEOUT: Duration = Duration::from_secs(2);

const HOOK_QUEUE: usize = 64;

type HookEvent = (UncaughtError, SyncSender<()>);

static PROCESS_EVENTS: OnceLock<EventTarget> = OnceLock::new();
static PANIC_HOOK: Once = Once::new();

thread_local! {
    static ON_DISPATCHER: Cell<bool> = const { Cell::new(false) };
}

/// The process-wide [`EventTarget`].
///
/// The first access from a thread that is not unwinding installs a panic
/// hook that reports every panic as an [`UncaughtError`] and then runs the
/// previously installed hook, so the default panic report is preserved.
/// Access during unwinding still returns the target; the hook is
/// installed by a later call.
pub fn process_events() -> &'static EventTarget {
    let target = PROCESS_EVENTS.get_or_init(EventTarget::new);
    // The panic hook cannot be replaced from a panicking thread.
    if !PANIC_HOOK.is_completed() && !thread::panicking() {
        PANIC_HOOK.call_once(install_panic_hook);
    }
    target
}

fn install_panic_hook() {
    let dispatcher = spawn_dispatcher();
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let on_dispatcher = ON_DISPATCHER.try_with(Cell::get).unwrap_or(false);
        if let (false, Some(dispatcher)) = (on_dispatcher, &dispatcher) {
            let message = panic_message(info.payload());
            let event = match info.location() {
                Some(location) => UncaughtError::new(
                    message,
                    location.file(),
                    location.line(),
                    location.column(),
                ),
                None => UncaughtError::new(message, "<unknown>", 0, 0),
            };

            let (done_tx, done_rx) = mpsc::sync_channel(1);
            if dispatcher.try_send((event, done_tx)).is_ok() {
                let _ = done_rx.recv_timeout(HOOK_DISPATCH_TIMEOUT);
            }
        }

        previous(info);
    }));
}

fn spawn_dispatcher() -> Option<SyncSender<HookEvent>> {
    let (tx, rx) = mpsc::sync_channel::<HookEvent>(HOOK_QUEUE);
    let spawned = thread::Builder::new()
        .name("playground-log-panics".to_string())
        .spawn(move || {
            ON_DISPATCHER.with(|flag| flag.set(true));
            for (event, done) in rx {
                if let Some(target) = PROCESS_EVENTS.get() {
                    target.dispatch_uncaught_error(&event);
                }
                let _ = done.send(());
            }
        });

    match spawned {
        Ok(_) => Some(tx),
        Err(e) => {
            tracing::warn!(error = %e, "panic dispatcher unavailable, panics will not be logged");
            None
        }
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawn `future` on the current Tokio runtime and report its failure,
/// whether an `Err` output or a panic, as an [`UnhandledRejection`] on
/// [`process_events`].
///
/// Aborting the returned handle also aborts `future`.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
pub fn spawn_observed<F, E>(future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Error + Send + Sync + 'static,
{
    let inner = tokio::spawn(future);
    // Dropped with the watcher, even if the watcher never ran.
    let guard = AbortOnDrop(inner.abort_handle());
    tokio::spawn(async move {
        let _guard = guard;
        let rejection = match inner.await {
            Ok(Ok(())) => return,
            Ok(Err(err)) => UnhandledRejection::from_error(&err),
            Err(join_err) if join_err.is_panic() => {
                UnhandledRejection::from_panic(&*join_err.into_panic())
            }
            Err(join_err) => {
                tracing::debug!(error = %join_err, "observed task cancelled");
                return;
            }
        };
        process_events().dispatch_unhandled_rejection(&rejection);
    })
}

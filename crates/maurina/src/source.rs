// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Bindings between the agent and the host's error-reporting mechanism.
//!
//! The agent only depends on [`ErrorSource`]. Two adapters are provided: [`ManualErrorSource`]
//! for hosts that report errors themselves, and [`PanicErrorSource`], which binds to the process
//! panic hook.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::kind::{ErrorEvent, ErrorKind};
use tracing::debug;

pub type CaptureHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;
pub type ShutdownHandler = Box<dyn FnOnce(Option<&ErrorEvent>) + Send>;

/// A host runtime's error-reporting mechanism.
///
/// Registering a handler replaces the one registered before it.
pub trait ErrorSource {
    /// Registers the handler for errors as they happen.
    fn on_capture(&self, handler: CaptureHandler);
    /// Registers the handler run once when the host ends, given the last unreported error.
    fn on_shutdown(&self, handler: ShutdownHandler);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic inside a handler must not disable reporting for the rest of the process.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Handlers {
    capture: Mutex<Option<CaptureHandler>>,
    shutdown: Mutex<Option<ShutdownHandler>>,
    last_error: Mutex<Option<ErrorEvent>>,
}

impl Handlers {
    fn deliver(&self, event: ErrorEvent) {
        // Clone the handler out so it runs without the lock held.
        let handler = lock(&self.capture).clone();
        match handler {
            Some(handler) => handler(&event),
            None => {
                debug!("No capture handler registered, keeping {} error", event.kind);
                self.record(event);
            }
        }
    }

    fn record(&self, event: ErrorEvent) {
        *lock(&self.last_error) = Some(event);
    }

    fn shutdown(&self) {
        let Some(handler) = lock(&self.shutdown).take() else {
            return;
        };
        let last_error = lock(&self.last_error).take();
        handler(last_error.as_ref());
    }

    fn has_capture(&self) -> bool {
        lock(&self.capture).is_some()
    }
}

impl ErrorSource for Handlers {
    fn on_capture(&self, handler: CaptureHandler) {
        *lock(&self.capture) = Some(handler);
    }

    fn on_shutdown(&self, handler: ShutdownHandler) {
        *lock(&self.shutdown) = Some(handler);
    }
}

/// Error source driven directly by the host.
#[derive(Default)]
pub struct ManualErrorSource {
    handlers: Handlers,
}

impl ManualErrorSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports an error through the capture handler.
    pub fn raise(&self, event: ErrorEvent) {
        self.handlers.deliver(event);
    }

    /// Records an error that bypassed the capture handler, such as one that aborts the host.
    /// It is reported at shutdown.
    pub fn record_fatal(&self, event: ErrorEvent) {
        self.handlers.record(event);
    }

    /// Runs the shutdown handler. Later calls do nothing.
    pub fn shutdown(&self) {
        self.handlers.shutdown();
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handlers.has_capture()
    }
}

impl ErrorSource for ManualErrorSource {
    fn on_capture(&self, handler: CaptureHandler) {
        self.handlers.on_capture(handler);
    }

    fn on_shutdown(&self, handler: ShutdownHandler) {
        self.handlers.on_shutdown(handler);
    }
}

/// Error source bound to the process panic hook.
///
/// Every panic is reported as an [`ErrorKind::Error`] at the panic location, then the hook that
/// was installed before this one runs as usual. Panics that happen before a capture handler is
/// registered are reported at shutdown, which runs on drop if [`PanicErrorSource::shutdown`] was
/// not called.
pub struct PanicErrorSource {
    handlers: Arc<Handlers>,
}

impl PanicErrorSource {
    #[must_use]
    pub fn install() -> Self {
        let handlers = Arc::new(Handlers::default());
        let previous = std::panic::take_hook();
        let hook_handlers = Arc::clone(&handlers);
        std::panic::set_hook(Box::new(move |info| {
            let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Box<dyn Any>".to_string()
            };
            let (file, line) = info
                .location()
                .map_or(("<unknown>", 0), |l| (l.file(), l.line()));
            hook_handlers.deliver(ErrorEvent::new(ErrorKind::Error, message, file, line));
            previous(info);
        }));
        PanicErrorSource { handlers }
    }

    pub fn shutdown(&self) {
        self.handlers.shutdown();
    }
}

impl ErrorSource for PanicErrorSource {
    fn on_capture(&self, handler: CaptureHandler) {
        self.handlers.on_capture(handler);
    }

    fn on_shutdown(&self, handler: ShutdownHandler) {
        self.handlers.on_shutdown(handler);
    }
}

impl Drop for PanicErrorSource {
    fn drop(&mut self) {
        self.handlers.shutdown();
    }
}

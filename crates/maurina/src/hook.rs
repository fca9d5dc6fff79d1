// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Error hook: turns host error signals into records on the errors channel.
//!
//! The hook moves through `Uninstalled -> Installed -> Handling -> Installed` for every reported
//! error, and reaches `ShutdownHandled` once when the host process ends. Errors from different
//! threads are handled independently. An error raised on a thread that is already handling one
//! is dropped, so a failure inside the hook can never re-enter it.

use std::cell::Cell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::format::escape_html;
use crate::kind::{ErrorEvent, KindFilter};
use crate::record::ChannelId;
use crate::transport::Transport;
use tracing::{debug, trace};

thread_local! {
    static HANDLING: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Uninstalled,
    Installed,
    Handling,
    ShutdownHandled,
}

// Lifecycle values kept in the atomic. `Handling` is derived from the in-flight count.
const UNINSTALLED: u8 = 0;
const INSTALLED: u8 = 1;
const SHUTDOWN_HANDLED: u8 = 2;

/// Marks the current thread as handling an error until dropped, unwinding included.
struct HandlingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> HandlingGuard<'a> {
    fn enter(in_flight: &'a AtomicUsize) -> Option<Self> {
        if HANDLING.with(|handling| handling.replace(true)) {
            return None;
        }
        in_flight.fetch_add(1, Ordering::AcqRel);
        Some(HandlingGuard { in_flight })
    }
}

impl Drop for HandlingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        HANDLING.with(|handling| handling.set(false));
    }
}

#[derive(Debug)]
pub struct ErrorHook {
    lifecycle: AtomicU8,
    in_flight: AtomicUsize,
    enabled: KindFilter,
    transport: Arc<Transport>,
}

impl ErrorHook {
    #[must_use]
    pub fn new(transport: Arc<Transport>, enabled: KindFilter) -> Self {
        ErrorHook {
            lifecycle: AtomicU8::new(UNINSTALLED),
            in_flight: AtomicUsize::new(0),
            enabled,
            transport,
        }
    }

    #[must_use]
    pub fn state(&self) -> HookState {
        match self.lifecycle.load(Ordering::Acquire) {
            SHUTDOWN_HANDLED => HookState::ShutdownHandled,
            INSTALLED if self.in_flight.load(Ordering::Acquire) > 0 => HookState::Handling,
            INSTALLED => HookState::Installed,
            _ => HookState::Uninstalled,
        }
    }

    /// Marks the hook as installed. Returns false if it was already installed or shut down.
    pub fn mark_installed(&self) -> bool {
        self.transition(UNINSTALLED, INSTALLED)
    }

    /// Reports one error on the errors channel unless its kind is disabled.
    pub fn on_error(&self, event: &ErrorEvent) {
        if self.lifecycle.load(Ordering::Acquire) != INSTALLED {
            trace!(
                "Dropping {} error reported while hook is {:?}",
                event.kind,
                self.state()
            );
            return;
        }
        self.report(event);
    }

    /// Reports the host's last unhandled error, if any. Runs at most once.
    pub fn on_shutdown(&self, last_error: Option<&ErrorEvent>) {
        if !self.transition(INSTALLED, SHUTDOWN_HANDLED) {
            debug!("Shutdown ignored while hook is {:?}", self.state());
            return;
        }
        if let Some(event) = last_error {
            debug!("Reporting last error at shutdown: {}", event.kind);
            self.report(event);
        }
    }

    fn report(&self, event: &ErrorEvent) {
        if !self.enabled.is_enabled(event.kind) {
            trace!("Ignoring disabled {} error", event.kind);
            return;
        }
        let Some(_guard) = HandlingGuard::enter(&self.in_flight) else {
            trace!("Dropping {} error raised while handling another", event.kind);
            return;
        };

        self.transport
            .send(ChannelId::Errors, &format_error_block(event), false);
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.lifecycle
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Builds the markup block shown for one error.
#[must_use]
pub fn format_error_block(event: &ErrorEvent) -> String {
    let mut block = format!(
        "<span style='color:#ff9e9e'>[{}] Line {} in {}</span><br />",
        event.kind,
        event.line,
        escape_html(&event.file.to_string_lossy())
    );
    if let Some(source) = read_source_line(&event.file, event.line) {
        block.push_str("<span style='color:#fffa9e'><em>");
        block.push_str(&escape_html(source.trim()));
        block.push_str("</em></span><br />");
    }
    block.push_str(&escape_html(&event.message));
    block.push_str("<br />");
    block
}

/// Reads the 1-based `line` of `path`, or `None` if the file or line is not there.
///
/// Bytes that are not valid UTF-8 are replaced rather than hiding the line.
#[must_use]
pub fn read_source_line(path: &Path, line: u32) -> Option<String> {
    let index = usize::try_from(line.checked_sub(1)?).ok()?;
    let file = File::open(path).ok()?;
    let bytes = BufReader::new(file).split(b'\n').nth(index)?.ok()?;
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
    Some(String::from_utf8_lossy(bytes).into_owned())
}

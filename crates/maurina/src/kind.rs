// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic levels reported by the host and the filter that decides which ones are shipped.

use std::path::PathBuf;

/// Standard diagnostic levels of the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    Warning,
    Parse,
    Notice,
    CoreError,
    CoreWarning,
    CompileError,
    CompileWarning,
    UserError,
    UserWarning,
    UserNotice,
    Strict,
    RecoverableError,
    Deprecated,
    UserDeprecated,
    All,
}

impl ErrorKind {
    pub const ALL_KINDS: [ErrorKind; 16] = [
        ErrorKind::Error,
        ErrorKind::Warning,
        ErrorKind::Parse,
        ErrorKind::Notice,
        ErrorKind::CoreError,
        ErrorKind::CoreWarning,
        ErrorKind::CompileError,
        ErrorKind::CompileWarning,
        ErrorKind::UserError,
        ErrorKind::UserWarning,
        ErrorKind::UserNotice,
        ErrorKind::Strict,
        ErrorKind::RecoverableError,
        ErrorKind::Deprecated,
        ErrorKind::UserDeprecated,
        ErrorKind::All,
    ];

    /// Numeric level as reported by the host runtime.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            ErrorKind::Error => 1,
            ErrorKind::Warning => 2,
            ErrorKind::Parse => 4,
            ErrorKind::Notice => 8,
            ErrorKind::CoreError => 16,
            ErrorKind::CoreWarning => 32,
            ErrorKind::CompileError => 64,
            ErrorKind::CompileWarning => 128,
            ErrorKind::UserError => 256,
            ErrorKind::UserWarning => 512,
            ErrorKind::UserNotice => 1024,
            ErrorKind::Strict => 2048,
            ErrorKind::RecoverableError => 4096,
            ErrorKind::Deprecated => 8192,
            ErrorKind::UserDeprecated => 16384,
            ErrorKind::All => 32767,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<ErrorKind> {
        Self::ALL_KINDS.into_iter().find(|kind| kind.code() == code)
    }

    /// Symbolic name shown in the console, e.g. `E_NOTICE`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "E_ERROR",
            ErrorKind::Warning => "E_WARNING",
            ErrorKind::Parse => "E_PARSE",
            ErrorKind::Notice => "E_NOTICE",
            ErrorKind::CoreError => "E_CORE_ERROR",
            ErrorKind::CoreWarning => "E_CORE_WARNING",
            ErrorKind::CompileError => "E_COMPILE_ERROR",
            ErrorKind::CompileWarning => "E_COMPILE_WARNING",
            ErrorKind::UserError => "E_USER_ERROR",
            ErrorKind::UserWarning => "E_USER_WARNING",
            ErrorKind::UserNotice => "E_USER_NOTICE",
            ErrorKind::Strict => "E_STRICT",
            ErrorKind::RecoverableError => "E_RECOVERABLE_ERROR",
            ErrorKind::Deprecated => "E_DEPRECATED",
            ErrorKind::UserDeprecated => "E_USER_DEPRECATED",
            ErrorKind::All => "E_ALL",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<ErrorKind> {
        let name = name.trim();
        Self::ALL_KINDS
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    // Bit in a KindFilter. Codes can't be used directly since E_ALL overlaps every other level.
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Independent enable flag for every [`ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter(u16);

impl KindFilter {
    #[must_use]
    pub const fn all() -> Self {
        KindFilter(u16::MAX)
    }

    #[must_use]
    pub const fn none() -> Self {
        KindFilter(0)
    }

    #[must_use]
    pub const fn enable(self, kind: ErrorKind) -> Self {
        KindFilter(self.0 | kind.bit())
    }

    #[must_use]
    pub const fn disable(self, kind: ErrorKind) -> Self {
        KindFilter(self.0 & !kind.bit())
    }

    #[must_use]
    pub const fn is_enabled(self, kind: ErrorKind) -> bool {
        self.0 & kind.bit() != 0
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// One error as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub message: String,
    pub file: PathBuf,
    pub line: u32,
}

impl ErrorEvent {
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
    ) -> Self {
        ErrorEvent {
            kind,
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

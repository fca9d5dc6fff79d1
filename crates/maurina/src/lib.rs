// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! # Maurina
//!
//! In-process diagnostic agent for the Maurina console.
//!
//! The agent captures host errors and user log messages, formats them for one of five console
//! channels and ships each record as a single UDP datagram. It never blocks on the console, never
//! retries, and never lets its own failures reach the host: the only deliberate delay is a short
//! pause every few dozen packets so the console is not flooded.
//!
//! ```no_run
//! use maurina::{Agent, AgentConfig, AmbientState, ManualErrorSource};
//!
//! let source = ManualErrorSource::new();
//! let agent = Agent::new(AgentConfig::default(), &source, &AmbientState::default());
//! agent.log("This is a user defined message");
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod agent;
pub mod chunk;
pub mod config;
pub mod error;
pub mod format;
pub mod hook;
pub mod kind;
pub mod record;
pub mod source;
pub mod throttle;
pub mod transport;
pub mod value;

pub use agent::{Agent, AmbientState};
pub use config::AgentConfig;
pub use error::{ConfigError, TransportError};
pub use kind::{ErrorEvent, ErrorKind, KindFilter};
pub use record::ChannelId;
pub use source::{ErrorSource, ManualErrorSource, PanicErrorSource};
pub use value::LogValue;

// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use crate::kind::{ErrorKind, KindFilter};
use crate::record::CHANNEL_COUNT;
use std::env;
use std::num::NonZeroUsize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1947;
pub const DEFAULT_CAPTIONS: [&str; CHANNEL_COUNT] =
    ["&User", "&Errors", "&Request", "&Session", "&Cookies"];
pub const DEFAULT_MAX_MESSAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5000) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};
pub const DEFAULT_PACKETS_BEFORE_PAUSE: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Configuration for the console agent, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Console host (e.g., "127.0.0.1")
    pub host: String,
    /// Console UDP port
    pub port: u16,
    /// Tab captions shown by the console, in channel order
    pub captions: [String; CHANNEL_COUNT],
    /// Largest number of characters sent in a single user record
    pub max_message_size: NonZeroUsize,
    /// A 100ms pause is inserted before every packet whose count is a multiple of this
    pub packets_before_pause: NonZeroUsize,
    /// Error kinds that are reported; the rest are dropped before formatting
    pub enabled_kinds: KindFilter,
    /// Prefix user records with the local time
    pub show_time: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            captions: default_captions(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            packets_before_pause: DEFAULT_PACKETS_BEFORE_PAUSE,
            enabled_kinds: KindFilter::all(),
            show_time: false,
        }
    }
}

fn default_captions() -> [String; CHANNEL_COUNT] {
    DEFAULT_CAPTIONS.map(String::from)
}

impl AgentConfig {
    /// Builds a configuration from caller arguments, keeping the default for anything missing.
    ///
    /// An empty host and a caption list with fewer than two entries are ignored. Shorter caption
    /// lists are completed from the defaults and longer ones are cut to the channel count.
    pub fn new<S: AsRef<str>>(host: &str, port: Option<u16>, captions: &[S]) -> Self {
        let mut config = Self::default();
        if !host.trim().is_empty() {
            config.host = host.trim().to_string();
        }
        if let Some(port) = port {
            config.port = port;
        }
        if let Some(captions) = parse_captions(captions) {
            config.captions = captions;
        }
        config
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("MAURINA_HOST").unwrap_or_default();
        let port = env::var("MAURINA_PORT")
            .ok()
            .and_then(|port| port.trim().parse::<u16>().ok());
        let captions: Vec<String> = env::var("MAURINA_CAPTIONS")
            .map(|val| val.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let mut config = Self::new(&host, port, &captions);

        if let Some(size) = env_non_zero("MAURINA_MAX_MESSAGE_SIZE") {
            config.max_message_size = size;
        }
        if let Some(every) = env_non_zero("MAURINA_PACKETS_BEFORE_PAUSE") {
            config.packets_before_pause = every;
        }
        if let Ok(disabled) = env::var("MAURINA_DISABLED_KINDS") {
            config.enabled_kinds = parse_disabled_kinds(&disabled);
        }
        config.show_time = env::var("MAURINA_SHOW_TIME")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "console host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "console port must be greater than 0".to_string(),
            ));
        }

        if let Some(index) = self.captions.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(format!(
                "caption {} cannot be empty",
                index + 1
            )));
        }

        Ok(())
    }
}

/// Parses caller-supplied captions.
///
/// Returns `None` for lists with fewer than two entries, which are treated as malformed input.
pub fn parse_captions<S: AsRef<str>>(captions: &[S]) -> Option<[String; CHANNEL_COUNT]> {
    if captions.len() <= 1 {
        return None;
    }
    if captions.len() != CHANNEL_COUNT {
        tracing::warn!(
            "Expected {} captions, got {}. Missing captions use defaults and extra ones are ignored.",
            CHANNEL_COUNT,
            captions.len()
        );
    }

    let mut parsed = default_captions();
    for (slot, caption) in parsed.iter_mut().zip(captions) {
        *slot = caption.as_ref().trim().to_string();
    }
    Some(parsed)
}

/// Parses a comma-separated list of kind names into a filter with those kinds disabled.
pub fn parse_disabled_kinds(names: &str) -> KindFilter {
    names
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .fold(KindFilter::all(), |filter, name| {
            match ErrorKind::from_name(name) {
                Some(kind) => filter.disable(kind),
                None => {
                    tracing::error!("Unknown error kind '{}'. Ignoring it.", name.trim());
                    filter
                }
            }
        })
}

fn env_non_zero(key: &str) -> Option<NonZeroUsize> {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<NonZeroUsize>().ok())
}

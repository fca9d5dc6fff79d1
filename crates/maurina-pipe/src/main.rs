// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::io::{self, BufRead};

use anyhow::Context;
use maurina::{Agent, AgentConfig, AmbientState, LogValue, PanicErrorSource};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

pub fn main() {
    let log_level = env::var("MAURINA_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    debug!("Logging subsystem enabled");

    let config = match AgentConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on maurina-pipe startup: {e}");
            return;
        }
    };
    let json = env::args().nth(1).is_some_and(|arg| arg == "--json");

    let source = PanicErrorSource::install();
    let agent = Agent::new(config, &source, &AmbientState::default());
    info!(
        "maurina-pipe: forwarding stdin to {}:{}",
        agent.config().host,
        agent.config().port
    );

    match forward(&agent, io::stdin().lock(), json) {
        Ok(lines) => debug!("Forwarded {lines} lines"),
        Err(e) => error!("Stopped forwarding: {e:#}"),
    }
}

fn forward(agent: &Agent, input: impl BufRead, json: bool) -> anyhow::Result<usize> {
    let mut count = 0;
    for line in input.lines() {
        let line = line.with_context(|| format!("reading line {}", count + 1))?;
        agent.log(to_value(line, json));
        count += 1;
    }
    Ok(count)
}

fn to_value(line: String, json: bool) -> LogValue {
    if json {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) {
            return value.into();
        }
    }
    LogValue::Scalar(line)
}

// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Agent facade: owns the configuration and wires the hook, formatter and transport together.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::chunk::split_into_chunks;
use crate::config::AgentConfig;
use crate::format::{escape_html, format_dump, newlines_to_breaks};
use crate::hook::{ErrorHook, HookState};
use crate::kind::ErrorEvent;
use crate::record::ChannelId;
use crate::source::ErrorSource;
use crate::throttle::Throttle;
use crate::transport::Transport;
use crate::value::{pretty_print, LogValue};

/// Host state captured once when the agent starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbientState {
    pub request: Map<String, Value>,
    pub session: Map<String, Value>,
    pub cookies: Map<String, Value>,
}

/// In-process diagnostic agent shipping errors and log messages to the console.
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    transport: Arc<Transport>,
    hook: Arc<ErrorHook>,
}

impl Agent {
    /// Creates the agent, binds it to `source` and sends the non-empty parts of `ambient`.
    pub fn new(config: AgentConfig, source: &dyn ErrorSource, ambient: &AmbientState) -> Self {
        let transport = Transport::new(
            config.host.clone(),
            config.port,
            config.captions.clone(),
            Throttle::new(config.packets_before_pause),
        );
        Self::start(config, transport, source, ambient)
    }

    fn start(
        config: AgentConfig,
        transport: Transport,
        source: &dyn ErrorSource,
        ambient: &AmbientState,
    ) -> Self {
        let transport = Arc::new(transport);
        let hook = Arc::new(ErrorHook::new(
            Arc::clone(&transport),
            config.enabled_kinds,
        ));
        let agent = Agent {
            config,
            transport,
            hook,
        };
        agent.install(source);
        agent.send_ambient(ambient);
        agent
    }

    fn install(&self, source: &dyn ErrorSource) {
        if !self.hook.mark_installed() {
            return;
        }
        let hook = Arc::clone(&self.hook);
        source.on_capture(Arc::new(move |event: &ErrorEvent| hook.on_error(event)));
        let hook = Arc::clone(&self.hook);
        source.on_shutdown(Box::new(move |last| hook.on_shutdown(last)));
        debug!(
            "Console agent installed, sending to {}:{}",
            self.config.host, self.config.port
        );
    }

    fn send_ambient(&self, ambient: &AmbientState) {
        let parts = [
            (ChannelId::Request, &ambient.request),
            (ChannelId::Session, &ambient.session),
            (ChannelId::Cookies, &ambient.cookies),
        ];
        for (channel, map) in parts {
            if !map.is_empty() {
                self.transport
                    .send(channel, &format_dump(&pretty_print(map)), false);
            }
        }
    }

    /// Sends `value` to the user channel, split into as many records as its size requires.
    pub fn log(&self, value: impl Into<LogValue>) {
        let text = render(value.into());
        for chunk in split_into_chunks(&text, self.config.max_message_size) {
            self.transport
                .send(ChannelId::User, chunk, self.config.show_time);
        }
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn hook_state(&self) -> HookState {
        self.hook.state()
    }

    /// Packets sent since the agent started, including dropped ones.
    #[must_use]
    pub fn packets_sent(&self) -> u64 {
        self.transport.packets_sent()
    }
}

/// Renders a logged value as user-channel text.
#[must_use]
pub fn render(value: LogValue) -> String {
    let text = match value {
        LogValue::Structured(map) => format!("<br />{}", format_dump(&pretty_print(&map))),
        LogValue::Boolean(true) => "true".to_string(),
        LogValue::Boolean(false) => "false".to_string(),
        LogValue::Absent => "NULL".to_string(),
        LogValue::Scalar(text) => escape_html(&text),
    };
    newlines_to_breaks(&text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kind::{ErrorKind, KindFilter};
    use crate::source::ManualErrorSource;
    use serde_json::json;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    type Sent = Arc<Mutex<Vec<Vec<u8>>>>;

    fn agent_with(
        config: AgentConfig,
        source: &ManualErrorSource,
        ambient: &AmbientState,
    ) -> (Agent, Sent) {
        let throttle = Throttle::with_pause(config.packets_before_pause, Duration::ZERO);
        let (transport, sent) = Transport::mirror(config.captions.clone(), throttle);
        (Agent::start(config, transport, source, ambient), sent)
    }

    fn agent(config: AgentConfig) -> (Agent, ManualErrorSource, Sent) {
        let source = ManualErrorSource::new();
        let (agent, sent) = agent_with(config, &source, &AmbientState::default());
        (agent, source, sent)
    }

    fn packets(sent: &Sent) -> Vec<Value> {
        sent.lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_log_true() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        agent.log(true);

        let packets = packets(&sent);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0]["log1"], "true");
    }

    #[test]
    fn test_log_false_and_null() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        agent.log(false);
        agent.log(None::<String>);
        agent.log(Value::Null);

        let packets = packets(&sent);
        assert_eq!(packets[0]["log1"], "false");
        assert_eq!(packets[1]["log1"], "NULL");
        assert_eq!(packets[2]["log1"], "NULL");
    }

    #[test]
    fn test_log_escapes_text() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        agent.log("a<b");

        let packets = packets(&sent);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0]["log1"], "a&lt;b");
        for key in ["log2", "log3", "log4", "log5"] {
            assert_eq!(packets[0][key], "");
        }
    }

    #[test]
    fn test_log_converts_newlines() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        agent.log("one\ntwo");
        assert_eq!(packets(&sent)[0]["log1"], "one<br />\ntwo");
    }

    #[test]
    fn test_log_structured() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        agent.log(json!({"user": "alice", "id": 42}));

        assert_eq!(
            packets(&sent)[0]["log1"],
            "<br /><b style=\"color:#9ee7ff\">user</b> :&nbsp;&nbsp;alice<br /><br /> \
             <b style=\"color:#9ee7ff\">id</b> :&nbsp;&nbsp;42<br />"
        );
    }

    #[test]
    fn test_log_chunks_long_messages_in_order() {
        let config = AgentConfig {
            max_message_size: NonZeroUsize::new(4).unwrap(),
            ..Default::default()
        };
        let (agent, _source, sent) = agent(config);
        agent.log("abcdefghij");

        let texts: Vec<String> = packets(&sent)
            .iter()
            .map(|p| p["log1"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_log_chunks_after_escaping() {
        let config = AgentConfig {
            max_message_size: NonZeroUsize::new(3).unwrap(),
            ..Default::default()
        };
        let (agent, _source, sent) = agent(config);
        agent.log("<");

        let texts: Vec<String> = packets(&sent)
            .iter()
            .map(|p| p["log1"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["&lt", ";"]);
    }

    #[test]
    fn test_log_with_show_time() {
        let config = AgentConfig {
            show_time: true,
            ..Default::default()
        };
        let (agent, _source, sent) = agent(config);
        agent.log("tick");

        let text = packets(&sent)[0]["log1"].as_str().unwrap().to_string();
        assert!(text.starts_with("<time>["));
        assert!(text.ends_with("</time> tick"));
    }

    #[test]
    fn test_default_captions_on_wire() {
        let (agent, _source, sent) = agent(AgentConfig::new::<&str>("", None, &[]));
        agent.log(1);
        assert_eq!(
            packets(&sent)[0]["tabs"],
            json!(["&User", "&Errors", "&Request", "&Session", "&Cookies"])
        );
    }

    #[test]
    fn test_ambient_state_sent_at_startup() {
        let source = ManualErrorSource::new();
        let ambient = AmbientState {
            request: object(json!({"page": "2"})),
            session: Map::new(),
            cookies: object(json!({"PHPSESSID": "abc"})),
        };
        let (_agent, sent) = agent_with(AgentConfig::default(), &source, &ambient);

        let packets = packets(&sent);
        assert_eq!(packets.len(), 2);
        assert_eq!(
            packets[0]["log3"],
            "<b style=\"color:#9ee7ff\">page</b> :&nbsp;&nbsp;2<br />"
        );
        assert_eq!(packets[0]["log4"], "");
        assert_eq!(
            packets[1]["log5"],
            "<b style=\"color:#9ee7ff\">PHPSESSID</b> :&nbsp;&nbsp;abc<br />"
        );
    }

    #[test]
    fn test_empty_ambient_state_sends_nothing() {
        let (agent, _source, sent) = agent(AgentConfig::default());
        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(agent.packets_sent(), 0);
        assert_eq!(agent.hook_state(), HookState::Installed);
    }

    #[test]
    fn test_errors_are_routed_to_errors_channel() {
        let (_agent, source, sent) = agent(AgentConfig::default());
        source.raise(ErrorEvent::new(
            ErrorKind::UserWarning,
            "careful",
            "/app/index.php",
            12,
        ));

        let packets = packets(&sent);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0]["log1"], "");
        let text = packets[0]["log2"].as_str().unwrap();
        assert!(text.starts_with(
            "<span style='color:#ff9e9e'>[E_USER_WARNING] Line 12 in /app/index.php"
        ));
        assert!(text.ends_with("careful<br />"));
    }

    #[test]
    fn test_disabled_notice_sends_nothing() {
        let config = AgentConfig {
            enabled_kinds: KindFilter::all().disable(ErrorKind::Notice),
            ..Default::default()
        };
        let (agent, source, sent) = agent(config);
        source.raise(ErrorEvent::new(ErrorKind::Notice, "quiet", "/a.php", 1));

        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(agent.packets_sent(), 0);
    }

    #[test]
    fn test_fatal_error_reported_at_shutdown() {
        let (agent, source, sent) = agent(AgentConfig::default());
        source.record_fatal(ErrorEvent::new(
            ErrorKind::Error,
            "Allowed memory size exhausted",
            "/a.php",
            40,
        ));
        assert!(sent.lock().unwrap().is_empty());

        source.shutdown();
        let packets = packets(&sent);
        assert_eq!(packets.len(), 1);
        assert!(packets[0]["log2"]
            .as_str()
            .unwrap()
            .contains("Allowed memory size exhausted"));
        assert_eq!(agent.hook_state(), HookState::ShutdownHandled);
    }

    #[test]
    fn test_render() {
        assert_eq!(render(LogValue::Absent), "NULL");
        assert_eq!(render(LogValue::Scalar("x & y".into())), "x &amp; y");
        assert_eq!(render(LogValue::Structured(Map::new())), "<br /><br />");
    }
}

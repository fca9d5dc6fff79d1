// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Datagram transport to the console.
//!
//! Every record goes out as one UDP datagram on a freshly opened socket that is dropped right
//! after the send. Delivery is best effort: failures are logged at debug level and discarded, as
//! raising from here could re-enter the error hook that called us.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
#[cfg(test)]
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::format::time_marker;
use crate::record::{ChannelId, ChannelRecord, CHANNEL_COUNT};
use crate::throttle::Throttle;
use tracing::{debug, trace};

// PacketWriter abstracts where serialized records end up.
#[derive(Debug)]
enum PacketWriter {
    /// Fresh UDP socket per datagram
    UdpSocket { host: String, port: u16 },

    /// Capture buffer for testing - keeps every payload in send order
    #[cfg(test)]
    MirrorTest(Arc<Mutex<Vec<Vec<u8>>>>),
}

impl PacketWriter {
    fn write(&self, payload: &[u8]) -> Result<(), TransportError> {
        match self {
            PacketWriter::UdpSocket { host, port } => {
                let target = resolve(host, *port)?;
                let local: SocketAddr = if target.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local).map_err(TransportError::Bind)?;
                socket
                    .send_to(payload, target)
                    .map_err(TransportError::Send)?;
                Ok(())
            }
            #[cfg(test)]
            PacketWriter::MirrorTest(sent) => {
                #[allow(clippy::unwrap_used)]
                sent.lock().unwrap().push(payload.to_vec());
                Ok(())
            }
        }
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve(host.to_string(), e))?
        .next()
        .ok_or_else(|| TransportError::NoAddress(host.to_string()))
}

/// Frames records and ships them to the console, one datagram each.
#[derive(Debug)]
pub struct Transport {
    captions: [String; CHANNEL_COUNT],
    writer: PacketWriter,
    throttle: Throttle,
}

impl Transport {
    #[must_use]
    pub fn new(
        host: String,
        port: u16,
        captions: [String; CHANNEL_COUNT],
        throttle: Throttle,
    ) -> Self {
        Transport {
            captions,
            writer: PacketWriter::UdpSocket { host, port },
            throttle,
        }
    }

    /// Transport that records payloads in memory instead of sending them.
    #[cfg(test)]
    pub(crate) fn mirror(
        captions: [String; CHANNEL_COUNT],
        throttle: Throttle,
    ) -> (Self, Arc<Mutex<Vec<Vec<u8>>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = Transport {
            captions,
            writer: PacketWriter::MirrorTest(Arc::clone(&sent)),
            throttle,
        };
        (transport, sent)
    }

    /// Sends `text` on `channel`, optionally prefixed with the current local time.
    ///
    /// Never fails: every error on the way is logged and swallowed.
    pub fn send(&self, channel: ChannelId, text: &str, timestamp: bool) {
        let text = if timestamp {
            time_marker(&chrono::Local::now()) + text
        } else {
            text.to_string()
        };
        let record = ChannelRecord::new(&self.captions, channel, text);
        let payload = match record.to_wire() {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Dropping {} record: {}", channel, TransportError::from(e));
                return;
            }
        };

        self.throttle.wait();

        match self.writer.write(&payload) {
            Ok(()) => trace!("Sent {} bytes on {} channel", payload.len(), channel),
            Err(e) => debug!("Dropping {} record: {}", channel, e),
        }
    }

    /// Packets handed to the socket layer so far.
    #[must_use]
    pub fn packets_sent(&self) -> u64 {
        self.throttle.sent()
    }
}

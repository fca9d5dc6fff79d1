// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Channel and record model for packets shipped to the console.
//!
//! The console shows five fixed tabs. Every datagram carries the captions of all five tabs and
//! five text slots, exactly one of which is populated. Keeping the shape uniform means the
//! console never needs to know which channel a sender meant beyond looking for the non-empty slot.

use serde::Serialize;

/// Number of channels (and text slots) on the wire.
pub const CHANNEL_COUNT: usize = 5;

/// The fixed logical channels, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    User,
    Errors,
    Request,
    Session,
    Cookies,
}

impl ChannelId {
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::User,
        ChannelId::Errors,
        ChannelId::Request,
        ChannelId::Session,
        ChannelId::Cookies,
    ];

    /// Zero-based slot index. `log1` on the wire is slot 0.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            ChannelId::User => 0,
            ChannelId::Errors => 1,
            ChannelId::Request => 2,
            ChannelId::Session => 3,
            ChannelId::Cookies => 4,
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelId::User => "user",
            ChannelId::Errors => "errors",
            ChannelId::Request => "request",
            ChannelId::Session => "session",
            ChannelId::Cookies => "cookies",
        };
        f.write_str(name)
    }
}

/// One outbound unit of telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord<'a> {
    pub captions: &'a [String; CHANNEL_COUNT],
    pub slot: ChannelId,
    pub text: String,
}

impl<'a> ChannelRecord<'a> {
    #[must_use]
    pub fn new(captions: &'a [String; CHANNEL_COUNT], slot: ChannelId, text: String) -> Self {
        ChannelRecord {
            captions,
            slot,
            text,
        }
    }

    /// Text of every slot in wire order. Only the record's own slot is non-empty.
    #[must_use]
    pub fn slots(&self) -> [&str; CHANNEL_COUNT] {
        let mut slots = [""; CHANNEL_COUNT];
        slots[self.slot.slot()] = &self.text;
        slots
    }

    /// Serializes the record to its wire encoding.
    pub fn to_wire(&self) -> Result<Vec<u8>, serde_json::Error> {
        let [log1, log2, log3, log4, log5] = self.slots();
        serde_json::to_vec(&WirePacket {
            tabs: self.captions,
            log1,
            log2,
            log3,
            log4,
            log5,
        })
    }
}

#[derive(Serialize)]
struct WirePacket<'a> {
    tabs: &'a [String; CHANNEL_COUNT],
    log1: &'a str,
    log2: &'a str,
    log3: &'a str,
    log4: &'a str,
    log5: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn captions() -> [String; CHANNEL_COUNT] {
        ["&User", "&Errors", "&Request", "&Session", "&Cookies"].map(String::from)
    }

    #[test]
    fn test_wire_shape() {
        let captions = captions();
        let record = ChannelRecord::new(&captions, ChannelId::Errors, "boom".to_string());
        let wire: Value = serde_json::from_slice(&record.to_wire().unwrap()).unwrap();

        let object = wire.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert_eq!(
            wire["tabs"],
            serde_json::json!(["&User", "&Errors", "&Request", "&Session", "&Cookies"])
        );
        assert_eq!(wire["log1"], "");
        assert_eq!(wire["log2"], "boom");
        assert_eq!(wire["log3"], "");
        assert_eq!(wire["log4"], "");
        assert_eq!(wire["log5"], "");
    }

    #[test]
    fn test_slot_mapping() {
        let slots: Vec<usize> = ChannelId::ALL.iter().map(|c| c.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn only_the_channel_slot_is_populated(index in 0usize..CHANNEL_COUNT, text in "[a-z<>&]{1,40}") {
            let captions = captions();
            let channel = ChannelId::ALL[index];
            let record = ChannelRecord::new(&captions, channel, text.clone());
            let wire: Value = serde_json::from_slice(&record.to_wire().unwrap()).unwrap();

            for (slot, key) in ["log1", "log2", "log3", "log4", "log5"].iter().enumerate() {
                if slot == channel.slot() {
                    prop_assert_eq!(wire[*key].as_str().unwrap(), text.as_str());
                } else {
                    prop_assert_eq!(wire[*key].as_str().unwrap(), "");
                }
            }
        }
    }
}

// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Values accepted by [`crate::Agent::log`].

use serde_json::{Map, Value};
use std::fmt::Write;

/// Shape of a logged value, resolved once at the call boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Scalar(String),
    Structured(Map<String, Value>),
    Boolean(bool),
    Absent,
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Scalar(value.to_string())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        LogValue::Scalar(value)
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        LogValue::Boolean(value)
    }
}

macro_rules! scalar_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogValue {
                fn from(value: $t) -> Self {
                    LogValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char);

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(LogValue::Absent, Into::into)
    }
}

impl From<Map<String, Value>> for LogValue {
    fn from(value: Map<String, Value>) -> Self {
        LogValue::Structured(value)
    }
}

impl From<Value> for LogValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => LogValue::Absent,
            Value::Bool(b) => LogValue::Boolean(b),
            Value::Number(n) => LogValue::Scalar(n.to_string()),
            Value::String(s) => LogValue::Scalar(s),
            Value::Array(items) => LogValue::Structured(indexed(items)),
            Value::Object(map) => LogValue::Structured(map),
        }
    }
}

fn indexed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

/// Renders a mapping in the structured-printer layout consumed by
/// [`crate::format::format_dump`]:
///
/// ```text
/// Array
/// (
///     [key] => value
/// )
/// ```
///
/// Nested mappings and lists are rendered recursively, eight columns deeper.
#[must_use]
pub fn pretty_print(map: &Map<String, Value>) -> String {
    let mut out = String::new();
    write_map(&mut out, map.iter(), 0);
    out
}

fn write_map<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
    indent: usize,
) {
    out.push_str("Array\n");
    let _ = writeln!(out, "{:indent$}(", "");
    for (key, value) in entries {
        let _ = write!(out, "{:width$}[{}] => ", "", key, width = indent + 4);
        write_value(out, value, indent + 8);
        out.push('\n');
    }
    let _ = writeln!(out, "{:indent$})", "");
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => out.push('1'),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => out.push_str(s),
        Value::Object(map) => write_map(out, map.iter(), indent),
        Value::Array(items) => {
            let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
            write_map(out, keys.iter().zip(items.iter()), indent);
        }
    }
}

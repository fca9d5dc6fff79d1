// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

//! Text formatting for console channels.
//!
//! The console renders every slot as rich text, so anything that originates outside the agent is
//! escaped before it is placed in a record, and structured dumps are rewritten into highlighted
//! `key : value` entries.

/// Separator between a key and its value in a structured dump line.
const DUMP_SEPARATOR: &str = " => ";
/// Header and footer lines produced by the structured printer.
const DUMP_BOUNDARY_LINES: usize = 2;
const LINE_BREAK: &str = "<br />";

/// Escapes the characters that carry meaning in console markup.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            _ => output.push(c),
        }
    }
    output
}

/// Inserts a line-break tag before every line break, keeping the break itself.
///
/// `\r\n` and `\n\r` pairs count as a single break.
#[must_use]
pub fn newlines_to_breaks(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                output.push_str(LINE_BREAK);
                output.push(c);
                let pair = if c == '\r' { '\n' } else { '\r' };
                if chars.peek() == Some(&pair) {
                    output.push(pair);
                    chars.next();
                }
            }
            _ => output.push(c),
        }
    }
    output
}

/// Rewrites a structured-printer dump into highlighted entries.
///
/// The two header and two footer lines are dropped. Each remaining line is split on the first
/// ` => `; the key loses its square brackets and is highlighted, the value is kept as is. A line
/// without a separator is treated as a key with an empty value.
#[must_use]
pub fn format_dump(dump: &str) -> String {
    let lines: Vec<&str> = dump.split('\n').collect();
    let body = if lines.len() > DUMP_BOUNDARY_LINES * 2 {
        &lines[DUMP_BOUNDARY_LINES..lines.len() - DUMP_BOUNDARY_LINES]
    } else {
        &[]
    };

    let entries: Vec<String> = body
        .iter()
        .map(|&line| {
            let (key, value) = line.split_once(DUMP_SEPARATOR).unwrap_or((line, ""));
            let key = key.replace(['[', ']'], "");
            format!(
                " <b style=\"color:#9ee7ff\">{}</b> :&nbsp;&nbsp;{}",
                key.trim(),
                value
            )
        })
        .collect();

    let mut output = entries.join("<br /><br />").trim().to_string();
    output.push_str(LINE_BREAK);
    output
}

/// Marker prepended to timestamped records.
#[must_use]
pub fn time_marker<Tz>(now: &chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("<time>[{}]</time> ", now.format("%H:%M:%S"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b"), "a&lt;b");
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain ñ text"), "plain ñ text");
    }

    #[test]
    fn test_newlines_to_breaks() {
        assert_eq!(newlines_to_breaks("a\nb"), "a<br />\nb");
        assert_eq!(newlines_to_breaks("a\r\nb"), "a<br />\r\nb");
        assert_eq!(newlines_to_breaks("a\n\rb"), "a<br />\n\rb");
        assert_eq!(newlines_to_breaks("a\n\nb"), "a<br />\n<br />\nb");
        assert_eq!(newlines_to_breaks("no breaks"), "no breaks");
    }

    #[test]
    fn test_format_dump() {
        let dump = "Array\n(\n    [user] => alice\n    [id] => 42\n)\n";
        assert_eq!(
            format_dump(dump),
            "<b style=\"color:#9ee7ff\">user</b> :&nbsp;&nbsp;alice<br /><br /> \
             <b style=\"color:#9ee7ff\">id</b> :&nbsp;&nbsp;42<br />"
        );
    }

    #[test]
    fn test_format_dump_entry_count_and_brackets() {
        let dump = "Array\n(\n    [a[0]] => 1\n    [b] => 2\n    [c] => 3\n)\n";
        let formatted = format_dump(dump);
        assert_eq!(formatted.matches("<b style=").count(), 3);
        assert_eq!(formatted.matches("<br /><br />").count(), 2);
        assert!(formatted.contains(">a0</b>"));
        assert!(!formatted.contains('['));
        assert!(formatted.ends_with("<br />"));
    }

    #[test]
    fn test_format_dump_value_keeps_later_separators() {
        let dump = "Array\n(\n    [rule] => a => b\n)\n";
        assert!(format_dump(dump).ends_with(":&nbsp;&nbsp;a => b<br />"));
    }

    #[test]
    fn test_format_dump_missing_separator_is_empty_value() {
        let dump = "Array\n(\n    [a] => 1\n        (\n)\n";
        let formatted = format_dump(dump);
        assert!(formatted.contains("<b style=\"color:#9ee7ff\">(</b> :&nbsp;&nbsp;<br />"));
    }

    #[test]
    fn test_format_dump_short_input() {
        assert_eq!(format_dump(""), "<br />");
        assert_eq!(format_dump("Array\n(\n)\n"), "<br />");
    }

    #[test]
    fn test_time_marker() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 17, 9, 3, 7).unwrap();
        assert_eq!(time_marker(&now), "<time>[09:03:07]</time> ");
    }
}

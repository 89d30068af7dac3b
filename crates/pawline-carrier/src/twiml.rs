// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TwiML response rendering.
//!
//! The webhook path always answers with one of these bodies and HTTP 200,
//! whatever happened internally.

/// Render a TwiML response carrying one reply message.
///
/// An empty body renders an empty `<Response/>`, which suppresses the
/// auto-reply entirely.
pub fn message_response(body: &str) -> String {
    if body.is_empty() {
        return empty_response();
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n  <Message>{}</Message>\n</Response>",
        escape_xml(body)
    )
}

/// Render an empty TwiML response (no auto-reply).
pub fn empty_response() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response></Response>".to_string()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload parsing.

use serde::Deserialize;

/// The fields of a carrier inbound-SMS webhook this engine reads.
///
/// Form-encoded with the provider's capitalized key names; unknown keys
/// (media URLs, geographic hints) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundSms {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: String,
    #[serde(rename = "NumMedia", default)]
    pub num_media: Option<String>,
}

impl InboundSms {
    /// Parse a raw form-encoded webhook body.
    pub fn parse(raw_body: &str) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(raw_body)
    }

    /// Media attachment count; malformed values count as zero.
    pub fn media_count(&self) -> u32 {
        self.num_media
            .as_deref()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_payload() {
        let sms = InboundSms::parse(
            "From=%2B15550001111&To=%2B15550002222&Body=Hello+there&MessageSid=SM1&NumMedia=0",
        )
        .unwrap();
        assert_eq!(sms.from, "+15550001111");
        assert_eq!(sms.to, "+15550002222");
        assert_eq!(sms.body, "Hello there");
        assert_eq!(sms.message_sid, "SM1");
        assert_eq!(sms.media_count(), 0);
    }

    #[test]
    fn missing_optional_fields_default() {
        let sms = InboundSms::parse("From=%2B15550001111&To=%2B15550002222").unwrap();
        assert_eq!(sms.body, "");
        assert_eq!(sms.message_sid, "");
        assert_eq!(sms.media_count(), 0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let sms = InboundSms::parse(
            "From=%2B1&To=%2B2&Body=hi&MessageSid=SM1&NumMedia=2&MediaUrl0=http%3A%2F%2Fx",
        )
        .unwrap();
        assert_eq!(sms.media_count(), 2);
    }

    #[test]
    fn missing_from_is_an_error() {
        assert!(InboundSms::parse("To=%2B2&Body=hi").is_err());
    }
}

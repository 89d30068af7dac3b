// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS command grammar for offer responses.
//!
//! Kept deliberately strict: only exact accept/decline keywords are
//! commands; anything else is an ordinary message and routes normally.

/// A recognized sitter command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferCommand {
    Accept,
    Decline,
}

/// Parse a message body as an offer command.
///
/// Case-insensitive, whitespace-trimmed. `YES`/`Y` accept; `NO`/`N`/`STOP`
/// decline.
pub fn parse_command(body: &str) -> Option<OfferCommand> {
    let trimmed = body.trim();
    if trimmed.eq_ignore_ascii_case("yes") || trimmed.eq_ignore_ascii_case("y") {
        Some(OfferCommand::Accept)
    } else if trimmed.eq_ignore_ascii_case("no")
        || trimmed.eq_ignore_ascii_case("n")
        || trimmed.eq_ignore_ascii_case("stop")
    {
        Some(OfferCommand::Decline)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_keywords() {
        assert_eq!(parse_command("YES"), Some(OfferCommand::Accept));
        assert_eq!(parse_command("yes"), Some(OfferCommand::Accept));
        assert_eq!(parse_command("  Y  "), Some(OfferCommand::Accept));
    }

    #[test]
    fn decline_keywords() {
        assert_eq!(parse_command("NO"), Some(OfferCommand::Decline));
        assert_eq!(parse_command("n"), Some(OfferCommand::Decline));
        assert_eq!(parse_command("Stop"), Some(OfferCommand::Decline));
    }

    #[test]
    fn ordinary_messages_are_not_commands() {
        assert_eq!(parse_command("yes please, 3pm works"), None);
        assert_eq!(parse_command("Is Rex okay?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("yesno"), None);
    }
}

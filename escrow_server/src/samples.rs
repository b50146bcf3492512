//! Canned transfer-confirmation emails for the operator parse endpoint.
//!
//! These mirror the real platform emails closely enough to exercise every field of the corresponding parser, and
//! double as living documentation of what each platform's emails look like.

use escrow_engine::db_types::InboundEmail;

pub const SAMPLE_KINDS: [&str; 3] = ["ticketmaster", "axs", "stubhub"];

pub fn sample_email(kind: &str) -> Option<InboundEmail> {
    match kind.to_lowercase().as_str() {
        "ticketmaster" => Some(ticketmaster()),
        "axs" => Some(axs()),
        "stubhub" => Some(stubhub()),
        _ => None,
    }
}

fn ticketmaster() -> InboundEmail {
    InboundEmail::new(
        "noreply@ticketmaster.com",
        "escrow+ticketmaster@escrowtickets.com",
        "Your Tickets for Taylor Swift - The Eras Tour have been transferred",
        r#"Your tickets have been successfully transferred!

Event: Taylor Swift - The Eras Tour
Venue: SoFi Stadium
Date: Saturday, August 5, 2024 at 7:00 PM
Section: 101
Row: 15
Seats: 1-2

Transfer Code: TM-ABC123

Confirmation #: 45-67890

The tickets have been sent to: escrow+ticketmaster@escrowtickets.com
Seller: taylor.fan@gmail.com

Thank you for using Ticketmaster!"#,
    )
}

fn axs() -> InboundEmail {
    InboundEmail::new(
        "tickets@axs.com",
        "escrow+axs@escrowtickets.com",
        "Tickets transferred: Bad Bunny - Most Wanted Tour",
        r#"You've successfully transferred your tickets!

Show: Bad Bunny - Most Wanted Tour
Venue: Crypto.com Arena
Date: Friday, March 15, 2024 at 8:00 PM

Sec: 215
Row: J
Seats: 5-6
Qty: 2

Transfer Code: AX-XYZ789

Order #: AXS-98765432

Transferred to: escrow+axs@escrowtickets.com
From: bunny.lover@hotmail.com

Manage your tickets at axs.com"#,
    )
}

fn stubhub() -> InboundEmail {
    InboundEmail::new(
        "orders@stubhub.com",
        "escrow+stubhub@escrowtickets.com",
        "Your tickets for The Weeknd - After Hours Tour",
        r#"Great news! Your ticket transfer is complete.

Event: The Weeknd - After Hours Tour
Venue: Madison Square Garden
Section: 200
Row: 12
Seats: 7-8

Transfer Code: ST-QWE456

Order #: SH-123456789

Delivered to: escrow+stubhub@escrowtickets.com
Sold by: weeknd.fan@yahoo.com"#,
    )
}

#[cfg(test)]
mod test {
    use escrow_engine::{
        db_types::Platform,
        parsers::{detect_platform, ParserRegistry},
    };

    use super::*;

    #[test]
    fn every_sample_is_detected_and_parses_with_a_code() {
        let registry = ParserRegistry::default();
        for kind in SAMPLE_KINDS {
            let email = sample_email(kind).unwrap();
            assert!(email.validate().is_ok(), "sample {kind} is missing required fields");
            let platform = detect_platform(&email.from, &email.text);
            assert_ne!(platform, Platform::Other, "sample {kind} was not detected");
            let parsed = registry.parse_email(&email.text, &email.subject, &email.from, None).unwrap();
            assert!(parsed.transfer_code.is_some(), "sample {kind} parsed without a transfer code");
            assert!(parsed.event_name.is_some(), "sample {kind} parsed without an event name");
        }
    }

    #[test]
    fn unknown_sample_kinds_are_rejected() {
        assert!(sample_email("flashseats").is_none());
        assert!(sample_email("").is_none());
    }
}

//! Maps each [`Platform`] to its parse function.
//!
//! The registry is a plain dispatch table. Platforms without a dedicated entry fall back to [`parse_generic`],
//! and the table is injectable so tests (or alternative deployments) can swap individual parsers without touching
//! the dispatch logic.

use std::collections::HashMap;

use log::debug;

use super::{
    detect_platform,
    platforms::{parse_axs, parse_generic, parse_stubhub, parse_ticketmaster},
    ParseError,
    ParsedTransfer,
};
use crate::db_types::Platform;

/// The signature every platform parser satisfies: `(body, subject) -> ParsedTransfer`.
pub type ParserFn = fn(&str, &str) -> Result<ParsedTransfer, ParseError>;

pub struct ParserRegistry {
    parsers: HashMap<Platform, ParserFn>,
    fallback: ParserFn,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut parsers: HashMap<Platform, ParserFn> = HashMap::new();
        parsers.insert(Platform::Ticketmaster, parse_ticketmaster);
        parsers.insert(Platform::Axs, parse_axs);
        parsers.insert(Platform::StubHub, parse_stubhub);
        Self { parsers, fallback: parse_generic }
    }
}

impl ParserRegistry {
    /// Builds a registry from an explicit parser table. Platforms not in the table use `fallback`.
    pub fn new(parsers: HashMap<Platform, ParserFn>, fallback: ParserFn) -> Self {
        Self { parsers, fallback }
    }

    /// Replaces (or adds) the parser for a single platform.
    pub fn register(&mut self, platform: Platform, parser: ParserFn) {
        self.parsers.insert(platform, parser);
    }

    /// The parser that will handle `platform` — a dedicated entry if one exists, the fallback otherwise.
    pub fn parser_for(&self, platform: Platform) -> ParserFn {
        self.parsers.get(&platform).copied().unwrap_or(self.fallback)
    }

    /// Parses a single email end to end: pick the platform (an explicit `hint` wins over content detection),
    /// look up the parser and run it.
    pub fn parse_email(
        &self,
        body: &str,
        subject: &str,
        from: &str,
        hint: Option<Platform>,
    ) -> Result<ParsedTransfer, ParseError> {
        let platform = hint.unwrap_or_else(|| detect_platform(from, body));
        debug!("📨️ Email from {from} dispatched to the {platform} parser");
        let mut parsed = self.parser_for(platform)(body, subject)?;
        // The fallback parser reports Other; re-tag so the audit trail records what was detected.
        parsed.platform = platform;
        Ok(parsed)
    }
}

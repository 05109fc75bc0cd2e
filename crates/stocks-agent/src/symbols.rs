//! Ticker mention and purchase declaration extraction
//!
//! Everything here is a pure function of the message text.

use regex::{CaptureMatches, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z]{1,5})\b").expect("mention pattern is valid")
});

static PURCHASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z]{1,5})\s+(\d*\.?\d+)\s*@\s*\$?(\d*\.?\d+)")
        .expect("purchase pattern is valid")
});

/// A recognized `$SYMBOL <shares>@<price>` fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDeclaration {
    pub symbol: String,
    pub shares: Decimal,
    pub price: Decimal,
}

/// Ticker mentions found in one message.
///
/// Iterating is lazy and can be repeated; every pass yields the same
/// upper-cased symbols in order of appearance, duplicates included.
#[derive(Debug, Clone, Copy)]
pub struct Mentions<'t> {
    text: &'t str,
}

impl<'t> Mentions<'t> {
    /// Start a fresh pass over the mentions
    pub fn iter(&self) -> MentionIter<'t> {
        MentionIter {
            inner: MENTION_RE.captures_iter(self.text),
        }
    }

    /// Whether the text mentions no ticker at all
    pub fn is_empty(&self) -> bool {
        !MENTION_RE.is_match(self.text)
    }
}

impl<'t> IntoIterator for Mentions<'t> {
    type Item = String;
    type IntoIter = MentionIter<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over upper-cased ticker symbols
pub struct MentionIter<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl Iterator for MentionIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|caps| caps[1].to_ascii_uppercase())
    }
}

/// Pattern matcher for ticker mentions and purchase declarations
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolExtractor;

impl SymbolExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Ticker mentions (`$` followed by 1-5 letters) in `text`
    pub fn mentions<'t>(&self, text: &'t str) -> Mentions<'t> {
        Mentions { text }
    }

    /// Check if the text mentions at least one ticker
    pub fn mentions_stocks(&self, text: &str) -> bool {
        !self.mentions(text).is_empty()
    }

    /// Extract the first `$SYMBOL <shares>@<price>` declaration.
    ///
    /// Returns `None` when the pattern is absent or when shares or price is
    /// not a strictly positive number.
    pub fn extract_purchase(&self, text: &str) -> Option<PurchaseDeclaration> {
        let caps = PURCHASE_RE.captures(text)?;
        let shares = Decimal::from_str(&caps[2]).ok()?;
        let price = Decimal::from_str(&caps[3]).ok()?;

        if shares <= Decimal::ZERO || price <= Decimal::ZERO {
            return None;
        }

        Some(PurchaseDeclaration {
            symbol: caps[1].to_ascii_uppercase(),
            shares,
            price,
        })
    }
}

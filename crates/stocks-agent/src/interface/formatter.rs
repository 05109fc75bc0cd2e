//! Reply payload builders

use crate::api::{ChangeSign, Quote, quote_page_url};
use crate::interface::{Attachment, OutboundReply};
use crate::portfolio::PositionSummary;
use rust_decimal::{Decimal, RoundingStrategy};

/// Attachment colour for rising quotes and profitable positions
pub const GAIN_COLOR: &str = "#3d9400";
/// Attachment colour for everything else
pub const LOSS_COLOR: &str = "#dd4b39";

/// Builds chat replies from quotes and positions
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyFormatter;

impl ReplyFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Quote reply: linked title, `$price (change)` body
    pub fn for_quote(&self, channel_id: &str, quote: &Quote) -> OutboundReply {
        let body = format!(
            "${} ({})",
            quote.current_price,
            display_change(&quote.change_text)
        );
        let color = if quote.change_sign == ChangeSign::Up {
            GAIN_COLOR
        } else {
            LOSS_COLOR
        };

        OutboundReply::with_attachment(
            channel_id,
            Attachment {
                title: link(
                    &quote.symbol,
                    &format!("{} ({})", quote.company_name, quote.symbol),
                ),
                fallback_text: format!("{} - {}", quote.company_name, body),
                body,
                color: color.to_string(),
            },
        )
    }

    /// Position reply: shares added, holding, cost basis and current value
    pub fn for_position(&self, channel_id: &str, summary: &PositionSummary) -> OutboundReply {
        let mut lines = Vec::with_capacity(4);
        if let Some(added) = summary.shares_added {
            lines.push(format!("Added {} shares", added.normalize()));
        }
        lines.push(format!("Shares held: {}", summary.total_shares.normalize()));
        lines.push(format!("Cost basis: {}", money(summary.cost_basis)));
        lines.push(match (summary.current_value, summary.unrealized_pnl) {
            (Some(value), Some(pnl)) => {
                format!("Current value: {} ({})", money(value), signed_money(pnl))
            }
            (Some(value), None) => format!("Current value: {}", money(value)),
            _ => "Current value: unavailable".to_string(),
        });

        let label = match &summary.company_name {
            Some(company) => format!("{company} ({}) position", summary.symbol),
            None => format!("{} position", summary.symbol),
        };
        let color = if summary.is_gain() { GAIN_COLOR } else { LOSS_COLOR };

        OutboundReply::with_attachment(
            channel_id,
            Attachment {
                title: link(&summary.symbol, &label),
                body: lines.join("\n"),
                color: color.to_string(),
                fallback_text: format!(
                    "{} - {} shares, cost basis {}",
                    summary.symbol,
                    summary.total_shares.normalize(),
                    money(summary.cost_basis)
                ),
            },
        )
    }

    /// Summary request from a user without any recorded purchase
    pub fn no_holdings(&self, channel_id: &str, user_id: &str) -> OutboundReply {
        OutboundReply::text(
            channel_id,
            format!(
                "<@{user_id}> you have no recorded holdings. Declare a purchase with `$SYMBOL <shares>@<price>`."
            ),
        )
    }

    /// Usage hint posted on startup
    pub fn welcome(&self, channel_id: &str) -> OutboundReply {
        OutboundReply::text(
            channel_id,
            "Check a stock price with $[symbol], record a purchase with $[symbol] <shares>@<price>",
        )
    }
}

fn link(symbol: &str, label: &str) -> String {
    format!("<{}|{label}>", quote_page_url(symbol))
}

/// Source change text as shown to users: `+1.23 - +0.18%` becomes
/// `+$1.23 / +0.18%`
pub fn display_change(change: &str) -> String {
    let change = change.trim();
    let signed = if let Some(rest) = change.strip_prefix('+') {
        format!("+${rest}")
    } else if let Some(rest) = change.strip_prefix('-') {
        format!("-${rest}")
    } else {
        change.to_string()
    };
    signed.replacen(" - ", " / ", 1)
}

/// Round to cents, half away from zero
fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn money(value: Decimal) -> String {
    format!("${:.2}", cents(value))
}

fn signed_money(value: Decimal) -> String {
    let value = cents(value);
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{}", money(value.abs()))
    } else {
        format!("+{}", money(value.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PurchaseRecord;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn quote(sign: ChangeSign, change: &str) -> Quote {
        Quote {
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            current_price: dec("701.10"),
            change_text: change.to_string(),
            change_sign: sign,
        }
    }

    #[test]
    fn test_for_quote() {
        let reply =
            ReplyFormatter::new().for_quote("C1", &quote(ChangeSign::Up, "+1.23 - +0.18%"));
        let attachment = reply.attachment.unwrap();

        assert_eq!(reply.channel_id, "C1");
        assert_eq!(
            attachment.title,
            "<https://finance.yahoo.com/quote/AAPL|Apple Inc. (AAPL)>"
        );
        assert_eq!(attachment.body, "$701.10 (+$1.23 / +0.18%)");
        assert_eq!(
            attachment.fallback_text,
            "Apple Inc. - $701.10 (+$1.23 / +0.18%)"
        );
        assert_eq!(attachment.color, GAIN_COLOR);
    }

    #[test]
    fn test_display_change() {
        assert_eq!(display_change("+1.23 - +0.18%"), "+$1.23 / +0.18%");
        assert_eq!(display_change("-3.10 - -0.44%"), "-$3.10 / -0.44%");
        assert_eq!(display_change("0.00 - 0.00%"), "0.00 / 0.00%");
        assert_eq!(display_change(""), "");
    }

    #[test]
    fn test_quote_down_form_in_body() {
        let reply =
            ReplyFormatter::new().for_quote("C1", &quote(ChangeSign::Down, "-3.10 - -0.44%"));
        let attachment = reply.attachment.unwrap();
        assert_eq!(attachment.body, "$701.10 (-$3.10 / -0.44%)");
        assert_eq!(attachment.color, LOSS_COLOR);
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(dec("1.999")), "$2.00");
        assert_eq!(money(dec("0.336")), "$0.34");
        assert_eq!(money(dec("0.335")), "$0.34");
        assert_eq!(money(dec("7005")), "$7005.00");
        assert_eq!(signed_money(dec("0.005")), "+$0.01");
        assert_eq!(signed_money(dec("-98.904")), "-$98.90");
        assert_eq!(signed_money(dec("-0.004")), "+$0.00");
    }

    #[test]
    fn test_position_amounts_are_rounded() {
        let record = PurchaseRecord::new("U1", "X", dec("1"), dec("1.999"));
        let summary = PositionSummary::from_records("X", [&record]);

        let attachment = ReplyFormatter::new()
            .for_position("C1", &summary)
            .attachment
            .unwrap();

        assert!(attachment.body.contains("Cost basis: $2.00"));
        assert_eq!(attachment.fallback_text, "X - 1 shares, cost basis $2.00");
    }

    #[test]
    fn test_for_quote_down_and_flat_use_loss_color() {
        let formatter = ReplyFormatter::new();
        for q in [
            quote(ChangeSign::Down, "-0.50%"),
            quote(ChangeSign::Flat, "0.00%"),
        ] {
            let reply = formatter.for_quote("C1", &q);
            assert_eq!(reply.attachment.unwrap().color, LOSS_COLOR);
        }
    }

    #[test]
    fn test_for_position_with_value() {
        let record = PurchaseRecord::new("U1", "AAPL", dec("10"), dec("700.50"));
        let summary = PositionSummary::from_records("AAPL", [&record])
            .with_quote(&quote(ChangeSign::Up, "+1.23%"))
            .with_shares_added(dec("10"));

        let reply = ReplyFormatter::new().for_position("C2", &summary);
        let attachment = reply.attachment.unwrap();

        assert_eq!(reply.channel_id, "C2");
        assert_eq!(
            attachment.body,
            "Added 10 shares\nShares held: 10\nCost basis: $7005.00\nCurrent value: $7011.00 (+$6.00)"
        );
        assert_eq!(attachment.color, GAIN_COLOR);
        assert!(attachment.title.contains("Apple Inc. (AAPL) position"));
    }

    #[test]
    fn test_for_position_unavailable_value() {
        let record = PurchaseRecord::new("U1", "GME", dec("3"), dec("20"));
        let summary = PositionSummary::from_records("GME", [&record]);

        let attachment = ReplyFormatter::new()
            .for_position("C1", &summary)
            .attachment
            .unwrap();

        assert_eq!(
            attachment.body,
            "Shares held: 3\nCost basis: $60.00\nCurrent value: unavailable"
        );
        assert_eq!(attachment.color, LOSS_COLOR);
        assert_eq!(attachment.fallback_text, "GME - 3 shares, cost basis $60.00");
    }

    #[test]
    fn test_for_position_loss() {
        let record = PurchaseRecord::new("U1", "AAPL", dec("1"), dec("800"));
        let summary = PositionSummary::from_records("AAPL", [&record])
            .with_quote(&quote(ChangeSign::Down, "-1.00%"));

        let attachment = ReplyFormatter::new()
            .for_position("C1", &summary)
            .attachment
            .unwrap();

        assert!(attachment.body.ends_with("Current value: $701.10 (-$98.90)"));
        assert_eq!(attachment.color, LOSS_COLOR);
    }

    #[test]
    fn test_text_replies() {
        let formatter = ReplyFormatter::new();
        let reply = formatter.no_holdings("C1", "U1");
        assert!(reply.attachment.is_none());
        assert!(reply.text.starts_with("<@U1>"));

        let reply = formatter.welcome("C5");
        assert_eq!(reply.channel_id, "C5");
        assert!(reply.text.contains("$[symbol]"));
    }
}

//! Position math derived from purchase records

use super::PurchaseRecord;
use crate::api::Quote;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Aggregated holding of one symbol for one user. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSummary {
    pub symbol: String,
    /// Company name from the quote used for valuation, if any
    pub company_name: Option<String>,
    /// Shares added by the purchase that triggered this summary
    pub shares_added: Option<Decimal>,
    pub total_shares: Decimal,
    pub cost_basis: Decimal,
    /// `None` when no quote could be resolved
    pub current_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
}

impl PositionSummary {
    /// Sum the records for `symbol`; records for other symbols are ignored.
    pub fn from_records<'a>(
        symbol: &str,
        records: impl IntoIterator<Item = &'a PurchaseRecord>,
    ) -> Self {
        let (total_shares, cost_basis) = records
            .into_iter()
            .filter(|r| r.symbol == symbol)
            .fold((Decimal::ZERO, Decimal::ZERO), |(shares, cost), r| {
                (shares.saturating_add(r.shares), cost.saturating_add(r.cost()))
            });

        Self {
            symbol: symbol.to_string(),
            company_name: None,
            shares_added: None,
            total_shares,
            cost_basis,
            current_value: None,
            unrealized_pnl: None,
        }
    }

    /// Value the position at the quote's current price
    pub fn with_quote(mut self, quote: &Quote) -> Self {
        let value = self.total_shares.saturating_mul(quote.current_price);
        self.company_name = Some(quote.company_name.clone());
        self.current_value = Some(value);
        self.unrealized_pnl = Some(value.saturating_sub(self.cost_basis));
        self
    }

    /// Mark how many shares the triggering purchase added
    pub fn with_shares_added(mut self, shares: Decimal) -> Self {
        self.shares_added = Some(shares);
        self
    }

    /// Whether the position is currently worth more than was paid
    pub fn is_gain(&self) -> bool {
        self.current_value.is_some_and(|value| value > self.cost_basis)
    }
}

/// Group records by symbol, keeping each group in input order
pub fn group_by_symbol(records: Vec<PurchaseRecord>) -> BTreeMap<String, Vec<PurchaseRecord>> {
    let mut groups: BTreeMap<String, Vec<PurchaseRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.symbol.clone()).or_default().push(record);
    }
    groups
}

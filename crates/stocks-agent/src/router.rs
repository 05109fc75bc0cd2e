//! Message classification and dispatch
//!
//! Every inbound event is classified into a [`Route`] (first match wins) and
//! then handled by the matching flow. Replies always go to the channel
//! captured in the event's [`ReplyContext`] before any suspension point.

use crate::api::QuoteSource;
use crate::config::BotConfig;
use crate::error::BotError;
use crate::interface::{
    BotIdentity, ChannelKind, InboundMessage, OutboundReply, ReplyContext, ReplyFormatter,
    ReplySink,
};
use crate::portfolio::{PortfolioLedger, PositionSummary, PurchaseRecord};
use crate::symbols::{PurchaseDeclaration, SymbolExtractor};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do with one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Record a purchase and confirm the resulting position
    Purchase(PurchaseDeclaration),
    /// Quote every mentioned symbol
    Lookup(Vec<String>),
    /// Report every position held by the author
    Summary,
    /// Not for us
    Ignore,
}

/// Routes inbound chat events to quote, purchase and summary flows
#[derive(Clone)]
pub struct MessageRouter {
    identity: BotIdentity,
    extractor: SymbolExtractor,
    formatter: ReplyFormatter,
    quotes: Arc<dyn QuoteSource>,
    ledger: PortfolioLedger,
    sink: Arc<dyn ReplySink>,
    portfolio_keyword: String,
    serve_direct_messages: bool,
}

impl MessageRouter {
    /// Create a router with default keyword and channel policy
    pub fn new(
        identity: BotIdentity,
        quotes: Arc<dyn QuoteSource>,
        ledger: PortfolioLedger,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        let defaults = BotConfig::default();
        Self {
            identity,
            extractor: SymbolExtractor::new(),
            formatter: ReplyFormatter::new(),
            quotes,
            ledger,
            sink,
            portfolio_keyword: defaults.portfolio_keyword,
            serve_direct_messages: defaults.serve_direct_messages,
        }
    }

    /// Apply keyword and channel policy from the bot configuration
    pub fn with_config(mut self, config: &BotConfig) -> Self {
        self.portfolio_keyword.clone_from(&config.portfolio_keyword);
        self.serve_direct_messages = config.serve_direct_messages;
        self
    }

    /// Set the portfolio summary keyword
    pub fn with_portfolio_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.portfolio_keyword = keyword.into();
        self
    }

    /// Serve direct-message conversations
    pub fn with_direct_messages(mut self, serve: bool) -> Self {
        self.serve_direct_messages = serve;
        self
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    fn serves(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Public | ChannelKind::Private => true,
            ChannelKind::Direct => self.serve_direct_messages,
            ChannelKind::Unknown => false,
        }
    }

    /// Decide how an event is handled, without any I/O
    pub fn classify(&self, message: &InboundMessage) -> Route {
        if !message.is_chat()
            || message.author_id == self.identity.user_id
            || !self.serves(message.channel_kind())
        {
            return Route::Ignore;
        }

        if let Some(purchase) = self.extractor.extract_purchase(&message.text) {
            return Route::Purchase(purchase);
        }

        let mentions = self.extractor.mentions(&message.text);
        if !mentions.is_empty() {
            return Route::Lookup(mentions.into_iter().collect());
        }

        if message
            .text
            .trim()
            .eq_ignore_ascii_case(&self.portfolio_keyword)
        {
            return Route::Summary;
        }

        Route::Ignore
    }

    /// Handle one inbound event to completion
    pub async fn handle(&self, message: InboundMessage) {
        let route = self.classify(&message);
        let context = ReplyContext::from(&message);

        debug!(
            channel = %context.channel_id,
            user = %context.author_id,
            ?route,
            "Routing message"
        );

        match route {
            Route::Purchase(purchase) => self.handle_purchase(context, purchase).await,
            Route::Lookup(symbols) => self.handle_lookup(context, symbols).await,
            Route::Summary => self.handle_summary(context).await,
            Route::Ignore => {}
        }
    }

    async fn handle_purchase(&self, context: ReplyContext, purchase: PurchaseDeclaration) {
        let record = PurchaseRecord::new(
            &context.author_id,
            &purchase.symbol,
            purchase.shares,
            purchase.price,
        );

        if let Err(e) = self.ledger.append(&record).await {
            self.sink.report_error(&context, &BotError::Store(e)).await;
            return;
        }

        info!(
            user = %context.author_id,
            symbol = %purchase.symbol,
            shares = %purchase.shares,
            price = %purchase.price,
            "Purchase recorded"
        );

        let (records, quote) = tokio::join!(
            self.ledger
                .records_for(&context.author_id, Some(purchase.symbol.as_str())),
            self.quotes.fetch(&purchase.symbol),
        );

        let records = records.unwrap_or_else(|e| {
            warn!(error = %e, "Could not reload position, confirming this purchase only");
            vec![record]
        });

        let mut summary = PositionSummary::from_records(&purchase.symbol, &records)
            .with_shares_added(purchase.shares);
        match quote {
            Ok(quote) => summary = summary.with_quote(&quote),
            Err(e) => warn!(error = %e, "Quote unavailable for purchase confirmation"),
        }

        let reply = self.formatter.for_position(&context.channel_id, &summary);
        self.post(&context, reply).await;
    }

    async fn handle_lookup(&self, context: ReplyContext, symbols: Vec<String>) {
        let mut lookups: FuturesUnordered<_> = symbols
            .into_iter()
            .map(|symbol| self.quote_reply(context.clone(), symbol))
            .collect();

        while lookups.next().await.is_some() {}
    }

    async fn quote_reply(&self, context: ReplyContext, symbol: String) {
        match self.quotes.fetch(&symbol).await {
            Ok(quote) => {
                let reply = self.formatter.for_quote(&context.channel_id, &quote);
                self.post(&context, reply).await;
            }
            Err(e) => debug!(%symbol, error = %e, "Skipping unresolved symbol"),
        }
    }

    async fn handle_summary(&self, context: ReplyContext) {
        let holdings = match self.ledger.holdings(&context.author_id).await {
            Ok(holdings) => holdings,
            Err(e) => {
                self.sink.report_error(&context, &BotError::Store(e)).await;
                return;
            }
        };

        if holdings.is_empty() {
            let reply = self
                .formatter
                .no_holdings(&context.channel_id, &context.author_id);
            self.post(&context, reply).await;
            return;
        }

        let mut valuations: FuturesUnordered<_> = holdings
            .into_iter()
            .map(|(symbol, records)| {
                let context = context.clone();
                async move {
                    let mut summary = PositionSummary::from_records(&symbol, &records);
                    match self.quotes.fetch(&symbol).await {
                        Ok(quote) => summary = summary.with_quote(&quote),
                        Err(e) => debug!(%symbol, error = %e, "Valuing position without quote"),
                    }
                    let reply = self.formatter.for_position(&context.channel_id, &summary);
                    self.post(&context, reply).await;
                }
            })
            .collect();

        while valuations.next().await.is_some() {}
    }

    async fn post(&self, context: &ReplyContext, reply: OutboundReply) {
        if let Err(e) = self.sink.post_message(reply).await {
            self.sink.report_error(context, &e).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChangeSign, MockQuoteSource, Quote};
    use crate::error::{QuoteError, Result};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        replies: Mutex<Vec<OutboundReply>>,
        errors: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn replies(&self) -> Vec<OutboundReply> {
            self.replies.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<String> {
            self.errors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn post_message(&self, reply: OutboundReply) -> Result<()> {
            self.replies.lock().unwrap().push(reply);
            Ok(())
        }

        async fn report_error(&self, _context: &ReplyContext, error: &BotError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn quote(symbol: &str, price: &str) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            company_name: format!("{symbol} Inc."),
            current_price: dec(price),
            change_text: "+7.01 - +1.01%".to_string(),
            change_sign: ChangeSign::Up,
        }
    }

    fn priced_source(prices: &'static [(&'static str, &'static str)]) -> MockQuoteSource {
        let mut source = MockQuoteSource::new();
        source.expect_fetch().returning(move |symbol| {
            prices
                .iter()
                .find(|(s, _)| *s == symbol)
                .map(|(s, p)| quote(s, p))
                .ok_or_else(|| QuoteError::Unparseable {
                    symbol: symbol.to_string(),
                })
        });
        source
    }

    async fn router_with(
        source: MockQuoteSource,
    ) -> (MessageRouter, Arc<RecordingSink>, PortfolioLedger) {
        let sink = Arc::new(RecordingSink::default());
        let ledger = PortfolioLedger::connect("sqlite::memory:").await.unwrap();
        let router = MessageRouter::new(
            BotIdentity::new("UBOT", "stocks"),
            Arc::new(source),
            ledger.clone(),
            sink.clone(),
        );
        (router, sink, ledger)
    }

    #[tokio::test]
    async fn test_classify_order() {
        let (router, _, _) = router_with(MockQuoteSource::new()).await;

        let purchase = router.classify(&InboundMessage::chat(
            "C1",
            "U1",
            "$TSLA 10@$700.50 and $AAPL",
        ));
        assert!(matches!(purchase, Route::Purchase(p) if p.symbol == "TSLA"));

        assert_eq!(
            router.classify(&InboundMessage::chat("C1", "U1", "compare $aapl and $MSFT")),
            Route::Lookup(vec!["AAPL".to_string(), "MSFT".to_string()])
        );
        assert_eq!(
            router.classify(&InboundMessage::chat("C1", "U1", "  Portfolio ")),
            Route::Summary
        );
        assert_eq!(
            router.classify(&InboundMessage::chat("C1", "U1", "my portfolio please")),
            Route::Ignore
        );
    }

    #[tokio::test]
    async fn test_classify_rejections() {
        let (router, _, _) = router_with(MockQuoteSource::new()).await;

        // Own messages
        assert_eq!(
            router.classify(&InboundMessage::chat("C1", "UBOT", "$AAPL")),
            Route::Ignore
        );
        // Direct messages are not served by default
        assert_eq!(
            router.classify(&InboundMessage::chat("D1", "U1", "$AAPL")),
            Route::Ignore
        );
        // Non-chat events
        let mut event = InboundMessage::chat("C1", "U1", "$AAPL");
        event.kind = crate::interface::MessageKind::Other("user_typing".to_string());
        assert_eq!(router.classify(&event), Route::Ignore);

        let router = router.with_direct_messages(true);
        assert_eq!(
            router.classify(&InboundMessage::chat("D1", "U1", "$AAPL")),
            Route::Lookup(vec!["AAPL".to_string()])
        );
    }

    #[tokio::test]
    async fn test_lookup_skips_failed_symbols() {
        let (router, sink, _) = router_with(priced_source(&[("AAPL", "701.10")])).await;

        router
            .handle(InboundMessage::chat("C1", "U1", "$BOGUS vs $aapl"))
            .await;

        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].channel_id, "C1");
        assert_eq!(
            replies[0].attachment.as_ref().unwrap().body,
            "$701.10 (+$7.01 / +1.01%)"
        );
        assert!(sink.errors().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_one_request_per_mention() {
        let mut source = MockQuoteSource::new();
        source
            .expect_fetch()
            .withf(|symbol| symbol == "GME")
            .times(2)
            .returning(|symbol| Ok(quote(symbol, "20")));
        let (router, sink, _) = router_with(source).await;

        router.handle(InboundMessage::chat("C1", "U1", "$GME $gme")).await;

        assert_eq!(sink.replies().len(), 2);
    }

    #[tokio::test]
    async fn test_purchase_records_and_confirms() {
        let (router, sink, ledger) = router_with(priced_source(&[("TSLA", "701.10")])).await;

        router
            .handle(InboundMessage::chat("C1", "U1", "$TSLA 10@$700.50"))
            .await;

        let records = ledger.records_for("U1", Some("TSLA")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price_per_share, dec("700.50"));

        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        let body = &replies[0].attachment.as_ref().unwrap().body;
        assert!(body.starts_with("Added 10 shares\nShares held: 10\nCost basis: $7005.00"));
        assert!(body.ends_with("Current value: $7011.00 (+$6.00)"));
    }

    #[tokio::test]
    async fn test_purchase_without_quote_still_confirms() {
        let mut source = MockQuoteSource::new();
        source.expect_fetch().returning(|symbol| {
            Err(QuoteError::Unreachable {
                symbol: symbol.to_string(),
                reason: "timeout".to_string(),
            })
        });
        let (router, sink, _) = router_with(source).await;

        router.handle(InboundMessage::chat("C1", "U1", "$GME 3@$20")).await;

        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        let body = &replies[0].attachment.as_ref().unwrap().body;
        assert!(body.contains("Cost basis: $60.00"));
        assert!(body.ends_with("Current value: unavailable"));
    }

    #[tokio::test]
    async fn test_purchase_store_failure_goes_to_operator() {
        let mut source = MockQuoteSource::new();
        source.expect_fetch().never();
        let (router, sink, ledger) = router_with(source).await;
        ledger.close().await;

        router.handle(InboundMessage::chat("C1", "U1", "$GME 3@$20")).await;

        assert!(sink.replies().is_empty());
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ledger store unavailable"));
    }

    #[tokio::test]
    async fn test_summary_after_purchases() {
        let (router, sink, _) =
            router_with(priced_source(&[("GME", "25"), ("AMC", "4")])).await;

        router.handle(InboundMessage::chat("C1", "U1", "$GME 3@$20")).await;
        router.handle(InboundMessage::chat("C1", "U1", "$AMC 10@5")).await;
        router.handle(InboundMessage::chat("C1", "U2", "$GME 100@1")).await;
        router.handle(InboundMessage::chat("C2", "U1", "portfolio")).await;

        let summaries: Vec<OutboundReply> = sink
            .replies()
            .into_iter()
            .filter(|r| r.channel_id == "C2")
            .collect();
        assert_eq!(summaries.len(), 2);

        let gme = summaries
            .iter()
            .map(|r| r.attachment.as_ref().unwrap())
            .find(|a| a.title.contains("GME"))
            .unwrap();
        assert_eq!(
            gme.body,
            "Shares held: 3\nCost basis: $60.00\nCurrent value: $75.00 (+$15.00)"
        );
        assert_eq!(gme.color, crate::interface::GAIN_COLOR);
    }

    #[tokio::test]
    async fn test_summary_without_holdings() {
        let (router, sink, _) = router_with(MockQuoteSource::new()).await;

        router.handle(InboundMessage::chat("C1", "U9", "portfolio")).await;

        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].attachment.is_none());
        assert!(replies[0].text.contains("no recorded holdings"));
    }

    #[tokio::test]
    async fn test_plain_chat_is_ignored() {
        let mut source = MockQuoteSource::new();
        source.expect_fetch().never();
        let (router, sink, _) = router_with(source).await;

        router
            .handle(InboundMessage::chat("C1", "U1", "good morning everyone"))
            .await;

        assert!(sink.replies().is_empty());
    }
}

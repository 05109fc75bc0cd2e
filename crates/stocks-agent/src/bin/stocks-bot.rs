//! Stocks bot
//!
//! Reads chat events as JSON lines on stdin and answers through the Slack
//! Web API, or prints replies to stdout with `--dry-run`.
//!
//! The binary does not open Slack's real-time feed itself. In Slack mode an
//! external bridge (an Events API or Socket Mode relay) must write each
//! message event to stdin, one JSON object per line.
//!
//! # Usage
//!
//! ```bash
//! export BOT_API_KEY="xoxb-..."
//! cargo run --bin stocks-bot -p stocks-agent
//!
//! # Local session without Slack
//! echo '{"type":"message","channel":"C1","user":"U1","text":"$AAPL"}' \
//!     | cargo run --bin stocks-bot -p stocks-agent -- --dry-run
//! ```

use agent_utils::LogFormat;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use stocks_agent::platforms::SlackConfig;
use stocks_agent::{
    BotConfig, BotIdentity, JsonLinesSource, MessageRouter, PortfolioLedger, QuoteClient,
    ReplySink, SlackClient, StdoutSink, StocksBot,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stocks-bot")]
#[command(about = "Chat bot for stock quotes and purchase ledgers", long_about = None)]
struct Args {
    /// Chat transport token
    #[arg(long, env = "BOT_API_KEY", hide_env_values = true)]
    token: Option<String>,

    /// Bot display name
    #[arg(long, env = "BOT_NAME")]
    name: Option<String>,

    /// Ledger database URL
    #[arg(long, env = "STOCKS_DATABASE_URL")]
    database_url: Option<String>,

    /// Quote source base URL
    #[arg(long, env = "STOCKS_QUOTE_URL")]
    quote_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "STOCKS_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Message text that triggers a portfolio summary
    #[arg(long)]
    portfolio_keyword: Option<String>,

    /// Answer in direct-message conversations too
    #[arg(long)]
    serve_direct_messages: bool,

    /// Channel that receives a usage hint on startup
    #[arg(long, env = "STOCKS_WELCOME_CHANNEL")]
    welcome_channel: Option<String>,

    /// Print replies to stdout instead of posting them to Slack
    #[arg(long)]
    dry_run: bool,

    /// User id the bot runs as in dry-run mode
    #[arg(long, default_value = "USTOCKSBOT")]
    bot_user_id: String,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

impl Args {
    fn to_config(&self) -> stocks_agent::Result<BotConfig> {
        let mut builder = BotConfig::builder().serve_direct_messages(self.serve_direct_messages);

        if let Some(token) = &self.token {
            builder = builder.token(token);
        }
        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        if let Some(url) = &self.database_url {
            builder = builder.database_url(url);
        }
        if let Some(url) = &self.quote_url {
            builder = builder.quote_base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(keyword) = &self.portfolio_keyword {
            builder = builder.portfolio_keyword(keyword);
        }
        if let Some(channel) = &self.welcome_channel {
            builder = builder.welcome_channel(channel);
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    agent_utils::init_tracing_with(args.log_format);

    let config = args.to_config()?;
    info!(
        database = %config.database_url,
        quote_url = %config.quote_base_url,
        dry_run = args.dry_run,
        "Starting stocks bot"
    );

    let ledger = PortfolioLedger::connect(&config.database_url).await?;
    let quotes = Arc::new(QuoteClient::from_config(&config)?);

    let (sink, identity): (Arc<dyn ReplySink>, BotIdentity) = if args.dry_run {
        (
            Arc::new(StdoutSink::new()),
            BotIdentity::new(&args.bot_user_id, &config.name),
        )
    } else {
        let slack = SlackClient::new(SlackConfig::from_config(&config)?)?;
        let identity = slack.auth_test().await?;
        (Arc::new(slack), identity)
    };

    let router = MessageRouter::new(identity.clone(), quotes, ledger.clone(), Arc::clone(&sink))
        .with_config(&config);
    let bot = StocksBot::new(router, sink).with_welcome_channel(config.welcome_channel.clone());

    bot.run(JsonLinesSource::stdin(identity)).await?;

    ledger.close().await;
    Ok(())
}

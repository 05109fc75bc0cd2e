//! Configuration for the stocks bot

use crate::error::{BotError, Result};
use agent_utils::{lookup_opt, lookup_parse, process_env};
use std::time::Duration;

/// Legacy CSV quote endpoint; answers `"<name>","<change>",<last>` per symbol
pub const DEFAULT_QUOTE_URL: &str = "http://finance.yahoo.com/d/quotes.csv";

/// Configuration for the stocks bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Chat transport authentication token
    pub token: Option<String>,

    /// Display name of the bot identity
    pub name: String,

    /// Ledger database URL (`sqlite://path` or `sqlite::memory:`)
    pub database_url: String,

    /// Base URL of the quote source
    pub quote_base_url: String,

    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,

    /// Message text that triggers a portfolio summary
    pub portfolio_keyword: String,

    /// Whether direct-message conversations are served
    pub serve_direct_messages: bool,

    /// Channel that receives a usage hint on startup
    pub welcome_channel: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            name: "stocks".to_string(),
            database_url: "sqlite://stocks.db".to_string(),
            quote_base_url: DEFAULT_QUOTE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            portfolio_keyword: "portfolio".to_string(),
            serve_direct_messages: false,
            welcome_channel: None,
        }
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Build a configuration from environment variables
    ///
    /// Reads `BOT_API_KEY`, `BOT_NAME`, `STOCKS_DATABASE_URL`,
    /// `STOCKS_QUOTE_URL`, `STOCKS_REQUEST_TIMEOUT_SECS` and
    /// `STOCKS_WELCOME_CHANNEL`.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BotError::Config("bot name must not be empty".to_string()));
        }

        if self.portfolio_keyword.trim().is_empty() {
            return Err(BotError::Config(
                "portfolio keyword must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(BotError::Config(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.quote_base_url)
            .map_err(|e| BotError::Config(format!("invalid quote URL: {e}")))?;

        Ok(())
    }

    /// Token, or a configuration error when none was provided
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| BotError::Config("BOT_API_KEY not set".to_string()))
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    token: Option<String>,
    name: Option<String>,
    database_url: Option<String>,
    quote_base_url: Option<String>,
    request_timeout: Option<Duration>,
    portfolio_keyword: Option<String>,
    serve_direct_messages: Option<bool>,
    welcome_channel: Option<String>,
}

impl BotConfigBuilder {
    /// Set the authentication token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the bot display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the ledger database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the quote source base URL
    pub fn quote_base_url(mut self, url: impl Into<String>) -> Self {
        self.quote_base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the portfolio summary keyword
    pub fn portfolio_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.portfolio_keyword = Some(keyword.into());
        self
    }

    /// Serve direct-message conversations as well as channels
    pub fn serve_direct_messages(mut self, serve: bool) -> Self {
        self.serve_direct_messages = Some(serve);
        self
    }

    /// Post a usage hint to this channel on startup
    pub fn welcome_channel(mut self, channel: impl Into<String>) -> Self {
        self.welcome_channel = Some(channel.into());
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(process_env)
    }

    /// Fill unset fields from `lookup`, keyed by environment variable name
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = &lookup;
        if self.token.is_none() {
            self.token = lookup_opt("BOT_API_KEY", lookup);
        }
        if self.name.is_none() {
            self.name = lookup_opt("BOT_NAME", lookup);
        }
        if self.database_url.is_none() {
            self.database_url = lookup_opt("STOCKS_DATABASE_URL", lookup);
        }
        if self.quote_base_url.is_none() {
            self.quote_base_url = lookup_opt("STOCKS_QUOTE_URL", lookup);
        }
        if self.request_timeout.is_none() {
            self.request_timeout = lookup_parse::<u64>("STOCKS_REQUEST_TIMEOUT_SECS", lookup)?
                .map(Duration::from_secs);
        }
        if self.welcome_channel.is_none() {
            self.welcome_channel = lookup_opt("STOCKS_WELCOME_CHANNEL", lookup);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();

        let config = BotConfig {
            token: self.token.or(defaults.token),
            name: self.name.unwrap_or(defaults.name),
            database_url: self.database_url.unwrap_or(defaults.database_url),
            quote_base_url: self.quote_base_url.unwrap_or(defaults.quote_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            portfolio_keyword: self
                .portfolio_keyword
                .unwrap_or(defaults.portfolio_keyword),
            serve_direct_messages: self
                .serve_direct_messages
                .unwrap_or(defaults.serve_direct_messages),
            welcome_channel: self.welcome_channel.or(defaults.welcome_channel),
        };

        config.validate()?;
        Ok(config)
    }
}

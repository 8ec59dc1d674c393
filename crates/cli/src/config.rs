//! CLI configuration

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use bazaar::products::ProductId;
use bazaar_app::config::ApiConfig;

/// Storefront cart client
#[derive(Debug, Parser)]
#[command(name = "bazaar", about = "Storefront cart client", long_about = None)]
pub struct Cli {
    /// Storefront API settings.
    #[command(flatten)]
    pub api: ApiArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Storefront API settings.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Base URL of the storefront backend
    #[arg(long, env = "BAZAAR_API_URL", default_value = "http://localhost:5000")]
    pub api_url: Url,

    /// Session cookie, e.g. `accessToken=...`
    #[arg(long, env = "BAZAAR_SESSION_COOKIE", hide_env_values = true)]
    pub session_cookie: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "BAZAAR_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub timeout_seconds: u64,
}

impl ApiArgs {
    /// The HTTP-facing subset of the configuration.
    pub fn to_api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds));

        match &self.session_cookie {
            Some(cookie) => config.with_session_cookie(cookie.as_str()),
            None => config,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add {
        /// Product id
        product: ProductId,

        /// Units to add
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        quantity: u32,
    },

    /// Set the quantity of a cart line
    Update {
        /// Product id
        product: ProductId,

        /// New quantity
        quantity: u32,
    },

    /// Remove a line from the cart
    Remove {
        /// Product id
        product: ProductId,
    },

    /// Empty the cart
    Clear,

    /// Manage the coupon
    #[command(subcommand)]
    Coupon(CodeCommand),

    /// Manage the referral code
    #[command(subcommand)]
    Referral(CodeCommand),

    /// Show the running flash offer
    Offer,

    /// Validate the cart for checkout
    Checkout,

    /// Toggle a product on the wishlist
    Wishlist {
        /// Product id
        product: ProductId,
    },
}

/// Apply or remove a discount code.
#[derive(Debug, Subcommand)]
pub enum CodeCommand {
    /// Apply a code
    Apply {
        /// The code
        code: String,
    },

    /// Remove the applied code
    Remove,
}

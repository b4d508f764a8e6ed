//! # stockbook-app: Application Session
//!
//! Opens a store from configuration and exposes every shop operation on one
//! explicit [`Shop`] value.
//!
//! ## Module Organization
//! ```text
//! stockbook_app/
//! ├── lib.rs          ◄─── You are here (tracing setup & exports)
//! ├── config.rs       ◄─── AppConfig: TOML file + STOCKBOOK_* env
//! ├── shop.rs         ◄─── Shop: catalog, ledgers, cart, database
//! └── error.rs        ◄─── AppError
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,stockbook=debug,sqlx=warn; RUST_LOG overrides       │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → stockbook.toml → STOCKBOOK_* env → validate            │
//! │                                                                         │
//! │  3. Open the Shop ────────────────────────────────────────────────────► │
//! │     • Linux: ~/.local/share/stockbook/stockbook.db                      │
//! │     • SQLite with WAL mode, migrations, legacy import                   │
//! │     • snapshot loaded into the ledgers                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use stockbook_app::{init_tracing, AppConfig, Shop};
//! use stockbook_core::{Discount, Money};
//!
//! init_tracing();
//! let mut shop = Shop::open(AppConfig::load(None)?).await?;
//!
//! shop.add_product("Widget", Money::from_cents(1000), 5, None)?;
//! let (sale_id, value) = shop.sell("Widget", 2, Discount::from_percentage(10.0)?)?;
//! println!("{} {}", sale_id, shop.format_money(value));
//!
//! shop.save().await?;
//! ```

pub mod config;
pub mod error;
pub mod shop;

use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, BackupPolicy, DisplaySettings, SalesSettings, StoreSettings};
pub use error::{AppError, AppResult};
pub use shop::Shop;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,stockbook=debug,sqlx=warn";

/// Initializes the tracing subscriber.
///
/// Uses `RUST_LOG` env var if set, otherwise [`DEFAULT_LOG_FILTER`].
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

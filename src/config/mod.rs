//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use speedmap::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Sessions expire after {}s", settings.tracker.session_timeout_secs);
//! ```

mod settings;

pub use settings::*;
